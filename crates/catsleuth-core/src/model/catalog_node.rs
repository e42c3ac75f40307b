/// A single node in the arena-allocated catalog tree.
///
/// Nodes are stored in a flat `Vec<CatalogNode>`. Parent-child relationships
/// use indices rather than pointers, so the tree has no reference cycles and
/// serialises as plain data.
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name given to the root node.
pub const TOP_NAME: &str = "top";

/// Name given to the bookkeeping node.
pub const META_NAME: &str = "meta";

/// Lightweight index into the arena `Vec<CatalogNode>`.
///
/// Uses `u32` to keep nodes small — supports up to ~4 billion nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Create a new `NodeIndex` from a `usize`, panicking if it exceeds `u32::MAX`.
    #[inline]
    pub fn new(index: usize) -> Self {
        debug_assert!(index <= u32::MAX as usize, "NodeIndex overflow");
        Self(index as u32)
    }

    /// Return the index as a `usize` for Vec indexing.
    #[inline]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Bare type tag of a node.
///
/// The derived ordering is the primary key of the name sort policy, which
/// is what groups directories ahead of files in listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    Archive,
    Dir,
    File,
    Meta,
    Storage,
    Top,
}

impl NodeType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Archive => "arc",
            Self::Dir => "dir",
            Self::File => "file",
            Self::Meta => "meta",
            Self::Storage => "storage",
            Self::Top => "top",
        }
    }

    /// Whether a node of type `child` may be attached under this type.
    pub fn can_contain(self, child: NodeType) -> bool {
        matches!(
            (self, child),
            (Self::Top, Self::Meta | Self::Storage)
                | (Self::Storage, Self::Dir | Self::File)
                | (Self::Dir, Self::Dir | Self::File)
                | (Self::File, Self::Archive)
                | (Self::Archive, Self::Archive)
        )
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Catalog-level bookkeeping: who created the catalog and who last opened it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaInfo {
    pub created: DateTime<Utc>,
    pub created_version: String,
    pub access: DateTime<Utc>,
    pub access_version: String,
}

/// One indexed device or volume, snapshotted at index time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageInfo {
    /// Free bytes when the storage was indexed. Not live.
    pub free: u64,
    /// Total capacity in bytes when the storage was indexed.
    pub total: u64,
    pub indexed_at: DateTime<Utc>,
    pub tags: Vec<String>,
    /// Never written by aggregation; see [`crate::aggregate`].
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirInfo {
    /// Path relative to the owning storage root, `/`-separated.
    pub relpath: String,
    /// Sum of descendant file sizes. `None` until the subtree is aggregated.
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Path relative to the owning storage root, `/`-separated.
    pub relpath: String,
    /// Byte size from `lstat` at index time.
    pub size: u64,
    /// Content digest, when hashing was enabled.
    pub digest: Option<String>,
}

/// A member entry inside a compressed file. Members are not stat-able
/// without decompression, so they carry no size or digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveInfo {
    /// The member's full path inside the archive.
    pub relpath: String,
    /// Name of the archive file the member was listed from.
    pub archive: CompactString,
}

/// Type-specific payload of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Top,
    Meta(MetaInfo),
    Storage(StorageInfo),
    Dir(DirInfo),
    File(FileInfo),
    Archive(ArchiveInfo),
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            Self::Top => NodeType::Top,
            Self::Meta(_) => NodeType::Meta,
            Self::Storage(_) => NodeType::Storage,
            Self::Dir(_) => NodeType::Dir,
            Self::File(_) => NodeType::File,
            Self::Archive(_) => NodeType::Archive,
        }
    }
}

/// A single entry in the catalog.
///
/// Children form an insertion-ordered singly-linked list via
/// [`first_child`](Self::first_child) / [`next_sibling`](Self::next_sibling);
/// `last_child` keeps appends O(1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogNode {
    /// Entry name only. Storage-relative paths live in the payload.
    pub name: CompactString,

    pub kind: NodeKind,

    /// Index of the parent node. `None` only for the root.
    pub parent: Option<NodeIndex>,

    pub first_child: Option<NodeIndex>,
    pub last_child: Option<NodeIndex>,
    pub next_sibling: Option<NodeIndex>,
}

impl CatalogNode {
    fn with_kind(name: CompactString, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
        }
    }

    pub fn new_top() -> Self {
        Self::with_kind(CompactString::const_new(TOP_NAME), NodeKind::Top)
    }

    pub fn new_meta(info: MetaInfo) -> Self {
        Self::with_kind(CompactString::const_new(META_NAME), NodeKind::Meta(info))
    }

    pub fn new_storage(name: CompactString, info: StorageInfo) -> Self {
        Self::with_kind(name, NodeKind::Storage(info))
    }

    /// Create a directory node. Its size stays unset until aggregation.
    pub fn new_dir(name: CompactString, relpath: String) -> Self {
        Self::with_kind(name, NodeKind::Dir(DirInfo { relpath, size: None }))
    }

    pub fn new_file(name: CompactString, relpath: String, size: u64, digest: Option<String>) -> Self {
        Self::with_kind(
            name,
            NodeKind::File(FileInfo {
                relpath,
                size,
                digest,
            }),
        )
    }

    pub fn new_archive(name: CompactString, relpath: String, archive: CompactString) -> Self {
        Self::with_kind(name, NodeKind::Archive(ArchiveInfo { relpath, archive }))
    }

    #[inline]
    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    /// Stored size field, if the node kind has one and it is set.
    pub fn size(&self) -> Option<u64> {
        match &self.kind {
            NodeKind::File(f) => Some(f.size),
            NodeKind::Dir(d) => d.size,
            NodeKind::Storage(s) => s.size,
            NodeKind::Top | NodeKind::Meta(_) | NodeKind::Archive(_) => None,
        }
    }

    /// Storage-relative path for dirs and files, member path for archive entries.
    pub fn relpath(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Dir(d) => Some(&d.relpath),
            NodeKind::File(f) => Some(&f.relpath),
            NodeKind::Archive(a) => Some(&a.relpath),
            NodeKind::Top | NodeKind::Meta(_) | NodeKind::Storage(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_order_groups_dirs_before_files() {
        assert!(NodeType::Dir < NodeType::File);
        assert!(NodeType::Archive < NodeType::Dir);
        assert!(NodeType::Storage < NodeType::Top);
    }

    #[test]
    fn test_containment_rules() {
        assert!(NodeType::Top.can_contain(NodeType::Storage));
        assert!(NodeType::Top.can_contain(NodeType::Meta));
        assert!(NodeType::Storage.can_contain(NodeType::Dir));
        assert!(NodeType::File.can_contain(NodeType::Archive));
        assert!(!NodeType::Meta.can_contain(NodeType::File));
        assert!(!NodeType::Storage.can_contain(NodeType::Archive));
        assert!(!NodeType::Storage.can_contain(NodeType::Storage));
        assert!(!NodeType::Dir.can_contain(NodeType::Archive));
    }

    #[test]
    fn test_size_accessor() {
        let file = CatalogNode::new_file("a".into(), "a".into(), 42, None);
        assert_eq!(file.size(), Some(42));
        let dir = CatalogNode::new_dir("d".into(), "d".into());
        assert_eq!(dir.size(), None);
        let arc = CatalogNode::new_archive("m".into(), "m".into(), "x.zip".into());
        assert_eq!(arc.size(), None);
        assert_eq!(arc.relpath(), Some("m"));
    }
}
