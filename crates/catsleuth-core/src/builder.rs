/// Tree builder — creates catalog nodes while a storage is being walked.
///
/// Every fallible collaborator call (stat, digest, archive listing) runs
/// before the node is inserted, so a failed entry leaves the catalog exactly
/// as it was. The builder only reports failures; skipping them is the
/// walker's job.
use crate::archive::flatten_members;
use crate::error::{CatalogError, Result};
use crate::model::{Catalog, CatalogNode, MetaInfo, NodeIndex, NodeKind, StorageInfo, ROOT};
use crate::providers::{ArchiveLister, ContentHasher, DiskStat};
use chrono::{DateTime, Utc};
use compact_str::CompactString;
use std::path::{Component, Path};
use tracing::debug;

/// Version stamped into the Meta node.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-file switches for the optional collaborators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileOptions {
    /// Compute a content digest through the hasher.
    pub hash: bool,
    /// List members of recognised archives and attach them under the file.
    pub archives: bool,
}

/// Node factory bound to a set of collaborators.
pub struct TreeBuilder<'a> {
    disk: &'a dyn DiskStat,
    hasher: &'a dyn ContentHasher,
    lister: &'a dyn ArchiveLister,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(
        disk: &'a dyn DiskStat,
        hasher: &'a dyn ContentHasher,
        lister: &'a dyn ArchiveLister,
    ) -> Self {
        Self {
            disk,
            hasher,
            lister,
        }
    }

    /// Create a fresh catalog holding only its Top node.
    pub fn new_top() -> Catalog {
        Catalog::new()
    }

    /// Create the Meta node if the catalog has none, otherwise restamp its
    /// access time and version in place. Returns the Meta node either way.
    pub fn update_meta(catalog: &mut Catalog) -> Result<NodeIndex> {
        Self::update_meta_at(catalog, Utc::now())
    }

    pub fn update_meta_at(catalog: &mut Catalog, now: DateTime<Utc>) -> Result<NodeIndex> {
        if let Some(meta) = catalog.meta() {
            if let NodeKind::Meta(info) = &mut catalog.node_mut(meta).kind {
                info.access = now;
                info.access_version = TOOL_VERSION.to_string();
            }
            return Ok(meta);
        }

        catalog.attach(
            ROOT,
            CatalogNode::new_meta(MetaInfo {
                created: now,
                created_version: TOOL_VERSION.to_string(),
                access: now,
                access_version: TOOL_VERSION.to_string(),
            }),
        )
    }

    /// Create a Storage node snapshotting the free/total bytes at `path`.
    pub fn new_storage(
        &self,
        catalog: &mut Catalog,
        name: &str,
        path: &Path,
        parent: NodeIndex,
        tags: Vec<String>,
    ) -> Result<NodeIndex> {
        let usage = self
            .disk
            .stat(path)
            .map_err(|source| CatalogError::StorageUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        let info = StorageInfo {
            free: usage.free,
            total: usage.total,
            indexed_at: Utc::now(),
            tags,
            size: None,
        };
        catalog.attach(parent, CatalogNode::new_storage(CompactString::new(name), info))
    }

    /// Create a Dir node whose relpath is `path` relative to `storage_root`.
    pub fn new_dir(
        &self,
        catalog: &mut Catalog,
        name: &str,
        path: &Path,
        parent: NodeIndex,
        storage_root: &Path,
    ) -> Result<NodeIndex> {
        let relpath = relative_path(path, storage_root);
        catalog.attach(parent, CatalogNode::new_dir(CompactString::new(name), relpath))
    }

    /// Create a File node from an `lstat` of `path`.
    ///
    /// With `options.hash` the digest comes from the hasher; with
    /// `options.archives` and a recognised extension the archive's members
    /// are listed and flattened under the new node.
    pub fn new_file(
        &self,
        catalog: &mut Catalog,
        name: &str,
        path: &Path,
        parent: NodeIndex,
        storage_root: &Path,
        options: FileOptions,
    ) -> Result<NodeIndex> {
        let meta =
            std::fs::symlink_metadata(path).map_err(|source| CatalogError::FileUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        let digest = if options.hash && meta.is_file() {
            let digest = self
                .hasher
                .digest(path)
                .map_err(|source| CatalogError::IoFailure {
                    path: path.to_path_buf(),
                    source,
                })?;
            Some(digest)
        } else {
            None
        };

        let members = if options.archives && self.is_archive(path) {
            let members =
                self.lister
                    .list_members(path)
                    .map_err(|source| CatalogError::IoFailure {
                        path: path.to_path_buf(),
                        source,
                    })?;
            debug!("{} lists {} members", path.display(), members.len());
            members
        } else {
            Vec::new()
        };

        let relpath = relative_path(path, storage_root);
        let file = catalog.attach(
            parent,
            CatalogNode::new_file(CompactString::new(name), relpath, meta.len(), digest),
        )?;
        flatten_members(self, catalog, file, members.as_slice())?;
        Ok(file)
    }

    /// Create a single archive member node. Pure construction.
    pub fn new_archive_member(
        &self,
        catalog: &mut Catalog,
        name: &str,
        member_path: &str,
        parent: NodeIndex,
        archive_label: &str,
    ) -> Result<NodeIndex> {
        catalog.attach(
            parent,
            CatalogNode::new_archive(
                CompactString::new(name),
                member_path.to_string(),
                CompactString::new(archive_label),
            ),
        )
    }

    fn is_archive(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.lister.is_supported(ext))
    }
}

/// `path` relative to `root`, `/`-joined. Paths outside `root` keep their
/// normal components so the result never points at Top.
pub fn relative_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
