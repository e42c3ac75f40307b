/// Arena-backed catalog tree.
///
/// All nodes live in a single `Vec<CatalogNode>` with the Top node at index 0.
/// Nodes are only ever appended under an existing parent, so a child's index
/// is always greater than its parent's. Aggregation and validation rely on it.
use super::catalog_node::{CatalogNode, MetaInfo, NodeIndex, NodeKind, NodeType};
use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};

/// Index of the Top node in every catalog.
pub const ROOT: NodeIndex = NodeIndex(0);

/// The complete catalog: one Top node plus everything indexed under it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Arena: every node in a flat vector.
    nodes: Vec<CatalogNode>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create a catalog holding only its Top node.
    pub fn new() -> Self {
        Self {
            nodes: vec![CatalogNode::new_top()],
        }
    }

    /// Allocate `node` in the arena and link it as the last child of `parent`.
    ///
    /// The parent link and the child registration happen together; a node is
    /// never reachable from one side only.
    pub fn attach(&mut self, parent: NodeIndex, mut node: CatalogNode) -> Result<NodeIndex> {
        let parent_type = self.nodes[parent.idx()].node_type();
        let child_type = node.node_type();
        if !parent_type.can_contain(child_type) {
            return Err(CatalogError::IncompatibleParent {
                parent: parent_type,
                child: child_type,
            });
        }

        let idx = NodeIndex::new(self.nodes.len());
        node.parent = Some(parent);
        node.first_child = None;
        node.last_child = None;
        node.next_sibling = None;
        self.nodes.push(node);

        match self.nodes[parent.idx()].last_child {
            Some(last) => self.nodes[last.idx()].next_sibling = Some(idx),
            None => self.nodes[parent.idx()].first_child = Some(idx),
        }
        self.nodes[parent.idx()].last_child = Some(idx);
        Ok(idx)
    }

    /// Get the node at the given index.
    #[inline]
    pub fn node(&self, index: NodeIndex) -> &CatalogNode {
        &self.nodes[index.idx()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, index: NodeIndex) -> &mut CatalogNode {
        &mut self.nodes[index.idx()]
    }

    #[inline]
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.nodes[index.idx()].parent
    }

    /// Iterate direct children in insertion order.
    pub fn child_iter(&self, parent: NodeIndex) -> Children<'_> {
        Children {
            catalog: self,
            next: self.nodes[parent.idx()].first_child,
        }
    }

    /// Get direct children of a node as a collected Vec (insertion order).
    pub fn children(&self, parent: NodeIndex) -> Vec<NodeIndex> {
        self.child_iter(parent).collect()
    }

    pub fn child_count(&self, parent: NodeIndex) -> usize {
        self.child_iter(parent).count()
    }

    /// First direct child named exactly `name`.
    pub fn child_named(&self, parent: NodeIndex, name: &str) -> Option<NodeIndex> {
        self.child_iter(parent)
            .find(|&c| self.nodes[c.idx()].name == name)
    }

    /// All Storage nodes, in the order they were indexed.
    pub fn storages(&self) -> Vec<NodeIndex> {
        self.child_iter(ROOT)
            .filter(|&c| self.nodes[c.idx()].node_type() == NodeType::Storage)
            .collect()
    }

    pub fn storage_names(&self) -> Vec<&str> {
        self.storages()
            .into_iter()
            .map(|s| self.nodes[s.idx()].name.as_str())
            .collect()
    }

    /// Index of the Meta node, if the catalog has one.
    pub fn meta(&self) -> Option<NodeIndex> {
        self.child_iter(ROOT)
            .find(|&c| self.nodes[c.idx()].node_type() == NodeType::Meta)
    }

    pub fn meta_info(&self) -> Option<&MetaInfo> {
        self.meta().and_then(|m| match &self.nodes[m.idx()].kind {
            NodeKind::Meta(info) => Some(info),
            _ => None,
        })
    }

    /// Nearest Storage ancestor (or the node itself if it is a Storage).
    pub fn storage_of(&self, index: NodeIndex) -> Option<NodeIndex> {
        let mut current = Some(index);
        while let Some(idx) = current {
            if self.nodes[idx.idx()].node_type() == NodeType::Storage {
                return Some(idx);
            }
            current = self.nodes[idx.idx()].parent;
        }
        None
    }

    /// Reconstruct the path of a node from its Storage, storage name included
    /// (e.g. `usb1/music/song.mp3`). Nodes outside any storage yield their
    /// path from Top, Top itself excluded.
    pub fn path_from_storage(&self, index: NodeIndex) -> String {
        let mut segments = Vec::new();
        let mut current = Some(index);
        while let Some(idx) = current {
            let node = &self.nodes[idx.idx()];
            if node.node_type() == NodeType::Top {
                break;
            }
            segments.push(node.name.as_str());
            if node.node_type() == NodeType::Storage {
                break;
            }
            current = node.parent;
        }
        segments.reverse();
        segments.join("/")
    }

    /// Depth of a node below Top (Top is 0).
    pub fn depth(&self, index: NodeIndex) -> usize {
        let mut depth = 0;
        let mut current = self.nodes[index.idx()].parent;
        while let Some(idx) = current {
            depth += 1;
            current = self.nodes[idx.idx()].parent;
        }
        depth
    }

    /// Pre-order traversal of the subtree rooted at `start`, children in
    /// insertion order. Uses an explicit stack, so depth is unbounded.
    pub fn preorder(&self, start: NodeIndex) -> Vec<NodeIndex> {
        let mut order = Vec::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            order.push(idx);
            let mark = stack.len();
            stack.extend(self.child_iter(idx));
            stack[mark..].reverse();
        }
        order
    }

    /// Total number of nodes in the catalog, Top included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if nothing besides Top has been added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Check the tree invariants of a catalog handed back from persistence.
    pub fn validate(&self) -> Result<()> {
        let malformed = |msg: String| Err(CatalogError::Malformed(msg));

        match self.nodes.first() {
            Some(top) if top.node_type() == NodeType::Top && top.parent.is_none() => {}
            _ => return malformed("node 0 is not a parentless top node".into()),
        }

        let len = self.nodes.len();
        let in_range = |idx: Option<NodeIndex>| idx.is_none_or(|i| i.idx() < len);
        let mut linked_children = 0usize;
        let mut metas = 0usize;

        for (i, node) in self.nodes.iter().enumerate() {
            if !in_range(node.parent)
                || !in_range(node.first_child)
                || !in_range(node.last_child)
                || !in_range(node.next_sibling)
            {
                return malformed(format!("node {i} links outside the arena"));
            }
            if i > 0 {
                match node.parent {
                    Some(p) if p.idx() < i => {}
                    _ => return malformed(format!("node {i} has no earlier parent")),
                }
                match node.node_type() {
                    NodeType::Top => return malformed(format!("node {i} is a second top node")),
                    NodeType::Meta => metas += 1,
                    _ => {}
                }
            }

            let mut previous = None;
            let mut child = node.first_child;
            let mut steps = 0usize;
            while let Some(c) = child {
                steps += 1;
                if steps > len {
                    return malformed(format!("sibling chain under node {i} does not terminate"));
                }
                let child_node = &self.nodes[c.idx()];
                if child_node.parent != Some(NodeIndex::new(i)) {
                    return malformed(format!("node {} is listed under {i} but not parented to it", c.0));
                }
                if !node.node_type().can_contain(child_node.node_type()) {
                    return malformed(format!(
                        "{} node {} placed under {} node {i}",
                        child_node.node_type(),
                        c.0,
                        node.node_type()
                    ));
                }
                previous = Some(c);
                child = child_node.next_sibling;
            }
            if previous != node.last_child {
                return malformed(format!("last_child of node {i} is stale"));
            }
            linked_children += steps;
        }

        if linked_children != len - 1 {
            return malformed(format!(
                "{} nodes are unreachable from their parents",
                len - 1 - linked_children
            ));
        }
        if metas > 1 {
            return malformed(format!("{metas} meta nodes, at most one allowed"));
        }
        Ok(())
    }
}

/// Iterator over the direct children of a node.
pub struct Children<'a> {
    catalog: &'a Catalog,
    next: Option<NodeIndex>,
}

impl Iterator for Children<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        let current = self.next?;
        self.next = self.catalog.nodes[current.idx()].next_sibling;
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compact_str::CompactString;

    fn dir(name: &str) -> CatalogNode {
        CatalogNode::new_dir(CompactString::new(name), name.to_string())
    }

    fn storage(catalog: &mut Catalog, name: &str) -> NodeIndex {
        let info = crate::model::StorageInfo {
            free: 0,
            total: 0,
            indexed_at: chrono::Utc::now(),
            tags: Vec::new(),
            size: None,
        };
        catalog
            .attach(ROOT, CatalogNode::new_storage(CompactString::new(name), info))
            .unwrap()
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut catalog = Catalog::new();
        let usb = storage(&mut catalog, "usb1");
        let b = catalog.attach(usb, dir("b")).unwrap();
        let a = catalog.attach(usb, dir("a")).unwrap();
        let c = catalog.attach(usb, dir("c")).unwrap();

        assert_eq!(catalog.children(usb), vec![b, a, c]);
        assert_eq!(catalog.parent(a), Some(usb));
        assert_eq!(catalog.child_count(usb), 3);
        assert_eq!(catalog.child_named(usb, "c"), Some(c));
    }

    #[test]
    fn test_attach_rejects_incompatible_parent() {
        let mut catalog = Catalog::new();
        let err = catalog.attach(ROOT, dir("loose")).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::IncompatibleParent {
                parent: NodeType::Top,
                child: NodeType::Dir
            }
        ));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_path_from_storage() {
        let mut catalog = Catalog::new();
        let usb = storage(&mut catalog, "usb1");
        let music = catalog.attach(usb, dir("music")).unwrap();
        let song = catalog
            .attach(
                music,
                CatalogNode::new_file("song.mp3".into(), "music/song.mp3".into(), 1, None),
            )
            .unwrap();

        assert_eq!(catalog.path_from_storage(song), "usb1/music/song.mp3");
        assert_eq!(catalog.path_from_storage(usb), "usb1");
        assert_eq!(catalog.storage_of(song), Some(usb));
        assert_eq!(catalog.depth(song), 3);
    }

    #[test]
    fn test_preorder_visits_in_insertion_order() {
        let mut catalog = Catalog::new();
        let usb = storage(&mut catalog, "usb1");
        let a = catalog.attach(usb, dir("a")).unwrap();
        let b = catalog.attach(usb, dir("b")).unwrap();
        let a1 = catalog.attach(a, dir("a1")).unwrap();

        assert_eq!(catalog.preorder(ROOT), vec![ROOT, usb, a, a1, b]);
    }

    #[test]
    fn test_validate_accepts_built_catalog() {
        let mut catalog = Catalog::new();
        let usb = storage(&mut catalog, "usb1");
        catalog.attach(usb, dir("a")).unwrap();
        assert!(catalog.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_dangling_node() {
        let mut catalog = Catalog::new();
        let usb = storage(&mut catalog, "usb1");
        catalog.attach(usb, dir("a")).unwrap();
        // Unlink `a` from its parent while it still points back.
        catalog.node_mut(usb).first_child = None;
        catalog.node_mut(usb).last_child = None;
        assert!(matches!(catalog.validate(), Err(CatalogError::Malformed(_))));
    }

    #[test]
    fn test_validate_rejects_second_meta() {
        let mut catalog = Catalog::new();
        let now = chrono::Utc::now();
        let meta = || {
            CatalogNode::new_meta(MetaInfo {
                created: now,
                created_version: "0.1.0".into(),
                access: now,
                access_version: "0.1.0".into(),
            })
        };
        catalog.attach(ROOT, meta()).unwrap();
        assert!(catalog.validate().is_ok());

        catalog.attach(ROOT, meta()).unwrap();
        assert!(matches!(catalog.validate(), Err(CatalogError::Malformed(_))));
    }
}
