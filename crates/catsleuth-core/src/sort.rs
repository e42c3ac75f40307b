/// Sibling ordering for listings and tree rendering.
///
/// The policy and direction are chosen per traversal call, never per node.
use crate::model::{Catalog, NodeIndex, NodeType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortPolicy {
    /// Type tag first (directories ahead of files), then case-insensitive
    /// name with leading dots ignored.
    #[default]
    Name,
    /// Stored size, absent sizes counting as zero. Ties keep insertion order.
    Size,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortOrder {
    pub policy: SortPolicy,
    /// Exactly the reverse of the ascending order, ties included.
    pub descending: bool,
}

impl SortOrder {
    pub fn by_name() -> Self {
        Self {
            policy: SortPolicy::Name,
            descending: false,
        }
    }

    pub fn by_size() -> Self {
        Self {
            policy: SortPolicy::Size,
            descending: false,
        }
    }

    pub fn reversed(self) -> Self {
        Self {
            descending: !self.descending,
            ..self
        }
    }
}

/// Key of the name policy for a single node.
pub fn name_key(catalog: &Catalog, idx: NodeIndex) -> (NodeType, String) {
    let node = catalog.node(idx);
    (
        node.node_type(),
        node.name.trim_start_matches('.').to_lowercase(),
    )
}

/// Key of the size policy for a single node.
#[inline]
pub fn size_key(catalog: &Catalog, idx: NodeIndex) -> u64 {
    catalog.node(idx).size().unwrap_or(0)
}

/// Stable in-place sort of `nodes` under `order`.
pub fn sort_nodes(catalog: &Catalog, nodes: &mut [NodeIndex], order: SortOrder) {
    match order.policy {
        SortPolicy::Name => nodes.sort_by_cached_key(|&idx| name_key(catalog, idx)),
        SortPolicy::Size => nodes.sort_by_key(|&idx| size_key(catalog, idx)),
    }
    if order.descending {
        nodes.reverse();
    }
}

/// Direct children of `parent`, ordered by `order`.
pub fn sorted_children(catalog: &Catalog, parent: NodeIndex, order: SortOrder) -> Vec<NodeIndex> {
    let mut children = catalog.children(parent);
    sort_nodes(catalog, &mut children, order);
    children
}
