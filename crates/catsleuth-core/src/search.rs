/// Case-insensitive substring search over node names.
use crate::model::{Catalog, NodeIndex, NodeType};

/// A single search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub node: NodeIndex,
    /// Storage the node was indexed from.
    pub storage: Option<NodeIndex>,
    /// Path from the storage, storage name included: `usb1/music/song.mp3`.
    pub path: String,
}

/// Find every node under `root` whose name contains `term`, ignoring case.
///
/// Results follow pre-order traversal (children in insertion order).
/// Storage nodes are containers, not indexed content, and are never
/// returned; neither are Top and Meta. No match is an empty list.
pub fn search(catalog: &Catalog, root: NodeIndex, term: &str) -> Vec<SearchHit> {
    let needle = term.to_lowercase();
    catalog
        .preorder(root)
        .into_iter()
        .filter(|&idx| {
            let node = catalog.node(idx);
            !matches!(
                node.node_type(),
                NodeType::Storage | NodeType::Top | NodeType::Meta
            ) && node.name.to_lowercase().contains(&needle)
        })
        .map(|idx| SearchHit {
            node: idx,
            storage: catalog.storage_of(idx),
            path: catalog.path_from_storage(idx),
        })
        .collect()
}
