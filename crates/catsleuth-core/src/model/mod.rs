/// Data model for the catalog tree.
///
/// Re-exports the arena-allocated catalog and its node types.
pub mod catalog;
pub mod catalog_node;

pub use catalog::{Catalog, Children, ROOT};
pub use catalog_node::{
    ArchiveInfo, CatalogNode, DirInfo, FileInfo, MetaInfo, NodeIndex, NodeKind, NodeType,
    StorageInfo, META_NAME, TOP_NAME,
};
