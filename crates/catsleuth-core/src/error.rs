/// Error taxonomy for catalog construction and queries.
///
/// Only exact resolution and storage creation surface errors the caller is
/// expected to act on. Per-entry failures during a walk are reported and
/// skipped by the indexer. Glob and search never fail.
use crate::model::NodeType;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Exact resolution hit a segment with no matching child.
    #[error("no node at path \"{0}\"")]
    NotFound(String),

    /// The disk-stat probe failed for a storage root.
    #[error("storage \"{}\" is unavailable: {source}", path.display())]
    StorageUnavailable { path: PathBuf, source: io::Error },

    /// An individual file does not exist or cannot be stat'd.
    #[error("file \"{}\" is unavailable: {source}", path.display())]
    FileUnavailable { path: PathBuf, source: io::Error },

    /// Hashing or archive listing failed.
    #[error("I/O failure on \"{}\": {source}", path.display())]
    IoFailure { path: PathBuf, source: io::Error },

    #[error("a {child} node cannot be placed under a {parent} node")]
    IncompatibleParent { parent: NodeType, child: NodeType },

    /// A deserialised catalog violates the tree invariants.
    #[error("malformed catalog: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
