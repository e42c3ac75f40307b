/// CatSleuth Core — catalog model, construction, and queries.
///
/// This crate holds all catalog logic with zero CLI or formatting
/// dependencies. Disk usage, hashing, archive listing, display and
/// persistence are collaborators plugged in by the caller.
///
/// # Modules
///
/// - [`model`] — Arena-allocated catalog tree and node types.
/// - [`builder`] — Node construction against the collaborator traits.
/// - [`indexer`] — Walks a storage path into a new Storage subtree.
/// - [`resolve`] — Exact and glob path lookup.
/// - [`aggregate`] — Bottom-up directory sizes.
/// - [`sort`] — Sibling ordering policies.
/// - [`search`] — Case-insensitive name search.
/// - [`archive`] — Flattens archive member lists into nodes.
/// - [`display`] — Ordered traversal for display sinks.
/// - [`providers`] — Collaborator traits and null implementations.
pub mod aggregate;
pub mod archive;
pub mod builder;
pub mod display;
pub mod error;
pub mod indexer;
pub mod model;
pub mod providers;
pub mod resolve;
pub mod search;
pub mod sort;

pub use error::{CatalogError, Result};
pub use model::{Catalog, NodeIndex, NodeKind, NodeType, ROOT};
