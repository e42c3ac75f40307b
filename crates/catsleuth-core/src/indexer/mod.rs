/// Storage indexer — walks a storage path and builds its catalog subtree.
///
/// Directory reads run on `jwalk`'s worker pool, but entries arrive sorted
/// and every node is inserted on the calling thread, so the catalog is only
/// ever mutated by one thread. Per-entry failures are logged, reported on
/// the optional progress channel and skipped; the storage stays usable for
/// everything indexed around them.
pub mod progress;

use crate::aggregate::aggregate;
use crate::builder::{FileOptions, TreeBuilder};
use crate::error::Result;
use crate::model::{Catalog, NodeIndex, ROOT};
use crossbeam_channel::Sender;
use progress::IndexProgress;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Entries between two `IndexProgress::Update` messages.
const UPDATE_EVERY: u64 = 5_000;

/// Knobs for a single indexing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    /// Compute content digests.
    pub hash: bool,
    /// Catalog the members of recognised archives.
    pub archives: bool,
    /// Directory-reading threads. `0` or `1` walks serially.
    pub threads: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            hash: false,
            archives: false,
            threads: num_cpus::get(),
        }
    }
}

impl IndexOptions {
    fn file_options(&self) -> FileOptions {
        FileOptions {
            hash: self.hash,
            archives: self.archives,
        }
    }
}

/// What to index and under which name.
#[derive(Debug, Clone)]
pub struct IndexRequest {
    pub name: String,
    pub path: PathBuf,
    pub tags: Vec<String>,
    pub options: IndexOptions,
}

impl IndexRequest {
    /// Request named after the last component of `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: storage_display_name(&path),
            path,
            tags: Vec::new(),
            options: IndexOptions::default(),
        }
    }
}

/// Outcome of a finished indexing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub storage: NodeIndex,
    pub files: u64,
    pub dirs: u64,
    pub errors: u64,
    pub duration: Duration,
}

/// Index `request.path` as a new Storage under the catalog's Top node.
///
/// Fails only when the storage itself cannot be stat'd. The new storage is
/// aggregated before returning.
pub fn index_storage(
    catalog: &mut Catalog,
    builder: &TreeBuilder<'_>,
    request: &IndexRequest,
    progress: Option<&Sender<IndexProgress>>,
) -> Result<IndexReport> {
    let start = Instant::now();
    let root_path = request.path.as_path();
    info!("Indexing {} as \"{}\"", root_path.display(), request.name);

    let storage = builder.new_storage(
        catalog,
        &request.name,
        root_path,
        ROOT,
        request.tags.clone(),
    )?;

    let report = |message: IndexProgress| {
        if let Some(tx) = progress {
            let _ = tx.send(message);
        }
    };

    // Walked directory path -> its node. Lives for this run only.
    let mut dir_map: HashMap<PathBuf, NodeIndex> = HashMap::new();
    dir_map.insert(root_path.to_path_buf(), storage);

    let file_options = request.options.file_options();
    let mut files_found: u64 = 0;
    let mut dirs_found: u64 = 0;
    let mut error_count: u64 = 0;
    let mut seen: u64 = 0;

    let fail = |path: &Path, message: String| {
        warn!("Skipping {}: {message}", path.display());
        report(IndexProgress::Error {
            path: path.to_string_lossy().into_owned(),
            message,
        });
    };

    for entry_result in walker(root_path, request.options.threads) {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                error_count += 1;
                let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                fail(&path, err.to_string());
                continue;
            }
        };

        let path = entry.path();
        if path == root_path {
            continue;
        }
        seen += 1;

        let parent = match path.parent().and_then(|p| dir_map.get(p)) {
            Some(&idx) => idx,
            None => {
                error_count += 1;
                fail(&path, "parent directory was not indexed".into());
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy();
        let created = if entry.file_type().is_dir() {
            builder
                .new_dir(catalog, &name, &path, parent, root_path)
                .map(|idx| {
                    dir_map.insert(path.clone(), idx);
                    dirs_found += 1;
                })
        } else {
            builder
                .new_file(catalog, &name, &path, parent, root_path, file_options)
                .map(|_| files_found += 1)
        };

        if let Err(err) = created {
            error_count += 1;
            fail(&path, err.to_string());
        }

        if seen.is_multiple_of(UPDATE_EVERY) {
            report(IndexProgress::Update {
                files_found,
                dirs_found,
                current_path: path.to_string_lossy().into_owned(),
            });
        }
    }

    debug!(
        "Walk complete: {} files, {} dirs in {:?}. Running aggregation...",
        files_found,
        dirs_found,
        start.elapsed()
    );
    aggregate(catalog, storage);

    let duration = start.elapsed();
    info!(
        "Indexed \"{}\": {files_found} files, {dirs_found} dirs, {error_count} skipped in {duration:?}",
        request.name
    );
    report(IndexProgress::Complete {
        duration,
        error_count,
    });

    Ok(IndexReport {
        storage,
        files: files_found,
        dirs: dirs_found,
        errors: error_count,
        duration,
    })
}

fn walker(root: &Path, threads: usize) -> jwalk::WalkDir {
    let parallelism = if threads <= 1 {
        jwalk::Parallelism::Serial
    } else {
        jwalk::Parallelism::RayonNewPool(threads)
    };
    jwalk::WalkDir::new(root)
        .skip_hidden(false)
        .follow_links(false)
        .sort(true)
        .parallelism(parallelism)
}

/// Derive a storage name from its path: the last component, or the whole
/// path for roots like `/` or `E:\`.
pub fn storage_display_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => {
            let s = path.to_string_lossy();
            let trimmed = s.trim_end_matches(['/', '\\']);
            if trimmed.is_empty() {
                s.into_owned()
            } else {
                trimmed.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_display_name() {
        assert_eq!(storage_display_name(Path::new("/media/usb1")), "usb1");
        assert_eq!(storage_display_name(Path::new("/media/usb1/")), "usb1");
        assert_eq!(storage_display_name(Path::new("/")), "/");
    }

    #[test]
    fn test_default_options_use_all_cores() {
        let opts = IndexOptions::default();
        assert!(!opts.hash);
        assert!(!opts.archives);
        assert!(opts.threads >= 1);
    }
}
