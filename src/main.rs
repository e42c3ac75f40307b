//! CatSleuth — catalog a storage path, then browse and search the catalog.
//!
//! Thin binary entry point. All catalog logic lives in `catsleuth-core`;
//! this crate only wires the platform disk probe, hashing, and output sinks
//! around it.

mod archive;
mod hashing;
mod platform;
mod sink;

use anyhow::Context;
use catsleuth_core::builder::TreeBuilder;
use catsleuth_core::display::{emit_hits, list, render_tree, DisplayEntry, DisplaySink, RenderFlags};
use catsleuth_core::indexer::{index_storage, IndexOptions, IndexRequest};
use catsleuth_core::providers::{ArchiveLister, ContentHasher, NoArchives, NoHashing};
use catsleuth_core::search::search;
use catsleuth_core::sort::{SortOrder, SortPolicy};
use catsleuth_core::{Catalog, ROOT};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catsleuth")]
#[command(about = "Index a storage path into a catalog, then list, search, or print it")]
#[command(version)]
struct Args {
    /// Storage path to index (mount point, folder, or drive root)
    path: PathBuf,

    /// Storage name in the catalog (defaults to the last path component)
    #[arg(short = 'n', long = "name")]
    name: Option<String>,

    /// Free-form tag attached to the storage (can be used multiple times)
    #[arg(short = 't', long = "tag")]
    tags: Vec<String>,

    /// Compute a BLAKE3 digest for every file
    #[arg(long = "hash")]
    hash: bool,

    /// Catalog the members of zip and tar archives
    #[arg(short = 'a', long = "archive")]
    archive: bool,

    /// Show archive members in `tree` output
    #[arg(long = "show-archives")]
    show_archives: bool,

    /// Directory-reading threads (0 = auto-detect, 1 = sequential)
    #[arg(short = 'j', long = "jobs", default_value = "0")]
    jobs: usize,

    /// Order siblings by size instead of type and name
    #[arg(short = 's', long = "sort-size")]
    sort_size: bool,

    /// Reverse the sibling order
    #[arg(long = "reverse")]
    reverse: bool,

    /// Write CSV instead of indented text
    #[arg(long = "csv")]
    csv: bool,

    /// Log at debug level
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the whole catalog as a tree
    Tree,
    /// List nodes matching a glob path such as `usb1/*/*.jpg`
    Ls {
        /// Glob path from the catalog root (defaults to `<storage>/*`)
        pattern: Option<String>,
        /// Print the whole tree under the matches
        #[arg(short = 'r', long = "recursive")]
        recursive: bool,
    },
    /// Find nodes whose name contains a term (case-insensitive)
    Find {
        term: String,
    },
    /// Show the indexed storage and catalog metadata
    Storages,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialise structured logging on stderr so stdout stays clean for output.
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(io::stderr)
        .init();

    let catalog = build_catalog(&args)?;

    let stdout = io::stdout();
    let out = stdout.lock();
    if args.csv {
        let mut sink = sink::CsvSink::new(out);
        run_query(&catalog, &args, &mut sink)?;
        sink.finish()?.flush()?;
    } else {
        let mut sink = sink::TextSink::new(out);
        run_query(&catalog, &args, &mut sink)?;
        sink.into_inner().flush()?;
    }
    Ok(())
}

fn build_catalog(args: &Args) -> anyhow::Result<Catalog> {
    let threads = if args.jobs == 0 {
        IndexOptions::default().threads
    } else {
        args.jobs
    };
    let mut request = IndexRequest::new(&args.path);
    if let Some(name) = &args.name {
        request.name = name.clone();
    }
    request.tags = args.tags.clone();
    request.options = IndexOptions {
        hash: args.hash,
        archives: args.archive,
        threads,
    };

    let hasher: &dyn ContentHasher = if args.hash {
        &hashing::Blake3Hasher
    } else {
        &NoHashing
    };
    let lister: &dyn ArchiveLister = if args.archive {
        &archive::FileArchiveLister
    } else {
        &NoArchives
    };
    let builder = TreeBuilder::new(&platform::VolumeStat, hasher, lister);

    let mut catalog = TreeBuilder::new_top();
    TreeBuilder::update_meta(&mut catalog)?;
    let report = index_storage(&mut catalog, &builder, &request, None)
        .with_context(|| format!("cannot index {}", args.path.display()))?;

    if report.errors > 0 {
        tracing::warn!("{} entries could not be indexed", report.errors);
    }
    Ok(catalog)
}

fn run_query(catalog: &Catalog, args: &Args, sink: &mut dyn DisplaySink) -> anyhow::Result<()> {
    let order = SortOrder {
        policy: if args.sort_size {
            SortPolicy::Size
        } else {
            SortPolicy::Name
        },
        descending: args.reverse,
    };

    match &args.command {
        Command::Tree => {
            let flags = RenderFlags {
                with_archives: args.show_archives,
                ..RenderFlags::default()
            };
            render_tree(catalog, ROOT, order, flags, sink)?;
        }
        Command::Ls { pattern, recursive } => {
            let pattern = match pattern {
                Some(p) => p.clone(),
                None => format!("{}/*", catalog.storage_names().first().copied().unwrap_or("")),
            };
            let found = list(catalog, ROOT, &pattern, order, *recursive, sink)?;
            if found.is_empty() {
                tracing::info!("nothing matches \"{pattern}\"");
            }
        }
        Command::Find { term } => {
            let hits = search(catalog, ROOT, term);
            tracing::info!("{} match(es) for \"{term}\"", hits.len());
            emit_hits(catalog, &hits, sink)?;
        }
        Command::Storages => {
            let flags = RenderFlags::default();
            for node in catalog.meta().into_iter().chain(catalog.storages()) {
                let entry = DisplayEntry {
                    node,
                    depth: 0,
                    flags,
                    storage: catalog.storage_of(node),
                    child_count: catalog.child_count(node),
                };
                sink.emit(catalog, &entry)?;
            }
        }
    }
    Ok(())
}
