/// Collaborator contracts — disk usage, content hashing and archive listing.
///
/// The core never implements these against the real world; callers plug in
/// platform probes, digest algorithms and archive readers. The null objects
/// here cover callers that disable a feature, and tests.
use std::io;
use std::path::Path;

/// Free and total capacity of the volume holding a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiskUsage {
    pub free: u64,
    pub total: u64,
}

pub trait DiskStat {
    fn stat(&self, path: &Path) -> io::Result<DiskUsage>;
}

pub trait ContentHasher {
    /// Digest of the file's content, rendered as a string (usually hex).
    fn digest(&self, path: &Path) -> io::Result<String>;
}

pub trait ArchiveLister {
    /// Whether files with this extension (no leading dot) can be listed.
    fn is_supported(&self, extension: &str) -> bool;

    /// Member paths inside the archive, `/`-separated as stored in the archive.
    fn list_members(&self, path: &Path) -> io::Result<Vec<String>>;
}

/// Reports the same usage for every path that exists.
///
/// Useful where no platform probe is available; the snapshot is then only
/// as good as the constant.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDiskStat(pub DiskUsage);

impl DiskStat for FixedDiskStat {
    fn stat(&self, path: &Path) -> io::Result<DiskUsage> {
        std::fs::metadata(path)?;
        Ok(self.0)
    }
}

/// Hasher for catalogs built without digests. Any call is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHashing;

impl ContentHasher for NoHashing {
    fn digest(&self, path: &Path) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("no content hasher configured for {}", path.display()),
        ))
    }
}

/// Lister that recognises no archive format.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoArchives;

impl ArchiveLister for NoArchives {
    fn is_supported(&self, _extension: &str) -> bool {
        false
    }

    fn list_members(&self, path: &Path) -> io::Result<Vec<String>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("no archive lister configured for {}", path.display()),
        ))
    }
}
