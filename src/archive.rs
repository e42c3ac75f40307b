/// Archive member listing for zip and tar (plain or gzip-compressed) files.
use catsleuth_core::providers::ArchiveLister;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// Lists member paths without extracting anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileArchiveLister;

impl ArchiveLister for FileArchiveLister {
    fn is_supported(&self, extension: &str) -> bool {
        matches!(
            extension.to_ascii_lowercase().as_str(),
            "zip" | "tar" | "tgz" | "gz"
        )
    }

    fn list_members(&self, path: &Path) -> io::Result<Vec<String>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "zip" => zip_members(path),
            "tar" => tar_members(File::open(path)?),
            "tgz" => tar_members(GzDecoder::new(File::open(path)?)),
            // Only `.tar.gz` holds members; any other `.gz` is a single stream.
            "gz" if is_tar_gz(path) => tar_members(GzDecoder::new(File::open(path)?)),
            "gz" => Ok(Vec::new()),
            _ => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unknown archive format: {}", path.display()),
            )),
        }
    }
}

fn is_tar_gz(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.to_ascii_lowercase().ends_with(".tar"))
}

fn zip_members(path: &Path) -> io::Result<Vec<String>> {
    let mut archive = zip::ZipArchive::new(BufReader::new(File::open(path)?))?;
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        names.push(archive.by_index_raw(i)?.name().to_string());
    }
    Ok(names)
}

fn tar_members<R: Read>(reader: R) -> io::Result<Vec<String>> {
    let mut archive = tar::Archive::new(reader);
    let mut names = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        names.push(String::from_utf8_lossy(&entry.path_bytes()).into_owned());
    }
    Ok(names)
}
