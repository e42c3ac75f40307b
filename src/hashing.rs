/// BLAKE3 content digests for indexed files.
use catsleuth_core::providers::ContentHasher;
use std::fs::File;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl ContentHasher for Blake3Hasher {
    fn digest(&self, path: &Path) -> io::Result<String> {
        let mut file = File::open(path)?;
        let mut hasher = blake3::Hasher::new();
        io::copy(&mut file, &mut hasher)?;
        Ok(hasher.finalize().to_hex().to_string())
    }
}
