//! SHA-256 content hashing of dump files.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::SeedError;

const CHUNK_SIZE: usize = 64 * 1024; // 64 KB

/// Lowercase hex SHA-256 of everything `reader` yields.
pub fn hash_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Lowercase hex SHA-256 of a file's content.
pub fn hash_file(path: &Path) -> Result<String, SeedError> {
    let file = File::open(path).map_err(|e| SeedError::io(path, e))?;
    hash_reader(file).map_err(|e| SeedError::io(path, e))
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Write a digest to `dest`, replacing any previous content.
pub fn write_hash(hash: &str, dest: &Path) -> Result<(), SeedError> {
    std::fs::write(dest, hash).map_err(|e| SeedError::io(dest, e))
}

/// Read a digest previously written with [`write_hash`].
pub fn read_hash(path: &Path) -> Result<String, SeedError> {
    let content = std::fs::read_to_string(path).map_err(|e| SeedError::io(path, e))?;
    Ok(content.trim().to_string())
}
