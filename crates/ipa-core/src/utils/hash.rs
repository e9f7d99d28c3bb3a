//! Blake3 hashing utilities.
//!
//! Used to tell whether a file on disk already holds given content.

use crate::error::{IpaError, IpaResult};
use std::path::Path;

/// Compute Blake3 hash of data
pub fn blake3_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Compute Blake3 hash of a file
pub fn blake3_hash_file(path: &Path) -> IpaResult<String> {
    let data = std::fs::read(path)
        .map_err(|e| IpaError::io(format!("Failed to read file: {}", path.display()), e))?;
    Ok(blake3_hash(&data))
}

/// Check whether the file at `path` exists and holds exactly `data`
pub fn file_matches(path: &Path, data: &[u8]) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() == data.len() as u64 => {
            blake3_hash_file(path).map_or(false, |hash| hash == blake3_hash(data))
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_blake3_hash() {
        let hash = blake3_hash(b"hello world");

        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, blake3_hash(b"hello world"));
    }

    #[test]
    fn test_file_matches() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("icon.png");

        assert!(!file_matches(&path, b"icon"));

        std::fs::write(&path, b"icon").unwrap();
        assert!(file_matches(&path, b"icon"));
        assert!(!file_matches(&path, b"icon2"));
        assert!(!file_matches(&path, b"nope"));
    }
}
