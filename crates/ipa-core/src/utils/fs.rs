//! Atomic file replacement and JSON formatting.

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{IpaError, IpaResult};

/// Replace `path` with `content` without ever exposing a partial file.
///
/// The content goes to a temporary file in the same directory, is synced,
/// then renamed over the target.
pub fn write_atomic(path: &Path, content: &[u8]) -> IpaResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(parent)
        .map_err(|e| IpaError::storage_write(parent.display(), e))?;

    let mut temp = NamedTempFile::new_in(parent)
        .map_err(|e| IpaError::storage_write(path.display(), e))?;
    temp.write_all(content)
        .map_err(|e| IpaError::storage_write(path.display(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| IpaError::storage_write(path.display(), e))?;
    temp.persist(path)
        .map_err(|e| IpaError::storage_write(path.display(), e.error))?;

    debug!("Wrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}

/// Serialize with four-space indentation and a trailing newline
pub fn to_pretty_json<T: Serialize>(value: &T) -> IpaResult<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|e| IpaError::JsonParse {
            message: format!("JSON serialization error: {}", e),
        })?;
    buffer.push(b'\n');
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_replaces_content() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("record.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");

        // No temporary files left behind
        let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_pretty_json_format() {
        let value = serde_json::json!({"name": "Привет"});
        let bytes = to_pretty_json(&value).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert_eq!(text, "{\n    \"name\": \"Привет\"\n}\n");
    }
}
