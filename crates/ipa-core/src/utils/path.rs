//! Path utilities for package file names.
//!
//! Package names come from operators (chat uploads, CLI arguments), so they
//! are checked before being joined onto a storage root.

use crate::error::{IpaError, IpaResult};
use crate::types::settings::PACKAGE_EXTENSION;
use std::path::{Component, Path};

/// Check that `name` is a plain `.ipa` file name safe to place in the packages root
pub fn validate_package_file_name(name: &str) -> IpaResult<()> {
    let invalid = |reason: &str| IpaError::InvalidPackageName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    if name.starts_with('.') {
        return Err(invalid("hidden files are not allowed"));
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(invalid("name must not contain path separators"));
    }

    let mut components = Path::new(name).components();
    if !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        return Err(invalid("name must be a single path component"));
    }

    if !has_package_extension(name) {
        return Err(invalid("name must end in .ipa"));
    }

    match package_stem(name) {
        Some(stem) if !stem.trim().is_empty() => Ok(()),
        _ => Err(invalid("name has no stem")),
    }
}

/// Check that `stem` can name a record and an icon inside the storage roots.
///
/// Stems come from package file names, so the same rules apply minus the
/// extension.
pub fn validate_package_stem(stem: &str) -> IpaResult<()> {
    let invalid = |reason: &str| IpaError::InvalidPackageName {
        name: stem.to_string(),
        reason: reason.to_string(),
    };

    if stem.trim().is_empty() {
        return Err(invalid("stem is empty"));
    }
    if stem.starts_with('.') {
        return Err(invalid("stem must not start with '.'"));
    }
    if stem.contains('/') || stem.contains('\\') || stem.contains('\0') {
        return Err(invalid("stem must not contain path separators"));
    }

    let mut components = Path::new(stem).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid("stem must be a single path component")),
    }
}

/// Check if a file name carries the package extension (case-insensitive)
pub fn has_package_extension(name: &str) -> bool {
    get_extension(Path::new(name)).as_deref() == Some(PACKAGE_EXTENSION)
}

/// File name without its extension
pub fn package_stem(name: &str) -> Option<&str> {
    Path::new(name).file_stem().and_then(|stem| stem.to_str())
}

/// Get the file extension as a lowercase string
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_package_names() {
        assert!(validate_package_file_name("Demo.ipa").is_ok());
        assert!(validate_package_file_name("My App 2.IPA").is_ok());
        assert!(validate_package_file_name("app.v1.2.ipa").is_ok());
    }

    #[test]
    fn test_invalid_package_names() {
        let invalid = [
            "",
            "demo.zip",
            "demo",
            ".ipa",
            ".hidden.ipa",
            "../escape.ipa",
            "dir/demo.ipa",
            "dir\\demo.ipa",
            "/abs.ipa",
        ];
        for name in invalid {
            assert!(
                validate_package_file_name(name).is_err(),
                "{} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_package_stems() {
        for stem in ["Demo", "My App 2", "app.v1"] {
            assert!(validate_package_stem(stem).is_ok(), "{} should be accepted", stem);
        }
        for stem in ["", "  ", ".", "..", "../../escaped", ".hidden", "a/b", "a\\b", "/abs", "nul\0"] {
            assert!(
                matches!(validate_package_stem(stem), Err(IpaError::InvalidPackageName { .. })),
                "{:?} should be rejected",
                stem
            );
        }
    }

    #[test]
    fn test_package_stem() {
        assert_eq!(package_stem("Demo.ipa"), Some("Demo"));
        assert_eq!(package_stem("app.v1.ipa"), Some("app.v1"));
    }

    #[test]
    fn test_get_extension() {
        assert_eq!(get_extension(Path::new("file.IPA")), Some("ipa".to_string()));
        assert_eq!(get_extension(Path::new("no_extension")), None);
    }
}
