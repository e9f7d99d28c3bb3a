//! Error types and result aliases for ipa-repo operations.
//!
//! Provides a unified error type that covers all possible error conditions
//! across the ipa-repo crates with actionable error messages.

use thiserror::Error;

/// Unified error type for all ipa-repo operations
#[derive(Error, Debug)]
pub enum IpaError {
    // Archive errors
    #[error("Invalid package archive: {reason}")]
    Archive { reason: String },

    // Record errors
    #[error("Metadata record for '{package}' is corrupt: {message}")]
    RecordCorrupt { package: String, message: String },

    #[error("Failed to write icon for '{package}'")]
    IconWrite {
        package: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    StorageWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Package '{name}' not found")]
    PackageNotFound { name: String },

    #[error("Invalid package file name '{name}': {reason}")]
    InvalidPackageName { name: String, reason: String },

    #[error("Field '{field}' is invalid: {reason}")]
    InvalidField { field: String, reason: String },

    // Config errors
    #[error("Failed to parse ipa-repo.toml: {message} at line {line}, column {column}")]
    TomlParse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Failed to parse JSON: {message}")]
    JsonParse { message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for ipa-repo operations
pub type IpaResult<T> = Result<T, IpaError>;

impl IpaError {
    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create a storage write error for a path
    pub fn storage_write(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        Self::StorageWrite {
            path: path.to_string(),
            source,
        }
    }

    /// Create an archive error from any displayable reason
    pub fn archive(reason: impl std::fmt::Display) -> Self {
        Self::Archive {
            reason: reason.to_string(),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IpaError::Io { .. } | IpaError::IconWrite { .. })
    }

    /// Whether this failure only concerns a single package.
    ///
    /// A catalog rebuild drops the package and keeps going on these; anything
    /// else points at shared storage and aborts the rebuild.
    pub fn is_package_local(&self) -> bool {
        matches!(
            self,
            IpaError::RecordCorrupt { .. } | IpaError::Archive { .. } | IpaError::Io { .. }
        )
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            IpaError::Archive { .. } => {
                Some("Make sure the file is an unencrypted .ipa containing Payload/<App>.app")
            },
            IpaError::RecordCorrupt { .. } => {
                Some("Fix or delete the .json record next to the package; it is rebuilt on the next 'ipa-repo rebuild'")
            },
            IpaError::PackageNotFound { .. } => {
                Some("Run 'ipa-repo list' to see the stored packages")
            },
            IpaError::InvalidPackageName { .. } => {
                Some("Use a plain file name ending in .ipa, without path separators")
            },
            IpaError::StorageWrite { .. } => {
                Some("Check that the repository directories exist and are writable")
            },
            IpaError::ConfigValidation { .. } | IpaError::TomlParse { .. } => {
                Some("Check ipa-repo.toml and the IPA_REPO_* environment variables")
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_local_errors() {
        let corrupt = IpaError::RecordCorrupt {
            package: "Bad".to_string(),
            message: "expected value".to_string(),
        };
        assert!(corrupt.is_package_local());
        assert!(IpaError::archive("not a zip").is_package_local());

        let storage = IpaError::storage_write(
            "repo/index.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!storage.is_package_local());
    }

    #[test]
    fn test_error_messages() {
        let err = IpaError::TomlParse {
            message: "expected `=`".to_string(),
            line: 3,
            column: 7,
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse ipa-repo.toml: expected `=` at line 3, column 7"
        );
        assert!(err.suggestion().is_some());

        let err = IpaError::archive("no application bundle");
        assert_eq!(err.to_string(), "Invalid package archive: no application bundle");
    }
}
