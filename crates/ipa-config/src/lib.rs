//! Configuration loading for ipa-repo
//!
//! This crate parses `ipa-repo.toml`, layers it with the global config,
//! `IPA_REPO_*` environment variables and command line flags, and resolves the
//! result into the [`RepositorySettings`](ipa_core::RepositorySettings) the
//! catalog pipeline runs with.

pub mod merge;
pub mod toml;

// Re-export main types
pub use merge::{resolve_settings, ConfigLayering, ConfigLoader, ConfigSource, ResolvedConfig};
pub use toml::{CatalogSection, RepoToml, ServerSection, StorageSection};

use ipa_core::error::IpaError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, IpaError>;
