//! Catalog pipeline for ipa-repo
//!
//! This crate owns everything stored next to the packages: the per-package
//! JSON records, the materialized icons and the published `index.json`.
//! [`Repository`] ties them together and exposes ingestion, operator
//! overrides and catalog rebuilds.

pub mod builder;
pub mod icons;
pub mod repository;
pub mod store;
pub mod urls;


// Re-export main types
pub use builder::{CatalogBuild, SkippedPackage};
pub use icons::{resolve_icon_url, IconMaterializer};
pub use repository::{IngestOptions, PackageEntry, Repository};
pub use store::{OverrideStore, RecordStatus};

use ipa_core::error::IpaError;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, IpaError>;
