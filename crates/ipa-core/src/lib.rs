//! # ipa-core
//!
//! Core types and utilities shared across all ipa-repo crates.
//!
//! This crate provides:
//! - MetadataRecord and VersionRecord, the per-package catalog entries
//! - PartialMetadata and the canonical `apply_defaults` completion step
//! - MetadataPatch for operator edits
//! - CatalogDocument and RepositorySettings
//! - IpaError enum for unified error handling
//! - Utility functions for hashing, path validation and atomic writes
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (records, patches, catalog, settings)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use error::{IpaError, IpaResult};
pub use types::{
    CatalogDocument, CatalogIdentity, MetadataPatch, MetadataRecord, PartialMetadata,
    PartialVersion, RepositorySettings, VersionRecord,
};
