//! Core data types for the ipa-repo catalog.
//!
//! This module provides the fundamental types used throughout ipa-repo:
//! - Per-package metadata records and their partial (stored) form
//! - Operator patches applied on top of stored records
//! - The published catalog document
//! - Repository settings injected into the pipeline

pub mod catalog;
pub mod metadata;
pub mod patch;
pub mod settings;

// Re-export all public types
pub use catalog::{CatalogDocument, CatalogIdentity};
pub use metadata::{
    synthesize_bundle_identifier, MetadataRecord, PartialMetadata, PartialVersion, VersionRecord,
};
pub use patch::MetadataPatch;
pub use settings::RepositorySettings;
