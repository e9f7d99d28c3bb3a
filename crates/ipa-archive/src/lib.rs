//! Package archive reading for ipa-repo
//!
//! This crate opens `.ipa` packages (zip containers holding
//! `Payload/<App>.app/`), decodes the bundle's `Info.plist`, picks an icon,
//! and maps the manifest onto the canonical metadata record.

pub mod manifest;
pub mod normalize;
pub mod reader;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

// Re-export main types
pub use manifest::ManifestRecord;
pub use normalize::{manifest_to_partial, normalize};
pub use reader::{extract_package, ExtractedPackage, PackageArchive};

use ipa_core::error::IpaError;

/// Result type for archive operations
pub type ArchiveResult<T> = Result<T, IpaError>;
