//! Mapping from a decoded manifest onto the catalog record.

use ipa_core::{MetadataRecord, PartialMetadata, PartialVersion};

use crate::manifest::ManifestRecord;

/// Map manifest keys onto metadata fields, leaving absent keys unset
pub fn manifest_to_partial(manifest: &ManifestRecord) -> PartialMetadata {
    let owned = |value: Option<&str>| value.map(str::to_string);

    PartialMetadata {
        name: owned(manifest.display_name().or_else(|| manifest.bundle_name())),
        bundle_identifier: owned(manifest.bundle_identifier()),
        localized_description: owned(manifest.description()),
        versions: Some(vec![PartialVersion {
            version: owned(manifest.short_version()),
            build_version: owned(manifest.bundle_version()),
            localized_description: owned(manifest.description()),
            min_os_version: owned(manifest.minimum_os_version()),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

/// Produce a complete record from a manifest.
///
/// Pure: download URL, size and date stay empty and are filled by the caller
/// that knows where the package lives.
pub fn normalize(manifest: &ManifestRecord, package_stem: &str, namespace: &str) -> MetadataRecord {
    manifest_to_partial(manifest).apply_defaults(package_stem, namespace)
}
