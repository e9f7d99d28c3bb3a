//! Catalog assembly
//!
//! A rebuild enumerates every package, makes sure each one has a record
//! (ingesting the package when it does not), refreshes the derived fields from
//! the live files and writes `index.json`. Records are only ever read here,
//! except for packages ingested on the way.

use ipa_core::utils::hash::file_matches;
use ipa_core::utils::{to_pretty_json, write_atomic};
use ipa_core::{CatalogDocument, MetadataRecord};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::repository::{PackageEntry, Repository};
use crate::urls;
use crate::CatalogResult;

/// A package left out of the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPackage {
    pub file_name: String,
    pub reason: String,
}

/// Outcome of a catalog build
#[derive(Debug, Clone)]
pub struct CatalogBuild {
    pub document: CatalogDocument,
    /// Entries in the document
    pub included: usize,
    /// Records created for packages that had none
    pub created: usize,
    pub skipped: Vec<SkippedPackage>,
}

impl Repository {
    /// Assemble the catalog document without writing it
    pub fn build_catalog(&self) -> CatalogResult<CatalogBuild> {
        let packages = self.packages()?;
        debug!("Building catalog from {} packages", packages.len());

        let results: Vec<(&PackageEntry, CatalogResult<(MetadataRecord, bool)>)> = packages
            .par_iter()
            .map(|entry| (entry, self.ensure_record(entry)))
            .collect();

        let mut apps: Vec<(&str, MetadataRecord)> = Vec::with_capacity(results.len());
        let mut created = 0;
        let mut skipped = Vec::new();
        for (entry, result) in results {
            match result {
                Ok((record, was_created)) => {
                    if was_created {
                        created += 1;
                    }
                    apps.push((entry.file_name.as_str(), record));
                },
                Err(e) if e.is_package_local() => {
                    warn!("Skipping {}: {}", entry.file_name, e);
                    skipped.push(SkippedPackage {
                        file_name: entry.file_name.clone(),
                        reason: e.to_string(),
                    });
                },
                Err(e) => return Err(e),
            }
        }

        sort_apps(&mut apps);
        let apps: Vec<MetadataRecord> = apps.into_iter().map(|(_, record)| record).collect();

        let mut document = CatalogDocument::new(&self.settings.identity, apps);
        document.icon_url = urls::resolve_static(&self.settings.base_url, &document.icon_url);

        Ok(CatalogBuild {
            included: document.apps.len(),
            document,
            created,
            skipped,
        })
    }

    /// Build the catalog and write it to the catalog path.
    ///
    /// The file is left untouched when its content would not change.
    pub fn rebuild_catalog(&self) -> CatalogResult<CatalogBuild> {
        let build = self.build_catalog()?;
        let content = to_pretty_json(&build.document)?;
        let path = self.settings.catalog_path.as_std_path();

        if file_matches(path, &content) {
            debug!("Catalog {} unchanged", self.settings.catalog_path);
        } else {
            write_atomic(path, &content)?;
        }

        info!(
            "Catalog rebuilt: {} included, {} created, {} skipped",
            build.included,
            build.created,
            build.skipped.len()
        );
        Ok(build)
    }

    /// Load or create the record for one package and refresh its derived fields
    fn ensure_record(&self, entry: &PackageEntry) -> CatalogResult<(MetadataRecord, bool)> {
        let (mut record, created) = match self.store.load(&entry.stem)? {
            Some(record) => (record, false),
            None => (self.ingest_file(entry)?, true),
        };

        let base_url = &self.settings.base_url;
        record.icon_url = self.icons.resolve(&record.icon_url, &entry.stem, base_url);
        let version = record.primary_version_mut();
        version.download_url = urls::download_url(base_url, &entry.file_name);
        version.size = entry.size;

        Ok((record, created))
    }
}

/// Case-insensitive by name, ties by package file name
fn sort_apps(apps: &mut [(&str, MetadataRecord)]) {
    apps.sort_by(|(a_file, a), (b_file, b)| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a_file.cmp(b_file))
    });
}

impl CatalogBuild {
    /// Whether any package was left out
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}

impl std::fmt::Display for SkippedPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file_name, self.reason)
    }
}
