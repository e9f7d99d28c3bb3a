//! Repository facade: ingestion and operator overrides.

use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use ipa_archive::{extract_package, normalize};
use ipa_core::error::IpaError;
use ipa_core::types::settings::PACKAGE_EXTENSION;
use ipa_core::utils::path::{
    has_package_extension, package_stem, validate_package_file_name, validate_package_stem,
};
use ipa_core::{MetadataPatch, MetadataRecord, PartialMetadata, RepositorySettings};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::icons::IconMaterializer;
use crate::store::OverrideStore;
use crate::urls;
use crate::CatalogResult;

/// Date format of `versions[].date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ingestion behaviour switches
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Replace an existing record with freshly extracted metadata
    pub replace_metadata: bool,
}

/// A package file found in the packages root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    pub file_name: String,
    pub stem: String,
    pub path: Utf8PathBuf,
    pub size: u64,
}

/// Storage layout plus the pipeline operating on it
#[derive(Debug, Clone)]
pub struct Repository {
    pub(crate) settings: RepositorySettings,
    pub(crate) store: OverrideStore,
    pub(crate) icons: IconMaterializer,
}

impl Repository {
    /// Open the repository, creating its directories if needed
    pub fn open(settings: RepositorySettings) -> CatalogResult<Self> {
        for dir in [&settings.packages_root, &settings.images_root] {
            std::fs::create_dir_all(dir).map_err(|e| IpaError::storage_write(dir, e))?;
        }
        if let Some(parent) = settings.catalog_path.parent().filter(|p| !p.as_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| IpaError::storage_write(parent, e))?;
        }

        let store = OverrideStore::new(&settings.packages_root, &settings.bundle_namespace);
        let icons = IconMaterializer::new(&settings.images_root);
        debug!("Opened repository at {}", settings.packages_root);

        Ok(Self {
            settings,
            store,
            icons,
        })
    }

    pub fn settings(&self) -> &RepositorySettings {
        &self.settings
    }

    pub fn store(&self) -> &OverrideStore {
        &self.store
    }

    pub fn icons(&self) -> &IconMaterializer {
        &self.icons
    }

    /// Where a package with this file name lives
    pub fn package_path(&self, file_name: &str) -> Utf8PathBuf {
        self.settings.packages_root.join(file_name)
    }

    /// All packages, ordered by file name.
    ///
    /// When two files share a stem only the first is listed.
    pub fn packages(&self) -> CatalogResult<Vec<PackageEntry>> {
        let root = &self.settings.packages_root;
        let read_dir = std::fs::read_dir(root)
            .map_err(|e| IpaError::io(format!("Failed to list packages in {}", root), e))?;

        let mut entries = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = dir_entry
                .map_err(|e| IpaError::io(format!("Failed to list packages in {}", root), e))?;
            let Ok(path) = Utf8PathBuf::from_path_buf(dir_entry.path()) else {
                warn!("Skipping non UTF-8 path {}", dir_entry.path().display());
                continue;
            };
            let Some(file_name) = path.file_name().map(str::to_string) else {
                continue;
            };
            if file_name.starts_with('.') || !has_package_extension(&file_name) {
                continue;
            }
            if let Err(e) = validate_package_file_name(&file_name) {
                warn!("Skipping {}: {}", path, e);
                continue;
            }
            let Some(stem) = package_stem(&file_name).map(str::to_string) else {
                continue;
            };

            match dir_entry.metadata() {
                Ok(meta) if meta.is_file() => entries.push(PackageEntry {
                    file_name,
                    stem,
                    path,
                    size: meta.len(),
                }),
                Ok(_) => {},
                Err(e) => warn!("Skipping {}: {}", path, e),
            }
        }

        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        let mut seen = HashSet::new();
        entries.retain(|entry| {
            let first = seen.insert(entry.stem.clone());
            if !first {
                warn!("Ignoring {}: another package already uses stem '{}'", entry.file_name, entry.stem);
            }
            first
        });
        Ok(entries)
    }

    /// Find the package file for a stem
    pub fn find_package(&self, stem: &str) -> CatalogResult<Option<PackageEntry>> {
        Ok(self.packages()?.into_iter().find(|entry| entry.stem == stem))
    }

    /// Stored record for a stem
    pub fn record(&self, stem: &str) -> CatalogResult<Option<MetadataRecord>> {
        validate_package_stem(stem)?;
        self.store.load(stem)
    }

    /// Extract metadata from a package and persist its record
    pub fn ingest(&self, stem: &str, bytes: &[u8]) -> CatalogResult<MetadataRecord> {
        self.ingest_with(stem, bytes, IngestOptions::default())
    }

    /// Ingest with explicit options.
    ///
    /// Fails with `Archive` when the bytes are not a package. An existing
    /// record is kept unless `replace_metadata` is set; the icon is
    /// re-materialized either way and the derived fields refresh.
    pub fn ingest_with(
        &self,
        stem: &str,
        bytes: &[u8],
        options: IngestOptions,
    ) -> CatalogResult<MetadataRecord> {
        validate_package_stem(stem)?;
        let extracted = extract_package(bytes)?;

        let icon_stored = match extracted.icon {
            Some(icon) => match self.icons.materialize(stem, &icon) {
                Ok(_) => true,
                Err(e) => {
                    warn!("Icon for {} not stored: {}", stem, e);
                    false
                },
            },
            None => false,
        };

        let existing = if options.replace_metadata {
            None
        } else {
            match self.store.load(stem) {
                Ok(existing) => existing,
                Err(e @ IpaError::RecordCorrupt { .. }) => {
                    warn!("Replacing unreadable record: {}", e);
                    None
                },
                Err(e) => return Err(e),
            }
        };

        let record = match existing {
            Some(mut record) => {
                if icon_stored && record.icon_url.trim().is_empty() {
                    record.icon_url = urls::icon_path(stem);
                }
                self.refresh_download(&mut record, stem, bytes.len() as u64);
                record
            },
            None => {
                let mut record = normalize(&extracted.manifest, stem, &self.settings.bundle_namespace);
                record.icon_url = if icon_stored {
                    urls::icon_path(stem)
                } else {
                    String::new()
                };
                record.primary_version_mut().date = today();
                self.refresh_download(&mut record, stem, bytes.len() as u64);
                record
            },
        };

        self.store.save(stem, &record)?;
        info!(
            "Ingested {} as {} ({} {})",
            stem,
            record.name,
            record.bundle_identifier,
            record.version()
        );
        Ok(record)
    }

    /// Persist a default record for a package whose archive could not be read.
    ///
    /// An existing record is left untouched.
    pub fn ingest_defaults(&self, stem: &str, size: u64) -> CatalogResult<MetadataRecord> {
        validate_package_stem(stem)?;
        match self.store.load(stem) {
            Ok(Some(record)) => return Ok(record),
            Ok(None) | Err(IpaError::RecordCorrupt { .. }) => {},
            Err(e) => return Err(e),
        }

        let mut record = PartialMetadata::default().apply_defaults(stem, &self.settings.bundle_namespace);
        record.primary_version_mut().date = today();
        self.refresh_download(&mut record, stem, size);

        self.store.save(stem, &record)?;
        info!("Stored default record for {}", stem);
        Ok(record)
    }

    /// Overwrite selected fields of a package's record.
    ///
    /// A package without a record is ingested first.
    pub fn apply_override(&self, stem: &str, patch: &MetadataPatch) -> CatalogResult<MetadataRecord> {
        validate_package_stem(stem)?;
        patch.validate()?;

        let mut record = match self.store.load(stem)? {
            Some(record) => record,
            None => {
                let entry = self.find_package(stem)?.ok_or_else(|| IpaError::PackageNotFound {
                    name: stem.to_string(),
                })?;
                self.ingest_file(&entry)?
            },
        };

        patch.apply_to(&mut record);
        self.store.save(stem, &record)?;
        info!("Updated {} ({})", stem, patch.changed_fields().join(", "));
        Ok(record)
    }

    /// Ingest a stored package file, falling back to a default record for unreadable archives
    pub(crate) fn ingest_file(&self, entry: &PackageEntry) -> CatalogResult<MetadataRecord> {
        let bytes = read_package(&entry.path)?;
        match self.ingest(&entry.stem, &bytes) {
            Err(IpaError::Archive { reason }) => {
                warn!("{} is not a readable package ({}); using defaults", entry.file_name, reason);
                self.ingest_defaults(&entry.stem, bytes.len() as u64)
            },
            other => other,
        }
    }

    /// Point `versions[0]` at the stored package file for `stem`
    fn refresh_download(&self, record: &mut MetadataRecord, stem: &str, size: u64) {
        let file_name = match self.find_package(stem) {
            Ok(Some(entry)) => entry.file_name,
            _ => format!("{}.{}", stem, PACKAGE_EXTENSION),
        };
        let version = record.primary_version_mut();
        version.download_url = urls::download_url(&self.settings.base_url, &file_name);
        version.size = size;
    }
}

pub(crate) fn read_package(path: &Utf8Path) -> CatalogResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| IpaError::io(format!("Failed to read package {}", path), e))
}

fn today() -> String {
    Utc::now().format(DATE_FORMAT).to_string()
}
