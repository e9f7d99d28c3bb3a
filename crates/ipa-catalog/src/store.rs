//! Per-package metadata records
//!
//! Each package `<stem>.ipa` has a JSON record `<stem>.json` next to it. The
//! record holds whatever was extracted at ingestion plus operator edits, and
//! is the source of truth for every non-derived catalog field.

use camino::{Utf8Path, Utf8PathBuf};
use ipa_core::error::IpaError;
use ipa_core::types::settings::RECORD_EXTENSION;
use ipa_core::utils::{to_pretty_json, write_atomic};
use ipa_core::{MetadataRecord, PartialMetadata};
use std::io::ErrorKind;
use tracing::debug;

use crate::CatalogResult;

/// Record state of a stored package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    Present(MetadataRecord),
    Missing,
    Corrupt(String),
}

/// JSON side-records keyed by package stem
#[derive(Debug, Clone)]
pub struct OverrideStore {
    root: Utf8PathBuf,
    namespace: String,
}

impl OverrideStore {
    /// Create a store over `root`; `namespace` is used when completing partial records
    pub fn new<P: AsRef<Utf8Path>>(root: P, namespace: &str) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            namespace: namespace.to_string(),
        }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Path of the record for a package stem
    pub fn record_path(&self, stem: &str) -> Utf8PathBuf {
        self.root.join(format!("{}.{}", stem, RECORD_EXTENSION))
    }

    pub fn exists(&self, stem: &str) -> bool {
        self.record_path(stem).is_file()
    }

    /// Load and complete a record.
    ///
    /// Missing keys are filled by `apply_defaults`; undecodable JSON is
    /// `RecordCorrupt`.
    pub fn load(&self, stem: &str) -> CatalogResult<Option<MetadataRecord>> {
        let path = self.record_path(stem);
        let content = match std::fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IpaError::io(format!("Failed to read record {}", path), e)),
        };

        let partial: PartialMetadata =
            serde_json::from_slice(&content).map_err(|e| IpaError::RecordCorrupt {
                package: stem.to_string(),
                message: e.to_string(),
            })?;

        Ok(Some(partial.apply_defaults(stem, &self.namespace)))
    }

    /// Atomically replace the record for `stem`
    pub fn save(&self, stem: &str, record: &MetadataRecord) -> CatalogResult<()> {
        let path = self.record_path(stem);
        let content = to_pretty_json(record)?;
        write_atomic(path.as_std_path(), &content)?;
        debug!("Saved record {}", path);
        Ok(())
    }

    /// Classify the record without failing
    pub fn status(&self, stem: &str) -> RecordStatus {
        match self.load(stem) {
            Ok(Some(record)) => RecordStatus::Present(record),
            Ok(None) => RecordStatus::Missing,
            Err(e) => RecordStatus::Corrupt(e.to_string()),
        }
    }
}
