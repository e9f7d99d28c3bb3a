//! Icon materialization and icon URL resolution

use camino::{Utf8Path, Utf8PathBuf};
use ipa_core::error::IpaError;
use ipa_core::types::settings::ICON_EXTENSION;
use ipa_core::utils::hash::file_matches;
use ipa_core::utils::write_atomic;
use tracing::debug;

use crate::urls;
use crate::CatalogResult;

/// Decide the published icon URL for a package.
///
/// First match wins:
/// 1. an absolute `http(s)://` URL is kept
/// 2. an empty value becomes the materialized icon's URL when that file exists
/// 3. a root-relative path gets the base URL prepended
/// 4. anything else publishes no icon
pub fn resolve_icon_url(existing: &str, stem: &str, base_url: &str, icon_exists: bool) -> String {
    let existing = existing.trim();

    if urls::is_absolute(existing) {
        existing.to_string()
    } else if existing.is_empty() && icon_exists {
        urls::icon_url(base_url, stem)
    } else if existing.starts_with('/') {
        format!("{}{}", base_url, existing)
    } else {
        String::new()
    }
}

/// Writes `<stem>.png` files into the images root
#[derive(Debug, Clone)]
pub struct IconMaterializer {
    images_root: Utf8PathBuf,
}

impl IconMaterializer {
    pub fn new<P: AsRef<Utf8Path>>(images_root: P) -> Self {
        Self {
            images_root: images_root.as_ref().to_path_buf(),
        }
    }

    pub fn icon_path(&self, stem: &str) -> Utf8PathBuf {
        self.images_root.join(format!("{}.{}", stem, ICON_EXTENSION))
    }

    pub fn exists(&self, stem: &str) -> bool {
        self.icon_path(stem).is_file()
    }

    /// Store icon bytes as `<stem>.png`.
    ///
    /// Returns `false` when the file already holds these bytes.
    pub fn materialize(&self, stem: &str, bytes: &[u8]) -> CatalogResult<bool> {
        let path = self.icon_path(stem);
        if file_matches(path.as_std_path(), bytes) {
            debug!("Icon {} unchanged", path);
            return Ok(false);
        }

        write_atomic(path.as_std_path(), bytes).map_err(|e| match e {
            IpaError::StorageWrite { source, .. } => IpaError::IconWrite {
                package: stem.to_string(),
                source,
            },
            other => other,
        })?;
        Ok(true)
    }

    /// Resolve the published icon URL against what is on disk
    pub fn resolve(&self, existing: &str, stem: &str, base_url: &str) -> String {
        resolve_icon_url(existing, stem, base_url, self.exists(stem))
    }
}
