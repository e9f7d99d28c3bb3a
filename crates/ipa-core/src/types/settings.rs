//! Repository settings injected into the pipeline at startup.

use camino::{Utf8Path, Utf8PathBuf};

use super::catalog::CatalogIdentity;
use super::metadata::DEFAULT_BUNDLE_NAMESPACE;

/// URL path under which packages are published
pub const PACKAGES_URL_PREFIX: &str = "/repo/packages";
/// URL path under which icons are published
pub const IMAGES_URL_PREFIX: &str = "/repo/images";
/// URL path of the catalog document
pub const CATALOG_URL_PATH: &str = "/repo/index.json";

pub const PACKAGE_EXTENSION: &str = "ipa";
pub const RECORD_EXTENSION: &str = "json";
pub const ICON_EXTENSION: &str = "png";

/// Where packages, records, icons and the catalog live, and how they are published
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySettings {
    /// Package archives and their `.json` records
    pub packages_root: Utf8PathBuf,
    /// Materialized `<stem>.png` icons
    pub images_root: Utf8PathBuf,
    /// Output path of the catalog document
    pub catalog_path: Utf8PathBuf,
    /// Public origin, without trailing slash; empty for root-relative URLs
    pub base_url: String,
    /// Namespace used in synthesized bundle identifiers
    pub bundle_namespace: String,
    /// Static catalog identity
    pub identity: CatalogIdentity,
}

impl RepositorySettings {
    /// Standard layout under `root`: `packages/`, `images/`, `index.json`
    pub fn with_root<P: AsRef<Utf8Path>>(root: P, base_url: &str) -> Self {
        let root = root.as_ref();
        Self {
            packages_root: root.join("packages"),
            images_root: root.join("images"),
            catalog_path: root.join("index.json"),
            base_url: normalize_base_url(base_url),
            bundle_namespace: DEFAULT_BUNDLE_NAMESPACE.to_string(),
            identity: CatalogIdentity::default(),
        }
    }

    /// Public URL of the catalog document
    pub fn catalog_url(&self) -> String {
        format!("{}{}", self.base_url, CATALOG_URL_PATH)
    }
}

/// Trim whitespace and trailing slashes from a base URL
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}
