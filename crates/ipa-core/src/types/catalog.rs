//! The published catalog document.

use serde::{Deserialize, Serialize};

use super::metadata::{DEFAULT_TINT_COLOR, MetadataRecord};

/// Static identity of the published repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogIdentity {
    pub name: String,
    pub identifier: String,
    pub subtitle: String,
    pub description: String,
    pub icon_url: String,
    pub website: String,
    pub tint_color: String,
}

impl Default for CatalogIdentity {
    fn default() -> Self {
        Self {
            name: "IPA Repository".to_string(),
            identifier: "com.iparepo.source".to_string(),
            subtitle: String::new(),
            description: String::new(),
            icon_url: String::new(),
            website: String::new(),
            tint_color: DEFAULT_TINT_COLOR.to_string(),
        }
    }
}

/// The `index.json` document consumed by installer clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    pub name: String,
    pub identifier: String,
    pub subtitle: String,
    pub description: String,
    #[serde(rename = "iconURL")]
    pub icon_url: String,
    pub website: String,
    pub tint_color: String,
    pub apps: Vec<MetadataRecord>,
}

impl CatalogDocument {
    /// Create a document from the repository identity and its entries
    pub fn new(identity: &CatalogIdentity, apps: Vec<MetadataRecord>) -> Self {
        Self {
            name: identity.name.clone(),
            identifier: identity.identifier.clone(),
            subtitle: identity.subtitle.clone(),
            description: identity.description.clone(),
            icon_url: identity.icon_url.clone(),
            website: identity.website.clone(),
            tint_color: identity.tint_color.clone(),
            apps,
        }
    }

    /// Find an entry by bundle identifier
    pub fn find_app(&self, bundle_identifier: &str) -> Option<&MetadataRecord> {
        self.apps
            .iter()
            .find(|app| app.bundle_identifier == bundle_identifier)
    }
}
