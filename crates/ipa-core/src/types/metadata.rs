//! Package metadata types.
//!
//! `MetadataRecord` is the structurally complete entry published in the
//! catalog. `PartialMetadata` is what we actually find on disk or in a
//! manifest: every field optional. `PartialMetadata::apply_defaults` is the one
//! place where missing values are filled in.

use serde::{Deserialize, Serialize};

pub const DEFAULT_DEVELOPER_NAME: &str = "Unknown";
pub const DEFAULT_TINT_COLOR: &str = "3c94fc";
pub const DEFAULT_CATEGORY: &str = "utilities";
pub const DEFAULT_VERSION: &str = "1.0";
pub const DEFAULT_BUILD_VERSION: &str = "1";
pub const DEFAULT_MIN_OS_VERSION: &str = "16.0";
pub const DEFAULT_BUNDLE_NAMESPACE: &str = "iparepo";

/// Catalog entry for one application package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub name: String,
    pub bundle_identifier: String,
    pub developer_name: String,
    #[serde(rename = "iconURL")]
    pub icon_url: String,
    pub localized_description: String,
    pub subtitle: String,
    pub tint_color: String,
    pub category: String,
    pub versions: Vec<VersionRecord>,
}

/// One downloadable version of an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    #[serde(rename = "downloadURL")]
    pub download_url: String,
    pub size: u64,
    pub version: String,
    pub build_version: String,
    pub date: String,
    pub localized_description: String,
    #[serde(rename = "minOSVersion")]
    pub min_os_version: String,
}

/// Metadata with every field optional, as stored on disk or read from a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialMetadata {
    pub name: Option<String>,
    pub bundle_identifier: Option<String>,
    pub developer_name: Option<String>,
    #[serde(rename = "iconURL")]
    pub icon_url: Option<String>,
    pub localized_description: Option<String>,
    pub subtitle: Option<String>,
    pub tint_color: Option<String>,
    pub category: Option<String>,
    pub versions: Option<Vec<PartialVersion>>,
}

/// Version entry with every field optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialVersion {
    #[serde(rename = "downloadURL")]
    pub download_url: Option<String>,
    pub size: Option<u64>,
    pub version: Option<String>,
    pub build_version: Option<String>,
    pub date: Option<String>,
    pub localized_description: Option<String>,
    #[serde(rename = "minOSVersion")]
    pub min_os_version: Option<String>,
}

impl Default for VersionRecord {
    fn default() -> Self {
        Self {
            download_url: String::new(),
            size: 0,
            version: DEFAULT_VERSION.to_string(),
            build_version: DEFAULT_BUILD_VERSION.to_string(),
            date: String::new(),
            localized_description: String::new(),
            min_os_version: DEFAULT_MIN_OS_VERSION.to_string(),
        }
    }
}

impl MetadataRecord {
    /// The version the catalog advertises for download
    pub fn primary_version(&self) -> Option<&VersionRecord> {
        self.versions.first()
    }

    /// Mutable access to the advertised version, creating a default one if needed
    pub fn primary_version_mut(&mut self) -> &mut VersionRecord {
        if self.versions.is_empty() {
            self.versions.push(VersionRecord::default());
        }
        &mut self.versions[0]
    }

    /// Version string of the advertised version
    pub fn version(&self) -> &str {
        self.primary_version()
            .map(|v| v.version.as_str())
            .unwrap_or(DEFAULT_VERSION)
    }
}

impl PartialMetadata {
    /// Fill every missing field with its default.
    ///
    /// Blank strings count as missing for the fields that must not be empty
    /// (`name`, `bundleIdentifier`, versions, colors, category).
    pub fn apply_defaults(self, package_stem: &str, namespace: &str) -> MetadataRecord {
        let mut versions: Vec<VersionRecord> = self
            .versions
            .unwrap_or_default()
            .into_iter()
            .map(PartialVersion::apply_defaults)
            .collect();
        if versions.is_empty() {
            versions.push(VersionRecord::default());
        }

        MetadataRecord {
            name: non_blank(self.name).unwrap_or_else(|| package_stem.to_string()),
            bundle_identifier: non_blank(self.bundle_identifier)
                .unwrap_or_else(|| synthesize_bundle_identifier(package_stem, namespace)),
            developer_name: non_blank(self.developer_name)
                .unwrap_or_else(|| DEFAULT_DEVELOPER_NAME.to_string()),
            icon_url: self.icon_url.unwrap_or_default(),
            localized_description: self.localized_description.unwrap_or_default(),
            subtitle: self.subtitle.unwrap_or_default(),
            tint_color: non_blank(self.tint_color)
                .unwrap_or_else(|| DEFAULT_TINT_COLOR.to_string()),
            category: non_blank(self.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            versions,
        }
    }
}

impl PartialVersion {
    /// Fill every missing field with its default
    pub fn apply_defaults(self) -> VersionRecord {
        VersionRecord {
            download_url: self.download_url.unwrap_or_default(),
            size: self.size.unwrap_or(0),
            version: non_blank(self.version).unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            build_version: non_blank(self.build_version)
                .unwrap_or_else(|| DEFAULT_BUILD_VERSION.to_string()),
            date: self.date.unwrap_or_default(),
            localized_description: self.localized_description.unwrap_or_default(),
            min_os_version: non_blank(self.min_os_version)
                .unwrap_or_else(|| DEFAULT_MIN_OS_VERSION.to_string()),
        }
    }
}

/// Build the fallback reverse-domain identifier `com.<namespace>.<stem>`
///
/// The stem is lowercased; characters outside `[a-z0-9.-]` become `-`.
pub fn synthesize_bundle_identifier(package_stem: &str, namespace: &str) -> String {
    let suffix: String = package_stem
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("com.{}.{}", namespace, suffix)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_partial_gets_all_defaults() {
        let record = PartialMetadata::default().apply_defaults("MyApp", "iparepo");

        assert_eq!(record.name, "MyApp");
        assert_eq!(record.bundle_identifier, "com.iparepo.myapp");
        assert_eq!(record.developer_name, "Unknown");
        assert_eq!(record.icon_url, "");
        assert_eq!(record.tint_color, "3c94fc");
        assert_eq!(record.category, "utilities");
        assert_eq!(record.versions.len(), 1);
        assert_eq!(record.versions[0].version, "1.0");
        assert_eq!(record.versions[0].build_version, "1");
        assert_eq!(record.versions[0].min_os_version, "16.0");
    }

    #[test]
    fn test_blank_fields_fall_back() {
        let partial = PartialMetadata {
            name: Some("   ".to_string()),
            bundle_identifier: Some(String::new()),
            versions: Some(vec![PartialVersion {
                version: Some("".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        let record = partial.apply_defaults("demo", "x");

        assert_eq!(record.name, "demo");
        assert_eq!(record.bundle_identifier, "com.x.demo");
        assert_eq!(record.version(), "1.0");
    }

    #[test]
    fn test_synthesized_identifier_is_sanitized() {
        assert_eq!(
            synthesize_bundle_identifier("My Cool_App v2", "iparepo"),
            "com.iparepo.my-cool-app-v2"
        );
        assert_eq!(synthesize_bundle_identifier("App.Beta", "ns"), "com.ns.app.beta");
    }

    #[test]
    fn test_json_field_names_and_order() {
        let record = PartialMetadata::default().apply_defaults("demo", "x");
        let json = serde_json::to_string(&record).unwrap();

        let keys = [
            "\"name\"",
            "\"bundleIdentifier\"",
            "\"developerName\"",
            "\"iconURL\"",
            "\"localizedDescription\"",
            "\"subtitle\"",
            "\"tintColor\"",
            "\"category\"",
            "\"versions\"",
            "\"downloadURL\"",
            "\"size\"",
            "\"version\"",
            "\"buildVersion\"",
            "\"date\"",
            "\"minOSVersion\"",
        ];
        let mut last = 0;
        for key in keys {
            let pos = json[last..]
                .find(key)
                .map(|p| p + last)
                .unwrap_or_else(|| panic!("missing or out of order: {}", key));
            last = pos;
        }
    }

    #[test]
    fn test_partial_parses_incomplete_record() {
        let partial: PartialMetadata =
            serde_json::from_str(r#"{"name": "Foo", "versions": [{"version": "3.0"}]}"#).unwrap();
        let record = partial.apply_defaults("foo", "x");

        assert_eq!(record.name, "Foo");
        assert_eq!(record.version(), "3.0");
        assert_eq!(record.versions[0].min_os_version, "16.0");
    }

    #[test]
    fn test_primary_version_mut_creates_entry() {
        let mut record = PartialMetadata::default().apply_defaults("a", "x");
        record.versions.clear();
        record.primary_version_mut().size = 42;
        assert_eq!(record.versions.len(), 1);
        assert_eq!(record.versions[0].size, 42);
    }
}
