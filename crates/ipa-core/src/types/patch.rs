//! Operator edits applied on top of a stored record.

use serde::{Deserialize, Serialize};

use super::MetadataRecord;
use crate::error::{IpaError, IpaResult};

/// A partial set of fields to overwrite in a stored record.
///
/// Version-level fields target `versions[0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataPatch {
    pub name: Option<String>,
    pub bundle_identifier: Option<String>,
    pub developer_name: Option<String>,
    #[serde(rename = "iconURL")]
    pub icon_url: Option<String>,
    pub localized_description: Option<String>,
    pub subtitle: Option<String>,
    pub tint_color: Option<String>,
    pub category: Option<String>,
    pub version: Option<String>,
    pub build_version: Option<String>,
    #[serde(rename = "minOSVersion")]
    pub min_os_version: Option<String>,
    pub date: Option<String>,
    pub version_description: Option<String>,
}

impl MetadataPatch {
    /// Check if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Names of the fields this patch sets
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let fields: [(&'static str, bool); 13] = [
            ("name", self.name.is_some()),
            ("bundleIdentifier", self.bundle_identifier.is_some()),
            ("developerName", self.developer_name.is_some()),
            ("iconURL", self.icon_url.is_some()),
            ("localizedDescription", self.localized_description.is_some()),
            ("subtitle", self.subtitle.is_some()),
            ("tintColor", self.tint_color.is_some()),
            ("category", self.category.is_some()),
            ("version", self.version.is_some()),
            ("buildVersion", self.build_version.is_some()),
            ("minOSVersion", self.min_os_version.is_some()),
            ("date", self.date.is_some()),
            ("versionDescription", self.version_description.is_some()),
        ];
        fields
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect()
    }

    /// Reject values that would break the record invariants
    pub fn validate(&self) -> IpaResult<()> {
        let required = [
            ("name", &self.name),
            ("bundleIdentifier", &self.bundle_identifier),
            ("developerName", &self.developer_name),
            ("tintColor", &self.tint_color),
            ("category", &self.category),
            ("version", &self.version),
            ("buildVersion", &self.build_version),
            ("minOSVersion", &self.min_os_version),
        ];
        for (field, value) in required {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(IpaError::InvalidField {
                    field: field.to_string(),
                    reason: "value cannot be empty".to_string(),
                });
            }
        }

        if let Some(id) = &self.bundle_identifier {
            if id.chars().any(char::is_whitespace) {
                return Err(IpaError::InvalidField {
                    field: "bundleIdentifier".to_string(),
                    reason: format!("'{}' contains whitespace", id),
                });
            }
        }

        Ok(())
    }

    /// Overwrite the fields this patch sets
    pub fn apply_to(&self, record: &mut MetadataRecord) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(value) = value {
                *target = value.trim().to_string();
            }
        }

        set(&mut record.name, &self.name);
        set(&mut record.bundle_identifier, &self.bundle_identifier);
        set(&mut record.developer_name, &self.developer_name);
        set(&mut record.icon_url, &self.icon_url);
        set(&mut record.localized_description, &self.localized_description);
        set(&mut record.subtitle, &self.subtitle);
        set(&mut record.tint_color, &self.tint_color);
        set(&mut record.category, &self.category);

        let version = record.primary_version_mut();
        set(&mut version.version, &self.version);
        set(&mut version.build_version, &self.build_version);
        set(&mut version.min_os_version, &self.min_os_version);
        set(&mut version.date, &self.date);
        set(&mut version.localized_description, &self.version_description);
    }
}
