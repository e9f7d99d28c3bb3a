//! Application manifest (`Info.plist`) decoding
//!
//! Both XML and binary property lists are accepted. Only scalar top-level
//! values are kept as raw key/value pairs, plus the icon file names, which
//! live in nested dictionaries.

use ipa_core::error::IpaError;
use plist::Value;
use std::collections::BTreeMap;
use std::io::Cursor;

use crate::ArchiveResult;

pub const DISPLAY_NAME: &str = "CFBundleDisplayName";
pub const BUNDLE_NAME: &str = "CFBundleName";
pub const BUNDLE_IDENTIFIER: &str = "CFBundleIdentifier";
pub const SHORT_VERSION: &str = "CFBundleShortVersionString";
pub const BUNDLE_VERSION: &str = "CFBundleVersion";
pub const MINIMUM_OS_VERSION: &str = "MinimumOSVersion";
pub const GET_INFO_STRING: &str = "CFBundleGetInfoString";

const ICONS_KEYS: [&str; 2] = ["CFBundleIcons", "CFBundleIcons~ipad"];
const PRIMARY_ICON: &str = "CFBundlePrimaryIcon";
const ICON_FILES: &str = "CFBundleIconFiles";
const ICON_FILE: &str = "CFBundleIconFile";

/// Raw decoding of an application manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestRecord {
    values: BTreeMap<String, String>,
    icon_files: Vec<String>,
}

impl ManifestRecord {
    /// A manifest with no keys; every normalized field falls back to its default
    pub fn empty() -> Self {
        Self::default()
    }

    /// Decode a property list (XML or binary)
    pub fn parse(bytes: &[u8]) -> ArchiveResult<Self> {
        let value = Value::from_reader(Cursor::new(bytes))
            .map_err(|e| IpaError::archive(format!("undecodable Info.plist: {}", e)))?;
        let dict = value
            .into_dictionary()
            .ok_or_else(|| IpaError::archive("Info.plist root is not a dictionary"))?;

        let mut values = BTreeMap::new();
        for (key, value) in dict.iter() {
            if let Some(text) = scalar_to_string(value) {
                values.insert(key.clone(), text);
            }
        }

        let mut icon_files = Vec::new();
        for icons_key in ICONS_KEYS {
            let files = dict
                .get(icons_key)
                .and_then(Value::as_dictionary)
                .and_then(|icons| icons.get(PRIMARY_ICON))
                .and_then(Value::as_dictionary)
                .and_then(|primary| primary.get(ICON_FILES));
            collect_strings(files, &mut icon_files);
        }
        collect_strings(dict.get(ICON_FILES), &mut icon_files);
        collect_strings(dict.get(ICON_FILE), &mut icon_files);

        Ok(Self { values, icon_files })
    }

    /// Build a manifest from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            icon_files: Vec::new(),
        }
    }

    /// Raw value for a key; blank values read as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// All raw key/value pairs
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.icon_files.is_empty()
    }

    /// Icon base names declared by the bundle, primary icon first
    pub fn icon_files(&self) -> &[String] {
        &self.icon_files
    }

    pub fn display_name(&self) -> Option<&str> {
        self.get(DISPLAY_NAME)
    }

    pub fn bundle_name(&self) -> Option<&str> {
        self.get(BUNDLE_NAME)
    }

    pub fn bundle_identifier(&self) -> Option<&str> {
        self.get(BUNDLE_IDENTIFIER)
    }

    pub fn short_version(&self) -> Option<&str> {
        self.get(SHORT_VERSION)
    }

    pub fn bundle_version(&self) -> Option<&str> {
        self.get(BUNDLE_VERSION)
    }

    pub fn minimum_os_version(&self) -> Option<&str> {
        self.get(MINIMUM_OS_VERSION)
    }

    pub fn description(&self) -> Option<&str> {
        self.get(GET_INFO_STRING)
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(r) => Some(r.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

fn collect_strings(value: Option<&Value>, out: &mut Vec<String>) {
    let mut push = |name: &str| {
        if !name.is_empty() && !out.iter().any(|existing| existing == name) {
            out.push(name.to_string());
        }
    };

    match value {
        Some(Value::Array(items)) => {
            for name in items.iter().filter_map(Value::as_string) {
                push(name);
            }
        },
        Some(Value::String(name)) => push(name),
        _ => {},
    }
}
