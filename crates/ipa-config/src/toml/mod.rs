//! ipa-repo.toml parsing and serialization

use camino::Utf8Path;
use ipa_core::error::IpaError;
use serde::{Deserialize, Serialize};

use crate::ConfigResult;

/// Complete ipa-repo.toml configuration.
///
/// Every value is optional so files can be layered; defaults are applied when
/// the merged configuration is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoToml {
    /// Storage locations
    #[serde(default)]
    pub storage: StorageSection,

    /// Publishing
    #[serde(default)]
    pub server: ServerSection,

    /// Catalog identity
    #[serde(default)]
    pub catalog: CatalogSection,
}

/// `[storage]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSection {
    /// Repository root; `packages/`, `images/` and `index.json` default under it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages_dir: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub images_dir: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<String>,
}

/// `[server]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSection {
    /// Public origin the repository is served from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// `[catalog]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tint_color: Option<String>,

    /// Namespace of synthesized bundle identifiers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_namespace: Option<String>,
}

/// Parse TOML string to RepoToml configuration
pub fn parse_repo_toml(content: &str) -> ConfigResult<RepoToml> {
    let config: RepoToml = ::toml::from_str(content).map_err(|e| {
        let (line, column) = e
            .span()
            .map(|span| line_and_column(content, span.start))
            .unwrap_or((0, 0));
        IpaError::TomlParse {
            message: e.message().to_string(),
            line,
            column,
        }
    })?;

    validate_config(&config)?;
    Ok(config)
}

/// Serialize RepoToml to TOML string
pub fn serialize_repo_toml(config: &RepoToml) -> ConfigResult<String> {
    ::toml::to_string_pretty(config).map_err(|e| IpaError::TomlParse {
        message: format!("TOML serialization error: {}", e),
        line: 0,
        column: 0,
    })
}

/// Validate the values that are present
pub fn validate_config(config: &RepoToml) -> ConfigResult<()> {
    let storage = [
        ("storage.root", &config.storage.root),
        ("storage.packages_dir", &config.storage.packages_dir),
        ("storage.images_dir", &config.storage.images_dir),
        ("storage.catalog_file", &config.storage.catalog_file),
    ];
    for (field, value) in storage {
        if matches!(value, Some(v) if v.trim().is_empty()) {
            return Err(invalid(field, "path cannot be empty"));
        }
    }

    if let Some(base_url) = &config.server.base_url {
        validate_base_url(base_url)?;
    }

    if let Some(tint) = &config.catalog.tint_color {
        let hex = tint.trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid(
                "catalog.tint_color",
                &format!("'{}' is not a six digit hex color", tint),
            ));
        }
    }

    if let Some(namespace) = &config.catalog.bundle_namespace {
        let valid = !namespace.is_empty()
            && namespace
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(invalid(
                "catalog.bundle_namespace",
                "use lowercase letters, digits and hyphens",
            ));
        }
    }

    Ok(())
}

/// Accept an empty base URL (root-relative publishing) or an absolute http(s) URL
pub fn validate_base_url(base_url: &str) -> ConfigResult<()> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    let parsed = url::Url::parse(trimmed)
        .map_err(|e| invalid("server.base_url", &format!("'{}' is not a URL: {}", trimmed, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(
            "server.base_url",
            &format!("scheme '{}' is not http or https", parsed.scheme()),
        ));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("server.base_url", "query strings and fragments are not allowed"));
    }
    Ok(())
}

/// Load and parse ipa-repo.toml from file path
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<RepoToml> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| IpaError::io(format!("Failed to read {}", path), e))?;

    parse_repo_toml(&content).map_err(|e| match e {
        IpaError::TomlParse {
            message,
            line,
            column,
        } => IpaError::TomlParse {
            message: format!("in {}: {}", path, message),
            line,
            column,
        },
        IpaError::ConfigValidation { field, reason } => IpaError::ConfigValidation {
            field,
            reason: format!("in {}: {}", path, reason),
        },
        other => other,
    })
}

/// Configuration written by `ipa-repo init`
pub fn starter_config(base_url: Option<&str>) -> RepoToml {
    RepoToml {
        storage: StorageSection {
            root: Some("repo".to_string()),
            ..Default::default()
        },
        server: ServerSection {
            base_url: Some(base_url.unwrap_or_default().to_string()),
        },
        catalog: CatalogSection {
            name: Some("IPA Repository".to_string()),
            identifier: Some("com.iparepo.source".to_string()),
            tint_color: Some(ipa_core::types::metadata::DEFAULT_TINT_COLOR.to_string()),
            bundle_namespace: Some(ipa_core::types::metadata::DEFAULT_BUNDLE_NAMESPACE.to_string()),
            ..Default::default()
        },
    }
}

fn invalid(field: &str, reason: &str) -> IpaError {
    IpaError::ConfigValidation {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// 1-based line and column of a byte offset
fn line_and_column(content: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(content.len());
    let before = content.get(..offset).unwrap_or(content);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rfind('\n')
        .map(|pos| before[pos + 1..].chars().count())
        .unwrap_or_else(|| before.chars().count())
        + 1;
    (line, column)
}
