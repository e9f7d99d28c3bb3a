//! Configuration layering, environment overrides and settings resolution

use camino::{Utf8Path, Utf8PathBuf};
use ipa_core::error::IpaError;
use ipa_core::types::metadata::DEFAULT_BUNDLE_NAMESPACE;
use ipa_core::{CatalogIdentity, RepositorySettings};
use std::collections::HashMap;
use tracing::debug;

use crate::toml::{validate_config, RepoToml};
use crate::ConfigResult;

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "ipa-repo.toml";
/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "IPA_REPO_";
/// Repository root used when nothing is configured
pub const DEFAULT_ROOT: &str = "repo";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
}

/// Configuration layering and merging
pub struct ConfigLayering;

/// Where a configuration layer came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Global config file
    Global(Utf8PathBuf),
    /// Project ipa-repo.toml
    Project(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// CLI flag
    CommandLine,
}

/// Settings plus the layers they were built from
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub settings: RepositorySettings,
    /// Directory relative paths were resolved against
    pub base_dir: Utf8PathBuf,
    pub sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Find a configuration file by walking up from the working directory
    pub fn resolve_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        let mut current = Some(self.cwd.as_path());
        while let Some(dir) = current {
            let candidate = dir.join(filename);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }
        None
    }

    /// Load the nearest ipa-repo.toml, if any
    pub async fn load_project_config(&self) -> ConfigResult<Option<(RepoToml, Utf8PathBuf)>> {
        match self.resolve_config_path(CONFIG_FILE_NAME) {
            Some(path) => {
                let config = crate::toml::load_from_file(&path).await?;
                Ok(Some((config, path)))
            },
            None => Ok(None),
        }
    }

    /// Path of the global configuration (`~/.ipa-repo/config.toml`)
    pub fn global_config_path() -> ConfigResult<Utf8PathBuf> {
        let home_dir = dirs::home_dir().ok_or_else(|| IpaError::ConfigValidation {
            field: "home_dir".to_string(),
            reason: "Could not determine home directory".to_string(),
        })?;

        Ok(Utf8PathBuf::try_from(home_dir)
            .map_err(|e| IpaError::ConfigValidation {
                field: "home_dir".to_string(),
                reason: format!("Invalid home directory path: {}", e),
            })?
            .join(".ipa-repo")
            .join("config.toml"))
    }

    /// Load global configuration
    pub async fn load_global_config(&self) -> ConfigResult<Option<(RepoToml, Utf8PathBuf)>> {
        let path = match Self::global_config_path() {
            Ok(path) => path,
            Err(e) => {
                debug!("No global configuration: {}", e);
                return Ok(None);
            },
        };

        if path.is_file() {
            let config = crate::toml::load_from_file(&path).await?;
            Ok(Some((config, path)))
        } else {
            Ok(None)
        }
    }

    /// Load every layer and resolve the repository settings
    pub async fn load(&self, cli_overrides: HashMap<String, String>) -> ConfigResult<ResolvedConfig> {
        self.load_with_env(ConfigLayering::collect_env_overrides(), cli_overrides)
            .await
    }

    /// Like [`load`](Self::load) with explicit environment overrides
    pub async fn load_with_env(
        &self,
        env_overrides: HashMap<String, String>,
        cli_overrides: HashMap<String, String>,
    ) -> ConfigResult<ResolvedConfig> {
        let mut sources = Vec::new();

        let global = self.load_global_config().await?.map(|(config, path)| {
            sources.push(ConfigSource::Global(path));
            config
        });

        let (project, base_dir) = match self.load_project_config().await? {
            Some((config, path)) => {
                let dir = path
                    .parent()
                    .map(Utf8Path::to_path_buf)
                    .unwrap_or_else(|| self.cwd.clone());
                sources.push(ConfigSource::Project(path));
                (config, dir)
            },
            None => (RepoToml::default(), self.cwd.clone()),
        };

        let mut env_keys: Vec<&String> = env_overrides.keys().collect();
        env_keys.sort();
        sources.extend(env_keys.into_iter().map(|k| ConfigSource::Environment(k.clone())));
        if !cli_overrides.is_empty() {
            sources.push(ConfigSource::CommandLine);
        }

        let merged = ConfigLayering::merge_configs(global, project, env_overrides, cli_overrides)?;
        let settings = resolve_settings(&merged, &base_dir);
        debug!("Resolved configuration from {} layers", sources.len());

        Ok(ResolvedConfig {
            settings,
            base_dir,
            sources,
        })
    }
}

impl ConfigLayering {
    /// Merge configuration layers, later layers winning field by field
    pub fn merge_configs(
        global_config: Option<RepoToml>,
        project_config: RepoToml,
        env_overrides: HashMap<String, String>,
        cli_overrides: HashMap<String, String>,
    ) -> ConfigResult<RepoToml> {
        let mut merged = match global_config {
            Some(global) => Self::overlay(global, project_config),
            None => project_config,
        };

        Self::apply_env_overrides(&mut merged, &env_overrides);
        Self::apply_cli_overrides(&mut merged, &cli_overrides);

        validate_config(&merged)?;
        Ok(merged)
    }

    /// `top` values replace `base` values where present
    pub fn overlay(base: RepoToml, top: RepoToml) -> RepoToml {
        RepoToml {
            storage: crate::toml::StorageSection {
                root: top.storage.root.or(base.storage.root),
                packages_dir: top.storage.packages_dir.or(base.storage.packages_dir),
                images_dir: top.storage.images_dir.or(base.storage.images_dir),
                catalog_file: top.storage.catalog_file.or(base.storage.catalog_file),
            },
            server: crate::toml::ServerSection {
                base_url: top.server.base_url.or(base.server.base_url),
            },
            catalog: crate::toml::CatalogSection {
                name: top.catalog.name.or(base.catalog.name),
                identifier: top.catalog.identifier.or(base.catalog.identifier),
                subtitle: top.catalog.subtitle.or(base.catalog.subtitle),
                description: top.catalog.description.or(base.catalog.description),
                icon_url: top.catalog.icon_url.or(base.catalog.icon_url),
                website: top.catalog.website.or(base.catalog.website),
                tint_color: top.catalog.tint_color.or(base.catalog.tint_color),
                bundle_namespace: top.catalog.bundle_namespace.or(base.catalog.bundle_namespace),
            },
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: &mut RepoToml, overrides: &HashMap<String, String>) {
        for (key, value) in overrides {
            let value = Some(value.clone());
            match key.strip_prefix(ENV_PREFIX).unwrap_or(key) {
                "ROOT" => config.storage.root = value,
                "PACKAGES_DIR" => config.storage.packages_dir = value,
                "IMAGES_DIR" => config.storage.images_dir = value,
                "CATALOG_FILE" => config.storage.catalog_file = value,
                "BASE_URL" => config.server.base_url = value,
                "NAMESPACE" => config.catalog.bundle_namespace = value,
                _ => {
                    // Unknown environment variable, ignore
                },
            }
        }
    }

    /// Apply CLI flag overrides
    fn apply_cli_overrides(config: &mut RepoToml, overrides: &HashMap<String, String>) {
        for (key, value) in overrides {
            let value = Some(value.clone());
            match key.as_str() {
                "root" => config.storage.root = value,
                "base_url" => config.server.base_url = value,
                _ => {
                    // Unknown CLI override, ignore
                },
            }
        }
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect()
    }
}

/// Turn a merged configuration into repository settings.
///
/// Relative paths are taken relative to `base_dir`; explicit directories are
/// independent of `root`.
pub fn resolve_settings(config: &RepoToml, base_dir: &Utf8Path) -> RepositorySettings {
    let absolute = |path: &str| {
        let path = Utf8Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    };

    let root = absolute(config.storage.root.as_deref().unwrap_or(DEFAULT_ROOT));
    let base_url = config.server.base_url.as_deref().unwrap_or_default();
    let mut settings = RepositorySettings::with_root(&root, base_url);

    if let Some(dir) = &config.storage.packages_dir {
        settings.packages_root = absolute(dir);
    }
    if let Some(dir) = &config.storage.images_dir {
        settings.images_root = absolute(dir);
    }
    if let Some(file) = &config.storage.catalog_file {
        settings.catalog_path = absolute(file);
    }

    settings.bundle_namespace = config
        .catalog
        .bundle_namespace
        .clone()
        .unwrap_or_else(|| DEFAULT_BUNDLE_NAMESPACE.to_string());

    let catalog = &config.catalog;
    let defaults = CatalogIdentity::default();
    settings.identity = CatalogIdentity {
        name: catalog.name.clone().unwrap_or(defaults.name),
        identifier: catalog.identifier.clone().unwrap_or(defaults.identifier),
        subtitle: catalog.subtitle.clone().unwrap_or(defaults.subtitle),
        description: catalog.description.clone().unwrap_or(defaults.description),
        icon_url: catalog.icon_url.clone().unwrap_or(defaults.icon_url),
        website: catalog.website.clone().unwrap_or(defaults.website),
        tint_color: catalog
            .tint_color
            .as_deref()
            .map(|tint| tint.trim_start_matches('#').to_lowercase())
            .unwrap_or(defaults.tint_color),
    };

    settings
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn layer() -> impl Strategy<Value = RepoToml> {
        (
            prop::option::of("[a-z]{1,8}"),
            prop::option::of("[A-Za-z ]{1,12}"),
        )
            .prop_map(|(root, name)| RepoToml {
                storage: crate::toml::StorageSection {
                    root,
                    ..Default::default()
                },
                catalog: crate::toml::CatalogSection {
                    name,
                    ..Default::default()
                },
                ..Default::default()
            })
    }

    proptest! {
        /// A value set in the upper layer always survives the overlay.
        #[test]
        fn overlay_prefers_top(base in layer(), top in layer()) {
            let merged = ConfigLayering::overlay(base.clone(), top.clone());

            prop_assert_eq!(merged.storage.root, top.storage.root.or(base.storage.root));
            prop_assert_eq!(merged.catalog.name, top.catalog.name.or(base.catalog.name));
        }
    }
}
