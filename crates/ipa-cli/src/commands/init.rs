//! `ipa-repo init` command implementation.
//!
//! Writes a starter ipa-repo.toml into the working directory and creates the
//! storage directories it points at.

use ipa_config::merge::CONFIG_FILE_NAME;
use ipa_config::toml::{serialize_repo_toml, starter_config};
use ipa_core::error::{IpaError, IpaResult};

use super::CommandContext;

/// Execute the `ipa-repo init` command
pub async fn execute(force: bool, ctx: &CommandContext) -> IpaResult<()> {
    let config_path = ctx.cwd.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        return Err(IpaError::ConfigValidation {
            field: "init".to_string(),
            reason: format!("{} already exists (use --force to overwrite)", config_path),
        });
    }

    let mut config = starter_config(ctx.overrides.get("base_url").map(String::as_str));
    if let Some(root) = ctx.overrides.get("root") {
        config.storage.root = Some(root.clone());
    }

    let content = serialize_repo_toml(&config)?;
    tokio::fs::write(&config_path, content)
        .await
        .map_err(|e| IpaError::storage_write(&config_path, e))?;
    ctx.output.step("📝", &format!("Wrote {}", config_path));

    let repository = ctx.repository().await?;
    let settings = repository.settings();

    ctx.output.success("Repository initialized");
    ctx.output.field("packages", settings.packages_root.as_str());
    ctx.output.field("images", settings.images_root.as_str());
    ctx.output.field("catalog", settings.catalog_path.as_str());
    ctx.output.info("");
    ctx.output.info("Next steps:");
    ctx.output.info("  ipa-repo ingest <FILE>.ipa");
    ctx.output.info("  ipa-repo rebuild");

    Ok(())
}
