//! `ipa-repo rebuild` command implementation.

use ipa_core::error::IpaResult;

use super::{blocking, CommandContext};

/// Execute the `ipa-repo rebuild` command
pub async fn execute(ctx: &CommandContext) -> IpaResult<()> {
    let repository = ctx.repository().await?;
    let catalog_url = repository.settings().catalog_url();
    let catalog_path = repository.settings().catalog_path.clone();

    ctx.output.step("🔨", "Rebuilding catalog");
    let build = blocking(move || repository.rebuild_catalog()).await?;

    for skipped in &build.skipped {
        ctx.output.warn(&format!("Skipped {}", skipped));
    }

    ctx.output.success(&format!(
        "Catalog written: {} apps ({} new records)",
        build.included, build.created
    ));
    ctx.output.field("file", catalog_path.as_str());
    ctx.output.field("url", &catalog_url);

    Ok(())
}
