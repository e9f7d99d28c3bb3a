//! `ipa-repo show` command implementation.
//!
//! Prints the stored record as JSON, with missing keys filled by their defaults.

use ipa_core::error::{IpaError, IpaResult};
use ipa_core::utils::to_pretty_json;

use super::{blocking, CommandContext};

/// Execute the `ipa-repo show` command
pub async fn execute(stem: &str, ctx: &CommandContext) -> IpaResult<()> {
    let repository = ctx.repository().await?;
    let owned_stem = stem.to_string();
    let (record, package) = blocking(move || {
        let record = repository.record(&owned_stem)?;
        let package = repository.find_package(&owned_stem)?;
        Ok((record, package))
    })
    .await?;

    match (record, package) {
        (Some(record), _) => {
            let json = to_pretty_json(&record)?;
            ctx.output.raw(&String::from_utf8_lossy(&json));
            Ok(())
        },
        (None, Some(package)) => {
            ctx.output.warn(&format!(
                "{} has no record yet; run `ipa-repo rebuild` or `ipa-repo ingest` to create one",
                package.file_name
            ));
            Ok(())
        },
        (None, None) => Err(IpaError::PackageNotFound {
            name: stem.to_string(),
        }),
    }
}
