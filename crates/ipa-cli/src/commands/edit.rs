//! `ipa-repo edit` command implementation.
//!
//! Field flags are applied as one override. Without flags the interactive
//! wizard asks for the main fields one by one.

use ipa_catalog::Repository;
use ipa_core::error::IpaResult;
use ipa_core::{MetadataPatch, MetadataRecord};

use super::wizard::{self, EditSession};
use super::{blocking, CommandContext};

/// Execute the `ipa-repo edit` command
pub async fn execute(stem: &str, patch: MetadataPatch, ctx: &CommandContext) -> IpaResult<()> {
    let repository = ctx.repository().await?;

    if patch.is_empty() {
        return interactive(stem, repository, ctx).await;
    }

    let fields = patch.changed_fields().join(", ");
    let owned_stem = stem.to_string();
    let record = blocking(move || repository.apply_override(&owned_stem, &patch)).await?;

    ctx.output.success(&format!("Updated {} ({})", stem, fields));
    print_record(&record, ctx);
    ctx.output.info("Run `ipa-repo rebuild` to publish the change");
    Ok(())
}

async fn interactive(stem: &str, repository: Repository, ctx: &CommandContext) -> IpaResult<()> {
    ctx.output.info(&format!(
        "Editing {} (answer {} to keep a value, end input to stop)",
        stem,
        wizard::KEEP_MARKER
    ));

    let owned_stem = stem.to_string();
    let (saved, record) = blocking(move || {
        // An empty override creates the record when only the package exists
        let record = match repository.record(&owned_stem)? {
            Some(record) => record,
            None => repository.apply_override(&owned_stem, &MetadataPatch::default())?,
        };

        let mut session = EditSession::new(owned_stem, record);
        let stdin = std::io::stdin();
        let saved = wizard::run(&mut session, stdin.lock(), std::io::stdout(), |stem, patch| {
            repository.apply_override(stem, patch)
        })?;
        Ok((saved, session.record().clone()))
    })
    .await?;

    if saved == 0 {
        ctx.output.info("No changes saved");
    } else {
        ctx.output.success(&format!("Saved {} change(s) to {}", saved, stem));
    }
    print_record(&record, ctx);
    Ok(())
}

fn print_record(record: &MetadataRecord, ctx: &CommandContext) {
    ctx.output.field("name", &record.name);
    ctx.output.field("bundle id", &record.bundle_identifier);
    ctx.output.field("version", record.version());
}
