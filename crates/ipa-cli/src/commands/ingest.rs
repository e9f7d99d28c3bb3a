//! `ipa-repo ingest` command implementation.
//!
//! Copies a package into the packages root, extracts its record and icon, and
//! optionally regenerates the catalog.

use ipa_catalog::IngestOptions;
use ipa_core::error::{IpaError, IpaResult};
use ipa_core::utils::fs::write_atomic;
use ipa_core::utils::hash::file_matches;
use ipa_core::utils::path::{package_stem, validate_package_file_name};
use ipa_core::MetadataRecord;
use std::path::PathBuf;
use tracing::{debug, warn};

use super::{blocking, rebuild, CommandContext};

/// Arguments of `ipa-repo ingest`
#[derive(Debug, Clone)]
pub struct IngestArgs {
    pub file: PathBuf,
    pub file_name: Option<String>,
    pub replace_metadata: bool,
    pub strict: bool,
    pub rebuild: bool,
}

/// Execute the `ipa-repo ingest` command
pub async fn execute(args: IngestArgs, ctx: &CommandContext) -> IpaResult<()> {
    let file_name = target_file_name(&args)?;
    validate_package_file_name(&file_name)?;
    let stem = package_stem(&file_name)
        .map(str::to_string)
        .ok_or_else(|| IpaError::InvalidPackageName {
            name: file_name.clone(),
            reason: "name has no stem".to_string(),
        })?;

    let bytes = tokio::fs::read(&args.file)
        .await
        .map_err(|e| IpaError::io(format!("Failed to read {}", args.file.display()), e))?;

    let repository = ctx.repository().await?;
    let destination = repository.package_path(&file_name);
    let existed = destination.exists();

    ctx.output.step("📦", &format!("Storing {}", file_name));
    let options = IngestOptions {
        replace_metadata: args.replace_metadata,
    };

    let strict = args.strict;
    let task_stem = stem.clone();
    let outcome = blocking(move || {
        if !file_matches(destination.as_std_path(), &bytes) {
            write_atomic(destination.as_std_path(), &bytes)?;
        } else {
            debug!("{} is unchanged", destination);
        }

        match repository.ingest_with(&task_stem, &bytes, options) {
            Ok(record) => Ok(Ingested::Extracted(record)),
            Err(e @ IpaError::Archive { .. }) if strict => {
                if !existed {
                    if let Err(remove_err) = std::fs::remove_file(&destination) {
                        warn!("Could not remove {}: {}", destination, remove_err);
                    }
                }
                Err(e)
            },
            Err(IpaError::Archive { reason }) => {
                warn!("Archive of {} unreadable: {}", task_stem, reason);
                repository
                    .ingest_defaults(&task_stem, bytes.len() as u64)
                    .map(|record| Ingested::Defaults { record, reason })
            },
            Err(e) => Err(e),
        }
    })
    .await?;

    let record = match outcome {
        Ingested::Extracted(record) => {
            ctx.output.success(&format!("Ingested {}", file_name));
            record
        },
        Ingested::Defaults { record, reason } => {
            ctx.output
                .warn(&format!("Could not read package metadata ({}); stored defaults", reason));
            record
        },
    };
    print_summary(&record, ctx);

    if args.rebuild {
        rebuild::execute(ctx).await?;
    } else {
        ctx.output.info("Run `ipa-repo rebuild` to publish the change");
    }

    Ok(())
}

enum Ingested {
    Extracted(MetadataRecord),
    Defaults { record: MetadataRecord, reason: String },
}

fn target_file_name(args: &IngestArgs) -> IpaResult<String> {
    if let Some(name) = &args.file_name {
        return Ok(name.clone());
    }
    args.file
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| IpaError::InvalidPackageName {
            name: args.file.display().to_string(),
            reason: "path has no UTF-8 file name".to_string(),
        })
}

fn print_summary(record: &MetadataRecord, ctx: &CommandContext) {
    ctx.output.field("name", &record.name);
    ctx.output.field("bundle id", &record.bundle_identifier);
    ctx.output.field("version", record.version());
    if !record.icon_url.is_empty() {
        ctx.output.field("icon", &record.icon_url);
    }
}
