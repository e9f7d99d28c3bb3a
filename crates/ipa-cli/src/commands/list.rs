//! `ipa-repo list` command implementation.

use ipa_catalog::RecordStatus;
use ipa_core::error::IpaResult;

use super::{blocking, CommandContext};

/// One row of the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedPackage {
    pub file_name: String,
    pub size: u64,
    pub status: RecordStatus,
}

/// Collect every stored package with the state of its record
pub async fn collect(ctx: &CommandContext) -> IpaResult<Vec<ListedPackage>> {
    let repository = ctx.repository().await?;
    blocking(move || {
        let packages = repository.packages()?;
        Ok(packages
            .into_iter()
            .map(|entry| ListedPackage {
                status: repository.store().status(&entry.stem),
                file_name: entry.file_name,
                size: entry.size,
            })
            .collect())
    })
    .await
}

/// Execute the `ipa-repo list` command
pub async fn execute(ctx: &CommandContext) -> IpaResult<()> {
    let packages = collect(ctx).await?;

    if packages.is_empty() {
        ctx.output.info("No packages stored");
        return Ok(());
    }

    for package in &packages {
        match &package.status {
            RecordStatus::Present(record) => ctx.output.step(
                "•",
                &format!(
                    "{}  {} {} ({}, {})",
                    package.file_name,
                    ctx.output.bold(&record.name),
                    record.version(),
                    record.bundle_identifier,
                    format_size(package.size)
                ),
            ),
            RecordStatus::Missing => ctx.output.warn(&format!(
                "{}  no record yet; created on next rebuild ({})",
                package.file_name,
                format_size(package.size)
            )),
            RecordStatus::Corrupt(reason) => {
                ctx.output.error(&format!("{}  unreadable record: {}", package.file_name, reason))
            },
        }
    }

    ctx.output.info(&format!("{} package(s)", packages.len()));
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
