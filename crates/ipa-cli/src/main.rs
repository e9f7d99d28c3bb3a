//! # ipa-repo
//!
//! Operator CLI for an IPA repository.
//!
//! This is the main entry point. It handles command parsing, sets up logging
//! and the panic hook, resolves configuration and dispatches to the command
//! handlers.

use clap::{Args, Parser, Subcommand};
use ipa_core::error::{IpaError, IpaResult};
use ipa_core::MetadataPatch;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Manage an IPA repository and its published catalog
#[derive(Parser)]
#[command(name = "ipa-repo", version, about = "IPA repository manager")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository root (overrides ipa-repo.toml and IPA_REPO_ROOT)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Public base URL (overrides ipa-repo.toml and IPA_REPO_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create ipa-repo.toml and the storage directories
    Init {
        /// Overwrite an existing ipa-repo.toml
        #[arg(long)]
        force: bool,
    },
    /// Add a package to the repository
    Ingest {
        /// Package file to add
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Store the package under this file name
        #[arg(long)]
        file_name: Option<String>,
        /// Replace an existing record with freshly extracted metadata
        #[arg(long)]
        replace_metadata: bool,
        /// Reject unreadable archives instead of storing a default record
        #[arg(long)]
        strict: bool,
        /// Rebuild the catalog afterwards
        #[arg(long)]
        rebuild: bool,
    },
    /// Regenerate the catalog from the stored packages
    Rebuild,
    /// List stored packages and their record status
    List,
    /// Print the stored record of a package
    Show {
        /// Package file name without extension
        stem: String,
    },
    /// Edit a package record; asks interactively when no field is given
    Edit {
        /// Package file name without extension
        stem: String,
        #[command(flatten)]
        fields: EditFields,
    },
    /// Show version information
    Version,
}

/// Record fields settable from the command line
#[derive(Args, Debug, Default)]
pub struct EditFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long = "bundle-id")]
    pub bundle_identifier: Option<String>,
    #[arg(long)]
    pub version: Option<String>,
    #[arg(long)]
    pub build_version: Option<String>,
    #[arg(long = "developer")]
    pub developer_name: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub subtitle: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub tint_color: Option<String>,
    #[arg(long)]
    pub icon_url: Option<String>,
    #[arg(long = "min-os")]
    pub min_os_version: Option<String>,
}

impl EditFields {
    pub fn into_patch(self) -> MetadataPatch {
        MetadataPatch {
            name: self.name,
            bundle_identifier: self.bundle_identifier,
            developer_name: self.developer_name,
            icon_url: self.icon_url,
            localized_description: self.description,
            subtitle: self.subtitle,
            tint_color: self.tint_color,
            category: self.category,
            version: self.version,
            build_version: self.build_version,
            min_os_version: self.min_os_version,
            ..Default::default()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    info!("Starting ipa-repo v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", ErrorFormatter::new().format_error(&e));
            ExitCode::FAILURE
        },
    }
}

fn run_cli(cli: Cli) -> IpaResult<()> {
    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| IpaError::io("Failed to create async runtime".to_string(), e))?;

    rt.block_on(async {
        let ctx = CommandContext::new(cli.root, cli.base_url)?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    // Library crates only report problems unless asked for more
    let (cli_level, lib_level) = if verbose { ("debug", "debug") } else { ("info", "warn") };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "ipa_repo={cli_level},ipa_core={lib_level},ipa_archive={lib_level},ipa_catalog={lib_level},ipa_config={lib_level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("ipa-repo encountered an unexpected error: {}", panic_info);
        eprintln!("ipa-repo crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/ipa-repo/ipa-repo/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
