//! Command implementations and dispatch logic.
//!
//! Each command is an async function taking a [`CommandContext`]. The catalog
//! pipeline is synchronous and runs on the blocking pool.

use camino::Utf8PathBuf;
use ipa_catalog::Repository;
use ipa_config::ConfigLoader;
use ipa_core::error::{IpaError, IpaResult};
use ipa_core::RepositorySettings;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

pub mod edit;
pub mod ingest;
pub mod init;
pub mod list;
pub mod rebuild;
pub mod show;
pub mod wizard;

#[cfg(test)]
mod tests;

use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    pub output: OutputHandler,
    /// `--root` / `--base-url` flags, keyed like the config layering expects
    pub overrides: HashMap<String, String>,
}

impl CommandContext {
    /// Create a context for the current directory
    pub fn new(root: Option<PathBuf>, base_url: Option<String>) -> IpaResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| IpaError::io("Failed to get current directory".to_string(), e))?;
        let cwd = utf8_path(cwd)?;

        let mut overrides = HashMap::new();
        if let Some(root) = root {
            let root = utf8_path(root)?;
            let root = if root.is_absolute() { root } else { cwd.join(root) };
            overrides.insert("root".to_string(), root.to_string());
        }
        if let Some(base_url) = base_url {
            overrides.insert("base_url".to_string(), base_url);
        }

        Ok(Self {
            cwd,
            output: OutputHandler::new(),
            overrides,
        })
    }

    /// Resolve repository settings from every configuration layer
    pub async fn settings(&self) -> IpaResult<RepositorySettings> {
        let loader = ConfigLoader::new(self.cwd.clone());
        let resolved = loader.load(self.overrides.clone()).await?;
        debug!("Configuration sources: {:?}", resolved.sources);
        Ok(resolved.settings)
    }

    /// Open the configured repository
    pub async fn repository(&self) -> IpaResult<Repository> {
        let settings = self.settings().await?;
        blocking(move || Repository::open(settings)).await
    }
}

/// Run synchronous pipeline work on the blocking thread pool
pub async fn blocking<F, T>(work: F) -> IpaResult<T>
where
    F: FnOnce() -> IpaResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|e| {
        IpaError::io(
            "Background task failed".to_string(),
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        )
    })?
}

fn utf8_path(path: PathBuf) -> IpaResult<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).map_err(|path| IpaError::ConfigValidation {
        field: "path".to_string(),
        reason: format!("'{}' is not valid UTF-8", path.display()),
    })
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> IpaResult<()> {
    match command {
        Commands::Init { force } => {
            info!("Initializing repository (force: {})", force);
            init::execute(force, ctx).await
        },
        Commands::Ingest {
            file,
            file_name,
            replace_metadata,
            strict,
            rebuild,
        } => {
            info!("Ingesting {}", file.display());
            let options = ingest::IngestArgs {
                file,
                file_name,
                replace_metadata,
                strict,
                rebuild,
            };
            ingest::execute(options, ctx).await
        },
        Commands::Rebuild => {
            info!("Rebuilding catalog");
            rebuild::execute(ctx).await
        },
        Commands::List => {
            info!("Listing packages");
            list::execute(ctx).await
        },
        Commands::Show { stem } => {
            info!("Showing record: {}", stem);
            show::execute(&stem, ctx).await
        },
        Commands::Edit { stem, fields } => {
            info!("Editing record: {}", stem);
            edit::execute(&stem, fields.into_patch(), ctx).await
        },
        Commands::Version => {
            info!("Showing version information");
            show_version(ctx).await
        },
    }
}

async fn show_version(ctx: &CommandContext) -> IpaResult<()> {
    ctx.output.info(&format!("ipa-repo v{}", env!("CARGO_PKG_VERSION")));
    ctx.output.info(&format!("Built: {}", env!("BUILD_DATE")));
    ctx.output.info(&format!("Target: {}", env!("BUILD_TARGET")));
    ctx.output.info(&format!("Rust: {}", env!("RUSTC_VERSION")));
    Ok(())
}
