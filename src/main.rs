//! Sidecars - ffmpeg/ffprobe provisioning for desktop app bundles.
//!
//! Run before bundling: ensures the platform's ffmpeg and ffprobe
//! binaries sit in the output directory under target-triple names.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sidecars::commands;
use sidecars::config::Config;
use sidecars::platform::{self, PlatformTarget};

#[derive(Parser)]
#[command(name = "sidecars")]
#[command(about = "Provision ffmpeg/ffprobe sidecar binaries")]
#[command(
    after_help = "QUICK START:\n  sidecars preflight     Check host tools\n  sidecars               Provision sidecars for this host\n  sidecars show status   List what is installed\n  sidecars clean         Remove provisioned sidecars"
)]
struct Cli {
    /// Project root (holds .env and the default output directory)
    #[arg(long, global = true)]
    project_dir: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download, verify and install sidecars (default)
    Prepare {
        /// Output directory (default: <project>/src-tauri/binaries)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Target triple to provision instead of the host
        #[arg(long)]
        target: Option<PlatformTarget>,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },

    /// Remove provisioned sidecars and aliases
    Clean {
        /// Target triple to clean instead of the host
        #[arg(long)]
        target: Option<PlatformTarget>,
    },

    /// Check that the host tools needed for provisioning are available
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Print SHA-256 digests of files (for pinning new builds)
    Hash {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
    /// Show which sidecars are present
    Status {
        /// Target triple to inspect instead of the host
        #[arg(long)]
        target: Option<PlatformTarget>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Explicit target, else the host. Only `prepare` tolerates an unsupported host.
fn resolve_target(explicit: Option<PlatformTarget>) -> Result<PlatformTarget> {
    explicit.or_else(platform::detect).with_context(|| format!(
        "Unsupported host platform ({}/{}); pass --target <triple>",
        std::env::consts::OS,
        std::env::consts::ARCH
    ))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let project_dir = match cli.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let config = Config::load(&project_dir);

    match cli.command.unwrap_or(Commands::Prepare {
        output: None,
        target: None,
    }) {
        Commands::Prepare { output, target } => {
            let config = match output {
                Some(dir) => config.with_output_dir(dir),
                None => config,
            };
            commands::cmd_prepare(&config, target.or_else(platform::detect))?;
        }

        Commands::Show { what } => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
                ShowTarget::Status { target, json } => commands::show::ShowTarget::Status {
                    target: resolve_target(target)?,
                    json,
                },
            };
            commands::cmd_show(&config, show_target)?;
        }

        Commands::Clean { target } => {
            commands::cmd_clean(resolve_target(target)?, &config.output_dir)?;
        }

        Commands::Preflight { strict } => {
            commands::cmd_preflight(resolve_target(None)?, &config.output_dir, strict)?;
        }

        Commands::Hash { files } => {
            commands::cmd_hash(&files)?;
        }
    }

    Ok(())
}
