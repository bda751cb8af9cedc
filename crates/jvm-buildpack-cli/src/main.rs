//! JVM buildpack - JDK install step
//!
//! The `jvm-buildpack` command installs the JDK an application asks for
//! into a launch layer.
//!
//! ## Commands
//!
//! - `install`: Resolve, fetch and configure the JDK
//! - `metadata`: Print the runtime recorded by a previous install

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jdk_installer::{init_tracing, installed_runtime, Installer, InstallerConfig, Launch, JDK_LAYER};
use std::path::{Path, PathBuf};
use tracing::{error, Level};

#[derive(Parser)]
#[command(name = "jvm-buildpack")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Install a JDK for a JVM application", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install the JDK into the launch layer
    Install {
        /// Application root (holds system.properties and .jdk-overlay)
        #[arg(long, default_value = ".")]
        app_dir: PathBuf,

        /// Launch directory receiving the jdk layer
        #[arg(long)]
        launch: PathBuf,

        /// Buildpack root holding bin/ and profile.d/
        #[arg(long, env = "BUILDPACK_DIR")]
        buildpack: PathBuf,

        /// Fetcher program (default: <buildpack>/bin/jdk-fetcher)
        #[arg(long)]
        fetcher: Option<PathBuf>,

        /// Target image family
        #[arg(long, env = "STACK")]
        stack: Option<String>,
    },

    /// Print the installed runtime as JSON
    Metadata {
        /// Launch directory of a previous install
        #[arg(long)]
        launch: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match cli.command {
        Commands::Install {
            app_dir,
            launch,
            buildpack,
            fetcher,
            stack,
        } => cmd_install(&app_dir, &launch, &buildpack, fetcher, stack.as_deref()).await,
        Commands::Metadata { launch } => {
            println!("{}", metadata_json(&launch)?);
            Ok(())
        }
    }
}

/// Build the installer configuration from the environment and flags
fn build_config(
    buildpack: &Path,
    fetcher: Option<PathBuf>,
    stack: Option<&str>,
) -> InstallerConfig {
    let mut config = InstallerConfig::from_env(buildpack);
    if let Some(stack) = stack.filter(|s| !s.is_empty()) {
        config = config.with_stack(stack);
    }
    if let Some(fetcher) = fetcher {
        config = config.with_fetcher(fetcher);
    }
    config
}

/// Run the installer and print the JDK home
async fn cmd_install(
    app_dir: &Path,
    launch: &Path,
    buildpack: &Path,
    fetcher: Option<PathBuf>,
    stack: Option<&str>,
) -> Result<()> {
    let launch = std::path::absolute(launch)
        .with_context(|| format!("Failed to resolve launch directory {:?}", launch))?;
    let layer = Launch::new(launch).layer(JDK_LAYER);

    let installer = Installer::from_config(build_config(buildpack, fetcher, stack))
        .context("Failed to set up installer")?;

    let installed = match installer.install(app_dir, &layer).await {
        Ok(installed) => installed,
        Err(e) => {
            error!(stage = %e.stage(), "JDK installation failed: {}", e);
            return Err(e).context("JDK installation failed");
        }
    };

    println!("{}", installed.home.display());
    Ok(())
}

/// Persisted runtime of the jdk layer under `launch`, as pretty JSON
fn metadata_json(launch: &Path) -> Result<String> {
    let layer = Launch::new(launch).layer(JDK_LAYER);
    let installed = installed_runtime(&layer)
        .with_context(|| format!("No JDK recorded under {:?}", launch))?;
    serde_json::to_string_pretty(&installed).context("Failed to encode metadata")
}
