//! sourceship — publish build artifacts after a build.
//!
//! Minimal host for the publisher: scans a build output directory, uploads
//! the selected assets, then runs the post-build cleanup.

mod config;

use std::path::PathBuf;

use clap::Parser;
use sourceship_publish::{AssetListing, Diagnostics, Publisher, scan_output_dir};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sourceship")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "sourceship.toml")]
    config: PathBuf,

    /// Upload only, skip post-build cleanup
    #[arg(long)]
    skip_cleanup: bool,

    /// Build output directory
    output_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = config::Config::load(&cli.config)?;
    tracing::info!(base_url = %config.base_url, "configuration loaded");

    let publisher = Publisher::new(config.into_publisher_config()?)?;
    let listing = scan_output_dir(&cli.output_dir)?;

    let rt = tokio::runtime::Runtime::new()?;
    let diagnostics = rt.block_on(run(&publisher, &listing, cli.skip_cleanup));

    for warning in &diagnostics.warnings {
        tracing::warn!("{warning}");
    }
    for error in &diagnostics.errors {
        tracing::error!("{error}");
    }

    if diagnostics.has_errors() {
        anyhow::bail!("publishing failed with {} error(s)", diagnostics.errors.len());
    }
    Ok(())
}

async fn run(publisher: &Publisher, listing: &AssetListing, skip_cleanup: bool) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    publisher.on_artifacts_ready(listing, &mut diagnostics).await;
    if !skip_cleanup {
        publisher.on_build_complete(listing, &mut diagnostics).await;
    }

    diagnostics
}
