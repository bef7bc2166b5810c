//! Build lifecycle stages.
//!
//! The host awaits `on_artifacts_ready` once its output is on disk and
//! `on_build_complete` once the build has finished. Neither stage returns
//! an error: failures are classified into the host's [`Diagnostics`].

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::PublisherConfig;
use crate::error::PublishError;
use crate::matcher::{Matcher, asset_path};
use crate::transport::{ArtifactSink, HttpTransport};
use crate::types::{AssetListing, Diagnostics};
use crate::uploader::upload_all;

/// Prefix of every diagnostic the publisher reports to the host.
pub const DIAGNOSTIC_PREFIX: &str = "artifact publisher";

/// Publishes build artifacts and cleans up after the build.
pub struct Publisher {
    config: PublisherConfig,
    matcher: Matcher,
    sink: Arc<dyn ArtifactSink>,
}

impl Publisher {
    /// Creates a publisher uploading over HTTP to `config.base_url`.
    pub fn new(config: PublisherConfig) -> Result<Self, PublishError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_sink(config, Arc::new(transport)))
    }

    /// Creates a publisher uploading through a custom sink.
    pub fn with_sink(config: PublisherConfig, sink: Arc<dyn ArtifactSink>) -> Self {
        let matcher = Matcher::from_config(&config);
        Self {
            config,
            matcher,
            sink,
        }
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Uploads every selected asset of `listing`.
    ///
    /// Resolves once all uploads finished or the first failure was reported.
    /// A conflict (artifact already exists) is a warning; any other failure
    /// is an error.
    pub async fn on_artifacts_ready(&self, listing: &AssetListing, diagnostics: &mut Diagnostics) {
        let tasks = self.matcher.select(listing);
        info!(
            assets = listing.len(),
            selected = tasks.len(),
            url = %self.config.upload_url(),
            "publishing artifacts"
        );

        if let Err(e) = upload_all(tasks, self.config.upload_concurrency, self.sink.clone()).await
        {
            report_upload_error(&e, diagnostics);
        }
    }

    /// Removes local assets matching the delete pattern, if enabled.
    pub async fn on_build_complete(&self, listing: &AssetListing, diagnostics: &mut Diagnostics) {
        if !self.config.delete_after_compile {
            return;
        }

        let names = listing.names().to_vec();
        let pattern = self.matcher.delete_pattern().clone();
        let output_dir = listing.output_dir.clone();

        let swept = tokio::task::spawn_blocking(move || {
            sourceship_file_ops::sweep(&names, &pattern, |name| asset_path(&output_dir, name))
        })
        .await;

        match swept {
            Ok(report) => {
                for w in report.warnings {
                    diagnostics.warn(format!("{DIAGNOSTIC_PREFIX}: {w}"));
                }
            }
            Err(e) => {
                warn!(error = %e, "cleanup task failed");
                diagnostics.warn(format!("{DIAGNOSTIC_PREFIX}: cleanup did not complete: {e}"));
            }
        }
    }
}

fn report_upload_error(err: &PublishError, diagnostics: &mut Diagnostics) {
    let msg = format!("{DIAGNOSTIC_PREFIX}: {err}");
    if err.is_conflict() {
        warn!(error = %err, "artifact already exists");
        diagnostics.warn(msg);
    } else {
        error!(error = %err, "artifact upload failed");
        diagnostics.error(msg);
    }
}
