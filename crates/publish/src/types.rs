//! Data types shared by the publish stages.

use std::collections::HashSet;
use std::path::PathBuf;

/// Assets produced by one build, as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetListing {
    /// Directory the host wrote its output to.
    pub output_dir: PathBuf,
    names: Vec<String>,
}

impl AssetListing {
    /// Builds a listing. Repeated names keep only their first occurrence.
    pub fn new<I, S>(output_dir: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|n: &String| seen.insert(n.clone()))
            .collect();
        Self {
            output_dir: output_dir.into(),
            names,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// An asset selected for upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetRecord {
    /// Logical name as reported by the host (may carry a `?query`).
    pub name: String,
    /// Resolved location on disk.
    pub file_path: PathBuf,
}

/// An asset queued for transmission. Consumed exactly once.
pub type UploadTask = AssetRecord;

/// Result of a successful upload run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: usize,
    /// Highest number of uploads observed in flight at once.
    pub peak_in_flight: usize,
}

/// Host diagnostics channel: warnings are surfaced, errors fail the build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
