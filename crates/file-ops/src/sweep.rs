//! Post-build deletion of artifacts matching a pattern.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use regex::Regex;

/// Outcome of a cleanup sweep.
///
/// A sweep never fails as a whole; every per-file problem ends up in
/// `warnings` and the remaining files are still processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Deletes the local file of every asset whose name matches `pattern`.
///
/// `resolve` maps a logical asset name to its path on disk. The existence
/// check is the removal itself: `NotFound` means the asset was never written
/// (usually an earlier build step failed) and is reported as a warning.
pub fn sweep<S, F>(names: &[S], pattern: &Regex, resolve: F) -> SweepReport
where
    S: AsRef<str>,
    F: Fn(&str) -> PathBuf,
{
    let mut report = SweepReport::default();

    for name in names.iter().map(AsRef::as_ref) {
        if !pattern.is_match(name) {
            continue;
        }

        let path = resolve(name);
        match remove(&path) {
            Ok(()) => {
                tracing::debug!(asset = name, path = %path.display(), "deleted artifact");
                report.deleted.push(path);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let msg = format!(
                    "unable to delete '{name}'. File does not exist; it may not have been \
                     created due to a build error."
                );
                tracing::warn!(asset = name, path = %path.display(), "{msg}");
                report.warnings.push(msg);
            }
            Err(e) => {
                let msg = format!("unable to delete '{name}' ({}): {e}", path.display());
                tracing::warn!(asset = name, path = %path.display(), error = %e, "failed to delete artifact");
                report.warnings.push(msg);
            }
        }
    }

    if !report.deleted.is_empty() {
        tracing::info!(deleted = report.deleted.len(), "cleaned up build artifacts");
    }

    report
}

fn remove(path: &Path) -> std::io::Result<()> {
    // Directories are never build assets; refuse rather than recurse.
    if path.is_dir() {
        return Err(std::io::Error::other("path is a directory"));
    }
    std::fs::remove_file(path)
}
