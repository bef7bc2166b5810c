//! Output directory scanning.
//!
//! Hosts that do not keep an asset manifest can list the output directory
//! instead. Names are relative paths joined with `/` on every platform.
//!
//! Symlinks to files are listed under the link's own name (the upload reads
//! through the link). Symlinked directories are not descended into, so a
//! link cycle cannot make the scan loop.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::PublishError;
use crate::types::AssetListing;

/// Walks `output_dir` recursively and returns every file as an asset.
///
/// Names are sorted so repeated scans of the same tree are identical.
pub fn scan_output_dir(output_dir: &Path) -> Result<AssetListing, PublishError> {
    let mut names = Vec::new();
    // Pending directories, each with the name prefix of its entries.
    let mut pending: Vec<(PathBuf, String)> = vec![(output_dir.to_path_buf(), String::new())];

    while let Some((dir, prefix)) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let name = format!("{prefix}{}", entry.file_name().to_string_lossy());
            let file_type = entry.file_type()?;

            if file_type.is_dir() {
                pending.push((entry.path(), format!("{name}/")));
            } else if file_type.is_file() {
                names.push(name);
            } else if file_type.is_symlink() {
                match fs::metadata(entry.path()) {
                    Ok(target) if target.is_file() => names.push(name),
                    Ok(_) => debug!(asset = %name, "skipping symlinked directory"),
                    Err(e) => debug!(asset = %name, error = %e, "skipping dangling symlink"),
                }
            }
        }
    }

    names.sort();
    debug!(dir = %output_dir.display(), assets = names.len(), "scanned output directory");
    Ok(AssetListing::new(output_dir, names))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_lists_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("app.js"), "a").unwrap();
        fs::write(root.join("app.js.map"), "m").unwrap();
        fs::create_dir_all(root.join("chunks").join("lazy")).unwrap();
        fs::write(root.join("chunks").join("1.js"), "c").unwrap();
        fs::write(root.join("chunks").join("lazy").join("2.js"), "l").unwrap();

        let listing = scan_output_dir(root).unwrap();
        assert_eq!(listing.output_dir, root);
        assert_eq!(
            listing.names(),
            ["app.js", "app.js.map", "chunks/1.js", "chunks/lazy/2.js"]
        );
    }

    #[test]
    fn scan_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_output_dir(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn scan_nonexistent_dir() {
        let result = scan_output_dir(Path::new("/nonexistent/build/output"));
        assert!(matches!(result, Err(PublishError::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn scan_follows_file_links_but_not_directory_links() {
        use std::os::unix::fs::symlink;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("js")).unwrap();
        fs::write(root.join("js").join("app.js"), "a").unwrap();
        symlink(root.join("js").join("app.js"), root.join("latest.js")).unwrap();
        // A cycle back to the root must not be walked.
        symlink(root, root.join("js").join("loop")).unwrap();
        symlink(root.join("missing.js"), root.join("dangling.js")).unwrap();

        let listing = scan_output_dir(root).unwrap();
        assert_eq!(listing.names(), ["js/app.js", "latest.js"]);
    }
}
