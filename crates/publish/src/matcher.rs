//! Asset selection for upload and deletion.

use std::path::{Component, Path, PathBuf};

use regex::Regex;

use crate::config::{IncludeRule, PublisherConfig};
use crate::types::{AssetListing, AssetRecord};

/// Resolves an asset's location on disk.
///
/// Everything from the first `?` onward (cache-busting query) is dropped
/// before joining to `output_dir`. A leading root or drive prefix in the
/// name is ignored, so the result always starts with `output_dir`.
pub fn asset_path(output_dir: &Path, name: &str) -> PathBuf {
    let file = name.split('?').next().unwrap_or(name);
    let mut path = output_dir.to_path_buf();
    for component in Path::new(file).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::ParentDir => path.push(".."),
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
        }
    }
    path
}

/// Include/exclude and delete predicates over asset names.
#[derive(Debug, Clone)]
pub struct Matcher {
    include: IncludeRule,
    exclude: Option<Regex>,
    delete: Regex,
}

impl Matcher {
    pub fn new(include: IncludeRule, exclude: Option<Regex>, delete: Regex) -> Self {
        Self {
            include,
            exclude,
            delete,
        }
    }

    pub fn from_config(config: &PublisherConfig) -> Self {
        Self::new(
            config.include.clone(),
            config.exclude.clone(),
            config.delete_pattern.clone(),
        )
    }

    /// Whether `name` should be uploaded.
    pub fn is_selected(&self, name: &str) -> bool {
        let excluded = self.exclude.as_ref().is_some_and(|re| re.is_match(name));
        self.include.includes(name) && !excluded
    }

    /// Whether `name` should be removed after the build.
    pub fn is_deletable(&self, name: &str) -> bool {
        self.delete.is_match(name)
    }

    pub fn delete_pattern(&self) -> &Regex {
        &self.delete
    }

    /// Returns the upload work list for `listing`, in listing order.
    pub fn select(&self, listing: &AssetListing) -> Vec<AssetRecord> {
        listing
            .names()
            .iter()
            .filter(|name| self.is_selected(name))
            .map(|name| AssetRecord {
                name: name.clone(),
                file_path: asset_path(&listing.output_dir, name),
            })
            .collect()
    }
}
