//! Publisher configuration file.
//!
//! Stored as TOML, by default `sourceship.toml` in the working directory.
//! Only `base_url` is required; every other field has a default.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use sourceship_publish::config::{DEFAULT_DELETE_PATTERN, DEFAULT_INCLUDE, DEFAULT_NAME_PREFIX};
use sourceship_publish::{
    Concurrency, FilenameTransform, IncludeRule, PublishError, PublisherConfig,
};

/// On-disk configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Upload endpoint root. No default.
    pub base_url: String,

    /// Upload eligibility before exclusion.
    #[serde(default)]
    pub include: IncludeSetting,

    /// Pattern of asset names never uploaded.
    #[serde(default)]
    pub exclude: Option<String>,

    /// Prefix added to asset names before upload.
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// Delete matching local assets once the build is done.
    #[serde(default)]
    pub delete_after_compile: bool,

    #[serde(default = "default_delete_pattern")]
    pub delete_pattern: String,

    /// Maximum uploads in flight (0 = unbounded).
    #[serde(default)]
    pub upload_concurrency: usize,

    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// `[include]` table: `mode = "pattern" | "all" | "none"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum IncludeSetting {
    Pattern { pattern: String },
    All,
    None,
}

impl Default for IncludeSetting {
    fn default() -> Self {
        Self::Pattern {
            pattern: DEFAULT_INCLUDE.into(),
        }
    }
}

fn default_name_prefix() -> String {
    DEFAULT_NAME_PREFIX.into()
}

fn default_delete_pattern() -> String {
    DEFAULT_DELETE_PATTERN.into()
}

impl Config {
    /// Loads configuration from `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Compiles patterns and builds the publisher configuration.
    pub fn into_publisher_config(self) -> Result<PublisherConfig, PublishError> {
        let include = match self.include {
            IncludeSetting::Pattern { pattern } => IncludeRule::pattern(&pattern)?,
            IncludeSetting::All => IncludeRule::All,
            IncludeSetting::None => IncludeRule::Nothing,
        };

        let mut config = PublisherConfig::new(self.base_url)
            .with_include(include)
            .with_filename_transform(FilenameTransform::prefix(self.name_prefix))
            .with_concurrency(Concurrency::from_limit(self.upload_concurrency));

        if let Some(exclude) = self.exclude {
            config = config.with_exclude(Regex::new(&exclude)?);
        }
        if self.delete_after_compile {
            config = config.with_delete_after_compile(Regex::new(&self.delete_pattern)?);
        }
        for (name, value) in self.headers {
            config = config.with_header(name, value);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config: Config = toml::from_str(r#"base_url = "https://artifacts.local/r/1""#).unwrap();
        assert_eq!(config.include, IncludeSetting::default());
        assert!(config.exclude.is_none());
        assert_eq!(config.name_prefix, "~/");
        assert!(!config.delete_after_compile);
        assert_eq!(config.delete_pattern, r"\.map$");
        assert_eq!(config.upload_concurrency, 0);

        let publisher = config.into_publisher_config().unwrap();
        assert_eq!(publisher.upload_concurrency, Concurrency::Unbounded);
        assert!(publisher.include.includes("a.js"));
        assert!(!publisher.include.includes("a.css"));
    }

    #[test]
    fn base_url_is_required() {
        let result: Result<Config, _> = toml::from_str(r#"upload_concurrency = 4"#);
        assert!(result.is_err());
    }

    #[test]
    fn full_config() {
        let toml_str = r#"
            base_url = "https://artifacts.local/r/1"
            exclude = "^vendor"
            name_prefix = "~/static/"
            delete_after_compile = true
            delete_pattern = "\\.(map|LICENSE\\.txt)$"
            upload_concurrency = 4

            [headers]
            Authorization = "Bearer abc"

            [include]
            mode = "all"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.include, IncludeSetting::All);

        let publisher = config.into_publisher_config().unwrap();
        assert!(publisher.include.includes("anything.png"));
        assert!(publisher.exclude.as_ref().unwrap().is_match("vendor.js"));
        assert_eq!(publisher.filename_transform.apply("a.js"), "~/static/a.js");
        assert!(publisher.delete_after_compile);
        assert!(publisher.delete_pattern.is_match("a.js.LICENSE.txt"));
        assert_eq!(publisher.upload_concurrency, Concurrency::from_limit(4));
        assert_eq!(
            publisher.headers,
            vec![("Authorization".to_string(), "Bearer abc".to_string())]
        );
    }

    #[test]
    fn include_modes() {
        let none: Config = toml::from_str(
            "base_url = \"http://h\"\n[include]\nmode = \"none\"\n",
        )
        .unwrap();
        assert_eq!(none.include, IncludeSetting::None);

        let pattern: Config = toml::from_str(
            "base_url = \"http://h\"\n[include]\nmode = \"pattern\"\npattern = \"\\\\.css$\"\n",
        )
        .unwrap();
        let publisher = pattern.into_publisher_config().unwrap();
        assert!(publisher.include.includes("main.css"));
        assert!(!publisher.include.includes("main.js"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let config: Config =
            toml::from_str("base_url = \"http://h\"\nexclude = \"(unclosed\"\n").unwrap();
        assert!(matches!(
            config.into_publisher_config(),
            Err(PublishError::InvalidPattern(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sourceship.toml");
        std::fs::write(&path, "base_url = \"http://localhost:8080\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");

        assert!(Config::load(&tmp.path().join("missing.toml")).is_err());
    }
}
