//! Publisher configuration.
//!
//! Everything is supplied once, up front, and read-only afterwards.
//! There is no default endpoint: `base_url` must be given.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use regex::Regex;

use crate::error::PublishError;

/// Default include pattern: compiled scripts and their source maps.
pub const DEFAULT_INCLUDE: &str = r"\.js$|\.map$";

/// Default delete pattern: source maps.
pub const DEFAULT_DELETE_PATTERN: &str = r"\.map$";

/// Prefix applied to asset names by the default filename transform.
pub const DEFAULT_NAME_PREFIX: &str = "~/";

/// Which assets are eligible for upload before exclusion is applied.
#[derive(Debug, Clone)]
pub enum IncludeRule {
    /// Assets whose name matches the pattern.
    Matching(Regex),
    /// Every asset (no include pattern, match-all).
    All,
    /// No asset (no include pattern, match-none).
    Nothing,
}

impl IncludeRule {
    pub fn pattern(pattern: &str) -> Result<Self, PublishError> {
        Ok(Self::Matching(Regex::new(pattern)?))
    }

    pub fn includes(&self, name: &str) -> bool {
        match self {
            Self::Matching(re) => re.is_match(name),
            Self::All => true,
            Self::Nothing => false,
        }
    }
}

impl Default for IncludeRule {
    fn default() -> Self {
        Self::Matching(default_regex(DEFAULT_INCLUDE))
    }
}

/// Upper bound on uploads in flight at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Concurrency {
    #[default]
    Unbounded,
    Limited(NonZeroUsize),
}

impl Concurrency {
    /// `0` means unbounded.
    pub fn from_limit(limit: usize) -> Self {
        match NonZeroUsize::new(limit) {
            Some(n) => Self::Limited(n),
            None => Self::Unbounded,
        }
    }

    /// Number of workers needed to drain `pending` tasks.
    pub fn workers_for(self, pending: usize) -> usize {
        match self {
            Self::Unbounded => pending,
            Self::Limited(n) => n.get().min(pending),
        }
    }
}

/// Maps a logical asset name to the name sent to the endpoint.
#[derive(Clone)]
pub struct FilenameTransform(Arc<dyn Fn(&str) -> String + Send + Sync>);

impl FilenameTransform {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Transform that prepends `prefix` to every name.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self::new(move |name| format!("{prefix}{name}"))
    }

    pub fn apply(&self, name: &str) -> String {
        (self.0)(name)
    }
}

impl Default for FilenameTransform {
    fn default() -> Self {
        Self::prefix(DEFAULT_NAME_PREFIX)
    }
}

impl fmt::Debug for FilenameTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FilenameTransform(..)")
    }
}

/// Full publisher configuration.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Root URL of the ingestion endpoint. Uploads go to `{base_url}/`.
    pub base_url: String,
    pub include: IncludeRule,
    pub exclude: Option<Regex>,
    pub filename_transform: FilenameTransform,
    pub delete_after_compile: bool,
    pub delete_pattern: Regex,
    pub upload_concurrency: Concurrency,
    /// Extra headers sent with every upload request.
    pub headers: Vec<(String, String)>,
}

impl PublisherConfig {
    /// Creates a configuration with defaults for everything but the endpoint.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            include: IncludeRule::default(),
            exclude: None,
            filename_transform: FilenameTransform::default(),
            delete_after_compile: false,
            delete_pattern: default_regex(DEFAULT_DELETE_PATTERN),
            upload_concurrency: Concurrency::default(),
            headers: Vec::new(),
        }
    }

    pub fn with_include(mut self, include: IncludeRule) -> Self {
        self.include = include;
        self
    }

    pub fn with_exclude(mut self, exclude: Regex) -> Self {
        self.exclude = Some(exclude);
        self
    }

    pub fn with_filename_transform(mut self, transform: FilenameTransform) -> Self {
        self.filename_transform = transform;
        self
    }

    pub fn with_delete_after_compile(mut self, pattern: Regex) -> Self {
        self.delete_after_compile = true;
        self.delete_pattern = pattern;
        self
    }

    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.upload_concurrency = concurrency;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Upload URL: `base_url` with exactly one trailing slash.
    pub fn upload_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn validate(&self) -> Result<(), PublishError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(PublishError::InvalidConfig("base_url is required".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(PublishError::InvalidConfig(format!(
                "base_url must be an http(s) URL: {url}"
            )));
        }
        Ok(())
    }
}

// Only used for the compile-time constants above.
fn default_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => unreachable!("built-in pattern {pattern:?} is invalid: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PublisherConfig::new("http://localhost:81");
        assert!(config.include.includes("app.js"));
        assert!(config.include.includes("app.js.map"));
        assert!(!config.include.includes("app.css"));
        assert!(config.exclude.is_none());
        assert!(!config.delete_after_compile);
        assert!(config.delete_pattern.is_match("app.js.map"));
        assert_eq!(config.upload_concurrency, Concurrency::Unbounded);
        assert_eq!(config.filename_transform.apply("app.js"), "~/app.js");
        assert!(config.headers.is_empty());
    }

    #[test]
    fn include_rules() {
        assert!(IncludeRule::All.includes("anything"));
        assert!(!IncludeRule::Nothing.includes("app.js"));
        let rule = IncludeRule::pattern(r"\.css$").unwrap();
        assert!(rule.includes("main.css"));
        assert!(!rule.includes("main.js"));
    }

    #[test]
    fn include_rule_invalid_pattern() {
        let err = IncludeRule::pattern("(unclosed").unwrap_err();
        assert!(matches!(err, PublishError::InvalidPattern(_)));
    }

    #[test]
    fn concurrency_workers() {
        assert_eq!(Concurrency::Unbounded.workers_for(12), 12);
        assert_eq!(Concurrency::from_limit(3).workers_for(12), 3);
        assert_eq!(Concurrency::from_limit(30).workers_for(12), 12);
        assert_eq!(Concurrency::from_limit(0), Concurrency::Unbounded);
    }

    #[test]
    fn upload_url_has_single_trailing_slash() {
        assert_eq!(
            PublisherConfig::new("http://host/releases/1").upload_url(),
            "http://host/releases/1/"
        );
        assert_eq!(
            PublisherConfig::new("http://host/releases/1//").upload_url(),
            "http://host/releases/1/"
        );
    }

    #[test]
    fn validate_rejects_missing_or_bad_url() {
        assert!(PublisherConfig::new("").validate().is_err());
        assert!(PublisherConfig::new("ftp://host").validate().is_err());
        assert!(PublisherConfig::new("https://host").validate().is_ok());
    }

    #[test]
    fn custom_transform() {
        let t = FilenameTransform::new(|n| n.to_uppercase());
        assert_eq!(t.apply("a.js"), "A.JS");
        assert_eq!(FilenameTransform::prefix("~/static/").apply("a.js"), "~/static/a.js");
    }
}
