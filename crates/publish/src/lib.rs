//! Build artifact publishing.
//!
//! Ships selected build outputs (typically scripts and their source maps)
//! to an artifact-ingestion endpoint and removes local copies that must not
//! be deployed. The host build system drives it through two stages on
//! [`Publisher`].
//!
//! # Pipeline
//!
//! 1. **Select** — include/exclude patterns over the asset names
//! 2. **Upload** — one multipart POST per asset, bounded concurrency,
//!    fail-fast on the first unrecoverable error
//! 3. **Classify** — conflicts become warnings, other failures errors
//! 4. **Sweep** — after the build, delete assets matching the delete pattern

pub mod config;
pub mod error;
pub mod matcher;
pub mod publisher;
pub mod scanner;
pub mod transport;
pub mod types;
pub mod uploader;

pub use config::{Concurrency, FilenameTransform, IncludeRule, PublisherConfig};
pub use error::PublishError;
pub use matcher::{Matcher, asset_path};
pub use publisher::Publisher;
pub use scanner::scan_output_dir;
pub use transport::{ArtifactSink, HttpTransport};
pub use types::{AssetListing, AssetRecord, Diagnostics, UploadSummary, UploadTask};
pub use uploader::upload_all;
