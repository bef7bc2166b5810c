//! Publish error types.

/// HTTP status the ingestion endpoint answers with when an artifact under
/// the same name already exists.
pub const CONFLICT_STATUS: u16 = 409;

/// Errors produced while publishing artifacts.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upload rejected with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("upload worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl PublishError {
    /// HTTP status code attached to this failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the remote reported that the artifact already exists.
    pub fn is_conflict(&self) -> bool {
        self.status_code() == Some(CONFLICT_STATUS)
    }
}
