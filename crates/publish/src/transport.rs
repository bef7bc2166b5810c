//! Upload transport.
//!
//! `ArtifactSink` is the seam between the upload pool and the network.
//! `HttpTransport` is the real implementation: one multipart POST per file.

use std::future::Future;
use std::pin::Pin;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;

use crate::config::{FilenameTransform, PublisherConfig};
use crate::error::PublishError;
use crate::types::UploadTask;

/// Destination for uploaded artifacts.
///
/// Kept as a trait so the upload pool can be driven by mocks in tests.
pub trait ArtifactSink: Send + Sync {
    /// Uploads a single artifact.
    fn upload<'a>(
        &'a self,
        task: &'a UploadTask,
    ) -> Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>>;
}

/// Multipart HTTP uploader.
pub struct HttpTransport {
    http: reqwest::Client,
    url: String,
    transform: FilenameTransform,
}

impl HttpTransport {
    /// Creates a transport for the endpoint described by `config`.
    pub fn new(config: &PublisherConfig) -> Result<Self, PublishError> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| PublishError::InvalidConfig(format!("invalid header name: {name}")))?;
            let value = HeaderValue::from_str(value).map_err(|_| {
                PublishError::InvalidConfig(format!("invalid value for header {name}"))
            })?;
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            url: config.upload_url(),
            transform: config.filename_transform.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, task: &UploadTask) -> Result<(), PublishError> {
        let file = tokio::fs::File::open(&task.file_path).await?;
        let len = file.metadata().await?.len();
        let file_name = task
            .file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| task.name.clone());

        // The reader is owned by the request body and dropped with it.
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let form = Form::new()
            .part(
                "file",
                Part::stream_with_length(body, len).file_name(file_name),
            )
            .text("name", self.transform.apply(&task.name));

        let resp = self.http.post(&self.url).multipart(form).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PublishError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(asset = %task.name, status = status.as_u16(), "uploaded artifact");
        Ok(())
    }
}

impl ArtifactSink for HttpTransport {
    fn upload<'a>(
        &'a self,
        task: &'a UploadTask,
    ) -> Pin<Box<dyn Future<Output = Result<(), PublishError>> + Send + 'a>> {
        Box::pin(self.post(task))
    }
}
