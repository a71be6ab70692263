//! HTTP transport used by every network-facing component.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::{header, Client, StatusCode};

use crate::error::{Error, Result};

/// Streamed response body.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Inclusive byte range for a ranged GET. `end: None` means "to the end".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    /// Range from `start` to the end of the resource.
    pub fn from(start: u64) -> Self {
        Self { start, end: None }
    }

    /// Range from `start` up to but excluding `end_exclusive`.
    pub fn until(start: u64, end_exclusive: u64) -> Self {
        Self {
            start,
            end: Some(end_exclusive.saturating_sub(1)),
        }
    }

    /// Value for the `Range` request header.
    pub fn header_value(&self) -> String {
        match self.end {
            Some(end) => format!("bytes={}-{}", self.start, end),
            None => format!("bytes={}-", self.start),
        }
    }
}

/// A streaming response together with the length the server declared.
pub struct StreamResponse {
    /// `Content-Length` of this response, i.e. the bytes still to come.
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

/// Network access as seen by the resolver, caption pipeline and engine.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a text document. Non-2xx responses are `Error::Network`.
    async fn get_text(&self, url: &str) -> Result<String>;

    /// Open a streaming GET, optionally ranged. Non-2xx responses are
    /// `Error::Download`.
    async fn get_stream(&self, url: &str, range: Option<ByteRange>) -> Result<StreamResponse>;
}

/// Default browser user agent.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// reqwest-backed transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a client with a bounded connect timeout and no overall deadline.
    pub fn new(user_agent: &str, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status != StatusCode::OK {
            return Err(Error::Network(format!("HTTP {} from {}", status, url)));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read body of {}: {}", url, e)))
    }

    async fn get_stream(&self, url: &str, range: Option<ByteRange>) -> Result<StreamResponse> {
        let mut request = self.client.get(url);
        if let Some(range) = range {
            tracing::debug!("GET {} ({})", url, range.header_value());
            request = request.header(header::RANGE, range.header_value());
        } else {
            tracing::debug!("GET {}", url);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Download(format!("Request failed: {}", e)))?;

        check_stream_status(response.status(), range)?;

        let content_length = response.content_length();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Error::Download(format!("Stream error: {}", e))))
            .boxed();

        Ok(StreamResponse {
            content_length,
            body,
        })
    }
}

/// Reject failures, and full bodies sent for a request that starts past
/// byte zero (they would be appended after the bytes already on disk).
fn check_stream_status(status: StatusCode, range: Option<ByteRange>) -> Result<()> {
    if !status.is_success() {
        return Err(Error::Download(format!(
            "Failed to download file: HTTP {}",
            status
        )));
    }
    if let Some(range) = range {
        if range.start > 0 && status != StatusCode::PARTIAL_CONTENT {
            return Err(Error::Download(format!(
                "Server ignored {} and answered HTTP {}",
                range.header_value(),
                status
            )));
        }
    }
    Ok(())
}
