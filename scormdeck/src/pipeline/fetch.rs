//! Streamed package fetching.
//!
//! The [`PackageFetcher`] trait abstracts the HTTP transport so the
//! pipeline can be driven by a mock in tests. The real implementation
//! streams the response body chunk by chunk; the pipeline appends each
//! chunk to the store without buffering the whole archive in memory.

use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use thiserror::Error;

use crate::store::BoxFuture;

/// Default timeout covering the whole download.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Errors from the download transport.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The request could not be sent or the connection failed.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// Non-success HTTP status.
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The body stream broke mid-transfer.
    #[error("response stream from {url} failed: {reason}")]
    Stream { url: String, reason: String },
}

/// Chunked response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, FetchError>> + Send>>;

/// A started download: declared length (if the server sent one) plus the
/// chunk stream.
pub struct FetchResponse {
    /// Value of the content-length header, when present and non-zero.
    pub declared_length: Option<u64>,
    /// The body, delivered incrementally.
    pub stream: ByteStream,
}

impl std::fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchResponse")
            .field("declared_length", &self.declared_length)
            .field("stream", &"<stream>")
            .finish()
    }
}

/// Transport seam for package downloads.
pub trait PackageFetcher: Send + Sync {
    /// Issue a streamed GET for `url`.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchResponse, FetchError>>;
}

/// HTTP fetcher backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a fetcher with a custom whole-download timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl PackageFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<FetchResponse, FetchError>> {
        Box::pin(async move {
            let response =
                self.client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| FetchError::Transport {
                        url: url.to_string(),
                        reason: e.to_string(),
                    })?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let declared_length = response.content_length().filter(|len| *len > 0);
            let stream_url = url.to_string();
            let stream = response
                .bytes_stream()
                .map(move |chunk| {
                    chunk.map_err(|e| FetchError::Stream {
                        url: stream_url.clone(),
                        reason: e.to_string(),
                    })
                })
                .boxed();

            Ok(FetchResponse {
                declared_length,
                stream,
            })
        })
    }
}
