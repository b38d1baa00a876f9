//! Streaming artifact download.
//!
//! The response body is handed out as an [`AsyncRead`](tokio::io::AsyncRead)
//! so it can be decompressed and unpacked while it arrives; nothing buffers
//! the whole archive.

use std::error::Error;
use std::io;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio_util::io::StreamReader;
use tracing::debug;

/// Time allowed to establish the connection, independent of the transfer timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while downloading an artifact.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, DNS, TLS or timeout failure before a response arrived.
    #[error("Network error")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status, typically because no
    /// artifact is published for this version and platform.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Status returned by the server.
        status: StatusCode,
    },

    /// The connection failed while the body was being read.
    #[error("Download interrupted")]
    Interrupted(#[source] io::Error),
}

impl FetchError {
    /// Classify an I/O error raised while consuming an [`ArtifactStream`].
    ///
    /// Transfer failures are reqwest errors, possibly wrapped again by the
    /// decoder or the archive reader on the way up; any of those becomes
    /// [`FetchError::Interrupted`]. Anything else is handed back unchanged.
    ///
    /// # Errors
    ///
    /// Returns the original error when it did not come from the network.
    pub fn from_body_error(err: io::Error) -> Result<Self, io::Error> {
        if caused_by_transfer(&err) {
            Ok(Self::Interrupted(err))
        } else {
            Err(err)
        }
    }
}

fn caused_by_transfer(err: &io::Error) -> bool {
    let mut next = err
        .get_ref()
        .map(|inner| inner as &(dyn Error + 'static));
    while let Some(cause) = next {
        if cause.is::<reqwest::Error>() {
            return true;
        }
        // io::Error::source() skips its own payload, so descend into it directly.
        next = match cause.downcast_ref::<io::Error>() {
            Some(io_err) => io_err.get_ref().map(|inner| inner as &(dyn Error + 'static)),
            None => cause.source(),
        };
    }
    false
}

/// Response body adapted to `AsyncRead`.
pub type ArtifactStream = StreamReader<BoxStream<'static, io::Result<Bytes>>, Bytes>;

/// Opens artifact downloads.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher with the launcher User-Agent and the given total
    /// transfer timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if the HTTP client cannot be
    /// initialised (e.g. no TLS backend).
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder()
            .user_agent(crate::USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Issue a GET for `url` and return its body as a stream.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Network`] if no response is received and
    /// [`FetchError::HttpStatus`] for any non-2xx status.
    pub async fn fetch(&self, url: &str) -> Result<ArtifactStream, FetchError> {
        debug!(url, "fetching artifact");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        debug!(
            url,
            content_length = ?response.content_length(),
            "artifact response received"
        );

        let body = response.bytes_stream().map_err(io::Error::other).boxed();
        Ok(StreamReader::new(body))
    }
}
