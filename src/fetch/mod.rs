//! HTTP fetcher and link probe transport
//!
//! One pooled client serves both concerns: fetching the root document
//! (bytes + status + headers, body capped) and probing links (status
//! code only, body dropped). A status of 400 or above is an
//! observation, not a failure; the orchestrator decides what is
//! terminal. Every operation races an absolute deadline supplied by
//! the caller.

use crate::config::FetchConfig;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, ACCEPT, ACCEPT_LANGUAGE};
use tokio::time::Instant;

const USER_AGENT: &str = concat!("pagescope/", env!("CARGO_PKG_VERSION"));
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// A fetched document: status line, capped body, response headers
#[derive(Debug)]
pub struct FetchedPage {
    pub status: u16,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

/// Capability to fetch a document's bytes under a deadline
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, deadline: Instant, url: &str) -> FetchResult<FetchedPage>;
}

/// Capability to learn a URL's status code under a deadline
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, deadline: Instant, url: &str) -> FetchResult<u16>;
}

/// Reqwest-backed implementation of [`Fetch`] and [`Probe`]
///
/// The underlying client is process-wide: pooled, thread-safe, with a
/// bounded number of idle connections per host. It advertises gzip,
/// deflate, and brotli and decompresses each transparently.
pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> FetchResult<Self> {
        // Decompression must stay with the client: a hand-set
        // Accept-Encoding header would switch it off.
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.max_idle_per_host)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, deadline: Instant, url: &str) -> FetchResult<FetchedPage> {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, HTML_ACCEPT)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9");

        let started = std::time::Instant::now();
        let fetched = tokio::time::timeout_at(deadline, async {
            let response = request.send().await.map_err(|e| classify_error(url, e))?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();

            let mut body = Vec::new();
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| classify_error(url, e))?;
                if !append_capped(&mut body, &chunk, self.max_body_bytes) {
                    tracing::debug!(url, cap = self.max_body_bytes, "response body truncated");
                    break;
                }
            }

            Ok::<FetchedPage, FetchError>(FetchedPage {
                status,
                body,
                headers,
            })
        })
        .await
        .map_err(|_| FetchError::Timeout {
            url: url.to_string(),
        })??;

        tracing::debug!(
            url,
            status = fetched.status,
            content_length = fetched.body.len(),
            duration = ?started.elapsed(),
            "fetched document"
        );

        Ok(fetched)
    }
}

#[async_trait]
impl Probe for HttpFetcher {
    async fn probe(&self, deadline: Instant, url: &str) -> FetchResult<u16> {
        let outcome = tokio::time::timeout_at(deadline, self.client.get(url).send()).await;

        match outcome {
            Ok(Ok(response)) => Ok(response.status().as_u16()),
            Ok(Err(e)) => Err(classify_error(url, e)),
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        }
    }
}

/// Appends a chunk to the body, stopping at the cap.
///
/// Returns false once the cap is reached; the remainder of the stream
/// is silently discarded by the caller.
fn append_capped(body: &mut Vec<u8>, chunk: &[u8], cap: usize) -> bool {
    let room = cap - body.len();
    if chunk.len() >= room {
        body.extend_from_slice(&chunk[..room]);
        return false;
    }
    body.extend_from_slice(chunk);
    true
}

fn classify_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
