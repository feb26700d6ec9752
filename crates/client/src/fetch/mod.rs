//! Book fetch pipeline with write-through caching.
//!
//! ### Cache-first retrieval
//! - The cache is consulted before any network activity; a hit returns
//!   immediately with zero requests issued.
//! - A miss performs exactly one GET and writes the body through to the
//!   cache before returning it.
//!
//! ### Transport seam
//! - HTTP access goes through the [`Transport`] trait so tests can count
//!   and stub requests without a live server. [`HttpTransport`] is the
//!   reqwest-backed implementation used in production.

pub mod url;

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use folio_core::{BookCache, Error};

pub use url::BookRef;

/// Response from a transport-level GET.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body bytes.
    pub bytes: Bytes,
}

/// Minimal HTTP capability the fetcher depends on.
///
/// One GET per call, full body in memory; the upstream contract offers no
/// range or partial-content support.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Issue a single GET for `url` and return the status and full body.
    /// Transport-level failures (DNS, TLS, timeout) map to `DownloadFailed`.
    async fn get(&self, url: &::url::Url) -> Result<TransportResponse, Error>;
}

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "folio/0.1")
    pub user_agent: String,

    /// Request timeout (default: 30s)
    pub timeout: std::time::Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "folio/0.1".to_string(),
            timeout: std::time::Duration::from_millis(30_000),
            max_redirects: 5,
        }
    }
}

/// reqwest-backed transport.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Build an HTTP client with the given configuration.
    pub fn new(config: &FetchConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::download(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &::url::Url) -> Result<TransportResponse, Error> {
        let response = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| Error::download(format!("network error: {e}")))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::download(format!("failed to read response body: {e}")))?;

        Ok(TransportResponse { status, bytes })
    }
}

/// Cache-first book fetcher.
///
/// Holds its transport and cache explicitly (no process-wide singletons),
/// so tests can inject both.
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    cache: BookCache,
    max_bytes: usize,
}

/// Raw book bytes plus where they came from.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// The archive bytes.
    pub bytes: Bytes,
    /// Whether the bytes were served from the cache (no request issued).
    pub from_cache: bool,
    /// Wall-clock time of the fetch in milliseconds.
    pub fetch_ms: u64,
}

impl Fetcher {
    /// Create a fetcher over an explicit transport and cache.
    pub fn new(transport: Arc<dyn Transport>, cache: BookCache, max_bytes: usize) -> Self {
        Self { transport, cache, max_bytes }
    }

    /// Retrieve the archive bytes for `book`.
    ///
    /// Checks the cache under the book's key first; on a hit no network
    /// request is issued. On a miss, performs a single GET; a non-2xx
    /// response or transport failure surfaces as `DownloadFailed` with the
    /// cache left untouched. Successful bodies are written through to the
    /// cache before being returned.
    pub async fn fetch(&self, book: &BookRef) -> Result<Fetched, Error> {
        let start = Instant::now();
        let key = book.cache_key();

        if let Some(bytes) = self.cache.get(key).await? {
            tracing::debug!(url = %book, key, "serving from cache");
            return Ok(Fetched { bytes, from_cache: true, fetch_ms: elapsed_ms(start) });
        }

        let response = self.transport.get(book.url()).await?;

        if !(200..300).contains(&response.status) {
            return Err(Error::download_status(response.status, format!("GET {book}")));
        }

        if response.bytes.len() > self.max_bytes {
            return Err(Error::download(format!(
                "{} bytes exceeds limit of {}",
                response.bytes.len(),
                self.max_bytes
            )));
        }

        self.cache.put(key, &response.bytes).await?;

        tracing::debug!(
            url = %book,
            key,
            bytes = response.bytes.len(),
            ms = elapsed_ms(start),
            "downloaded and cached"
        );

        Ok(Fetched { bytes: response.bytes, from_cache: false, fetch_ms: elapsed_ms(start) })
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
