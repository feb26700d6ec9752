//! The book content pipeline.
//!
//! Orchestrates the full flow: reference validation → cache-first fetch →
//! temp-file materialization → reading-order extraction → render
//! adaptation. Each `load_book` call is independent; callers may run many
//! concurrently and cancel them at any await point without corrupting the
//! cache.

use std::sync::Arc;

use folio_core::{AppConfig, BookCache, Error};

use crate::archive::materialize;
use crate::extract::{ExtractOptions, extract};
use crate::fetch::{BookRef, FetchConfig, Fetcher, HttpTransport, Transport};
use crate::render::{RenderMode, RenderableDocument, present};

/// The result of one `load_book` call.
#[derive(Debug, Clone)]
pub struct RenderedBook {
    /// Declared title, or the URL's filename when the archive has none.
    pub title: String,
    /// Number of reading-order entries that contributed content.
    pub chapters: usize,
    /// The adapted document for the display surface.
    pub document: RenderableDocument,
    /// Whether the archive bytes came from the cache.
    pub from_cache: bool,
    /// Fetch duration in milliseconds.
    pub fetch_ms: u64,
}

/// Content pipeline with explicit dependencies.
///
/// Holds its own transport and cache rather than reaching for process-wide
/// state, so tests can construct isolated instances with a stub transport.
pub struct BookPipeline {
    fetcher: Fetcher,
    cache: BookCache,
    keep_temp_files: bool,
}

impl BookPipeline {
    /// Build a pipeline with the reqwest-backed transport.
    pub fn new(config: &AppConfig) -> Result<Self, Error> {
        let transport = Arc::new(HttpTransport::new(&FetchConfig {
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
        })?);
        Ok(Self::with_transport(transport, config))
    }

    /// Build a pipeline over an explicit transport.
    pub fn with_transport(transport: Arc<dyn Transport>, config: &AppConfig) -> Self {
        let cache = BookCache::new(&config.cache_dir);
        let fetcher = Fetcher::new(transport, cache.clone(), config.max_bytes);
        Self { fetcher, cache, keep_temp_files: config.keep_temp_files }
    }

    /// The cache this pipeline reads and writes.
    pub fn cache(&self) -> &BookCache {
        &self.cache
    }

    /// Load a book and render it as HTML.
    pub async fn load_book(&self, url: &str) -> Result<RenderedBook, Error> {
        self.load_book_with(url, RenderMode::Html).await
    }

    /// Load a book and render it for the given display surface.
    ///
    /// Fails with the taxonomy in `folio_core::Error`; on failure no
    /// caller-visible state has been partially mutated. Retry policy, if
    /// any, belongs to the caller.
    pub async fn load_book_with(&self, url: &str, mode: RenderMode) -> Result<RenderedBook, Error> {
        let book = BookRef::parse(url)?;
        tracing::info!(url = %book, "loading book");

        let fetched = self.fetcher.fetch(&book).await?;

        let options = ExtractOptions { fallback_title: book.file_name().map(String::from) };
        let keep_temp_files = self.keep_temp_files;
        let bytes = fetched.bytes.clone();

        // Materialization and archive walking are blocking I/O; keep them
        // off the async executor.
        let content = tokio::task::spawn_blocking(move || {
            let temp = materialize(&bytes)?;
            let content = extract(temp.path(), &options)?;
            if keep_temp_files {
                let path = temp.keep()?;
                tracing::debug!(path = %path.display(), "kept temp archive");
            }
            Ok::<_, Error>(content)
        })
        .await
        .map_err(|e| Error::ArchiveParsingFailed(format!("extraction task failed: {e}")))??;

        let document = present(&content, mode);

        Ok(RenderedBook {
            title: content.title,
            chapters: content.chapters,
            document,
            from_cache: fetched.from_cache,
            fetch_ms: fetched.fetch_ms,
        })
    }
}
