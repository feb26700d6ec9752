//! Book reference validation and canonicalization.
//!
//! A [`BookRef`] pairs a validated absolute http(s) URL with the cache key
//! derived from it. Validation happens before any I/O, so a malformed
//! reference can never trigger a network call or touch the cache.

use folio_core::Error;
use folio_core::cache::cache_key;
use url::Url;

/// A validated reference to a remote book.
///
/// Immutable once constructed: the URL is canonical (fragment stripped,
/// host lowercased by the parser) and the cache key is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRef {
    url: Url,
    cache_key: String,
}

impl BookRef {
    /// Parse and validate `input` as an absolute http(s) URL.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidReference` for empty input, relative URLs,
    /// unparseable URLs, or schemes other than `http`/`https`.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(Error::InvalidReference("empty URL".into()));
        }

        let mut url = Url::parse(trimmed).map_err(|e| Error::InvalidReference(e.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(Error::InvalidReference(format!("unsupported scheme: {scheme}")));
            }
        }

        if url.host_str().is_none() {
            return Err(Error::InvalidReference("missing host".into()));
        }

        url.set_fragment(None);

        let cache_key = cache_key(url.as_str());
        Ok(Self { url, cache_key })
    }

    /// The canonical URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The cache key derived from the full canonical URL.
    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    /// Last path segment of the URL, used as a fallback display title.
    pub fn file_name(&self) -> Option<&str> {
        self.url.path_segments().and_then(|mut s| s.next_back()).filter(|s| !s.is_empty())
    }
}

impl std::fmt::Display for BookRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.url.fmt(f)
    }
}
