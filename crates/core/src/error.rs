//! Unified error types for the folio pipeline.
//!
//! Every failure mode of a `load_book` call maps to exactly one variant
//! here, so callers can distinguish (for example) a corrupt archive from an
//! archive that opened fine but contained nothing readable.

use crate::config::ConfigError;

/// Unified error types for the book pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or non-http(s) book URL. No I/O was attempted.
    #[error("invalid book reference: {0}")]
    InvalidReference(String),

    /// Non-2xx HTTP response or transport failure on a cache miss.
    /// The cache is left untouched.
    #[error("download failed{}: {reason}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    DownloadFailed {
        /// HTTP status code, when the server answered at all.
        status: Option<u16>,
        reason: String,
    },

    /// Writing the archive bytes to a temporary file failed. The temp file
    /// must not be assumed to exist afterwards.
    #[error("failed to materialize archive: {0}")]
    MaterializationFailed(String),

    /// The archive could not be opened or its container metadata could not
    /// be parsed. Extraction was aborted.
    #[error("failed to parse archive: {0}")]
    ArchiveParsingFailed(String),

    /// The archive opened but yielded zero usable text after per-resource
    /// skips. Distinct from a success with legitimately empty content.
    #[error("archive yielded no extractable content")]
    NoExtractableContent,

    /// Cache read or write failed.
    #[error("cache error: {0}")]
    Cache(#[from] std::io::Error),

    /// Configuration load or validation failure.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Shorthand for a download failure without an HTTP status (transport
    /// errors, oversize bodies).
    pub fn download(reason: impl Into<String>) -> Self {
        Error::DownloadFailed { status: None, reason: reason.into() }
    }

    /// Shorthand for a download failure carrying the HTTP status code.
    pub fn download_status(status: u16, reason: impl Into<String>) -> Self {
        Error::DownloadFailed { status: Some(status), reason: reason.into() }
    }
}
