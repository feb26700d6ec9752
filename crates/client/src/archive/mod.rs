//! Archive materialization and EPUB container access.
//!
//! The container reader works on filesystem paths, so fetched bytes are
//! first materialized to a uniquely named temp file. The temp file is owned
//! by a single extraction call and is removed when [`TempArchive`] drops,
//! unless the caller opts to keep it.

pub mod epub;

use std::io::Write;
use std::path::{Path, PathBuf};

use folio_core::Error;
use tempfile::TempPath;

pub use epub::Publication;

/// A fetched archive written to a unique temporary path.
///
/// The file is deleted on drop. Use [`TempArchive::keep`] to persist it for
/// debugging.
#[derive(Debug)]
pub struct TempArchive {
    path: TempPath,
}

impl TempArchive {
    /// Path of the materialized archive.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory containing the archive, usable as a base location for
    /// resolving relative resource references.
    pub fn base_dir(&self) -> PathBuf {
        self.path.parent().map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir)
    }

    /// Disarm deletion and return the persisted path.
    pub fn keep(self) -> Result<PathBuf, Error> {
        self.path.keep().map_err(|e| Error::MaterializationFailed(e.to_string()))
    }
}

/// Write `bytes` verbatim to a freshly generated unique `.epub` path.
///
/// # Errors
///
/// Any write failure (disk full, permissions) surfaces as
/// `MaterializationFailed`; the temp file must not be assumed to exist
/// afterwards.
pub fn materialize(bytes: &[u8]) -> Result<TempArchive, Error> {
    let mut file = tempfile::Builder::new()
        .prefix("folio-")
        .suffix(".epub")
        .tempfile()
        .map_err(|e| Error::MaterializationFailed(e.to_string()))?;

    file.write_all(bytes).map_err(|e| Error::MaterializationFailed(e.to_string()))?;
    file.flush().map_err(|e| Error::MaterializationFailed(e.to_string()))?;

    Ok(TempArchive { path: file.into_temp_path() })
}
