//! Book cache CRUD operations.
//!
//! One file per cached book under `<root>/books/<key>.epub`. Writes go to a
//! `.part` sibling first and are renamed into place, so readers either see a
//! complete entry or none at all.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;

use crate::Error;

/// Subdirectory of the cache root holding book archives.
const BOOKS_DIR: &str = "books";

/// Extension for cached archives.
const ENTRY_EXT: &str = "epub";

/// Aggregate statistics for a cache directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached books.
    pub entries: u64,
    /// Total size of all cached books in bytes.
    pub total_bytes: u64,
}

/// On-disk, write-through cache for downloaded book archives.
///
/// Safe to share across concurrent pipeline tasks: `get` never observes a
/// partial entry, and racing `put`s for the same key resolve last-writer-wins
/// over identical content.
#[derive(Debug, Clone)]
pub struct BookCache {
    books_dir: PathBuf,
}

impl BookCache {
    /// Create a cache rooted at `root`. No directories are created until the
    /// first `put`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { books_dir: root.as_ref().join(BOOKS_DIR) }
    }

    /// Path of the entry for `key`, whether or not it exists.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.books_dir.join(format!("{key}.{ENTRY_EXT}"))
    }

    /// Read the cached bytes for `key`, or `None` when no entry exists.
    /// Never triggers network activity.
    pub async fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
        let path = self.entry_path(key);
        match tokio::fs::read(&path).await {
            Ok(data) => {
                tracing::debug!(key, bytes = data.len(), "cache hit");
                Ok(Some(Bytes::from(data)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Cache(e)),
        }
    }

    /// Whether an entry exists for `key`.
    pub async fn contains(&self, key: &str) -> bool {
        tokio::fs::try_exists(self.entry_path(key)).await.unwrap_or(false)
    }

    /// Store `data` under `key`, creating intermediate directories as
    /// needed.
    ///
    /// The bytes land in a uniquely named `.part` file first and are renamed
    /// into place, so a cancelled write never leaves a truncated entry that
    /// looks valid. Overwriting an existing entry is idempotent in effect.
    pub async fn put(&self, key: &str, data: &[u8]) -> Result<(), Error> {
        tokio::fs::create_dir_all(&self.books_dir).await?;

        // Unique per concurrent writer, so racing puts for the same key
        // never interleave within one part file.
        static PART_SEQ: AtomicU64 = AtomicU64::new(0);
        let seq = PART_SEQ.fetch_add(1, Ordering::Relaxed);

        let final_path = self.entry_path(key);
        let part_path = self.books_dir.join(format!("{key}.{}-{seq}.part", std::process::id()));

        // Cleans up the part file if the write errors or this future is
        // dropped mid-write (caller cancellation).
        let mut guard = PartGuard { path: Some(part_path.clone()) };

        tokio::fs::write(&part_path, data).await?;
        tokio::fs::rename(&part_path, &final_path).await?;
        guard.disarm();

        tracing::debug!(key, bytes = data.len(), "cache write");
        Ok(())
    }

    /// Remove the entry for `key`, if present.
    pub async fn remove(&self, key: &str) -> Result<(), Error> {
        match tokio::fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Cache(e)),
        }
    }

    /// Remove every cached book. Returns the number of entries removed.
    pub async fn purge(&self) -> Result<u64, Error> {
        let mut removed = 0;
        let mut entries = match tokio::fs::read_dir(&self.books_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(Error::Cache(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }

        tracing::info!(removed, "cache purged");
        Ok(removed)
    }

    /// Count entries and total bytes. Stray `.part` files are not counted.
    pub async fn stats(&self) -> Result<CacheStats, Error> {
        let mut stats = CacheStats { entries: 0, total_bytes: 0 };
        let mut entries = match tokio::fs::read_dir(&self.books_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(stats),
            Err(e) => return Err(Error::Cache(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXT) {
                continue;
            }
            let meta = entry.metadata().await?;
            if meta.is_file() {
                stats.entries += 1;
                stats.total_bytes += meta.len();
            }
        }

        Ok(stats)
    }
}

/// Removes the part file on drop unless the write completed.
struct PartGuard {
    path: Option<PathBuf>,
}

impl PartGuard {
    fn disarm(&mut self) {
        self.path = None;
    }
}

impl Drop for PartGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}
