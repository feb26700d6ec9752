//! On-disk cache for downloaded book archives.
//!
//! This module provides a persistent, write-through byte cache backed by
//! plain files. It supports:
//!
//! - Content-addressed storage using SHA-256 of the full canonical URL
//! - Atomic writes (temp name + rename), so a cancelled or crashed write
//!   never leaves a valid-looking entry
//! - Concurrent use by independent pipeline tasks
//! - Manual purge and stats (no automatic eviction)

pub mod hash;
pub mod store;

pub use crate::Error;

pub use hash::cache_key;
pub use store::{BookCache, CacheStats};
