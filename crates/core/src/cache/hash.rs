//! Content-addressed cache key generation.
//!
//! Keys are derived from the full canonical URL rather than its last path
//! segment, so two books that happen to share a filename on different hosts
//! never collide.

use sha2::{Digest, Sha256};

/// Compute the cache key for a book URL.
pub fn cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
