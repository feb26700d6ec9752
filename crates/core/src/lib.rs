//! Core types and shared functionality for folio.
//!
//! This crate provides:
//! - On-disk book cache with atomic writes
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{BookCache, CacheStats};
pub use config::AppConfig;
pub use error::Error;
