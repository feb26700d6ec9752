//! Client code for folio.
//!
//! This crate provides the book content pipeline: HTTP fetch with
//! write-through caching, temp-file materialization, EPUB reading-order
//! extraction, and render adaptation. The consumer boundary is
//! [`BookPipeline::load_book`].

pub mod archive;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod render;

pub use archive::{Publication, TempArchive, materialize};
pub use extract::{ExtractOptions, ExtractedContent, extract};
pub use fetch::{BookRef, FetchConfig, Fetched, Fetcher, HttpTransport, Transport, TransportResponse};
pub use pipeline::{BookPipeline, RenderedBook};
pub use render::{RenderMode, RenderableDocument, present};
