//! folio command-line entry point.
//!
//! Thin consumer surface over the book pipeline: open a book by URL and
//! print the rendered document, or manage the on-disk cache. Logging goes
//! to stderr so document output on stdout stays clean.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use folio_client::{BookPipeline, BookRef, RenderMode};
use folio_core::{AppConfig, BookCache};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio", about = "Fetch, cache, and render EPUB books", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download (or reuse from cache) a book and render it.
    Open {
        /// Absolute http(s) URL of the book archive.
        url: String,

        /// Render as plain text instead of HTML.
        #[arg(long)]
        text: bool,

        /// Print a JSON summary instead of the document body.
        #[arg(long)]
        json: bool,

        /// Write the rendered document to a file instead of stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Inspect or clear the book cache.
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand)]
enum CacheCommand {
    /// Show entry count and total size.
    Info,
    /// Remove the cached copy of one book.
    Remove {
        /// Absolute http(s) URL of the book archive.
        url: String,
    },
    /// Remove every cached book.
    Purge,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command {
        Command::Open { url, text, json, output } => {
            let pipeline = BookPipeline::new(&config)?;
            let mode = if text { RenderMode::PlainText } else { RenderMode::Html };
            let book = pipeline.load_book_with(&url, mode).await?;

            tracing::info!(
                title = %book.title,
                chapters = book.chapters,
                from_cache = book.from_cache,
                fetch_ms = book.fetch_ms,
                "book loaded"
            );

            if json {
                let summary = serde_json::json!({
                    "title": book.title,
                    "chapters": book.chapters,
                    "from_cache": book.from_cache,
                    "fetch_ms": book.fetch_ms,
                    "bytes": book.document.content.len(),
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else if let Some(path) = output {
                std::fs::write(&path, &book.document.content)?;
                eprintln!("wrote {} to {}", book.title, path.display());
            } else {
                println!("{}", book.document.content);
            }
        }
        Command::Cache { command } => {
            let cache = BookCache::new(&config.cache_dir);
            match command {
                CacheCommand::Info => {
                    let stats = cache.stats().await?;
                    println!("{} book(s), {} bytes", stats.entries, stats.total_bytes);
                }
                CacheCommand::Remove { url } => {
                    let book = BookRef::parse(&url)?;
                    if cache.contains(book.cache_key()).await {
                        cache.remove(book.cache_key()).await?;
                        println!("removed cached copy of {url}");
                    } else {
                        println!("no cache entry for {url}");
                    }
                }
                CacheCommand::Purge => {
                    let removed = cache.purge().await?;
                    println!("removed {removed} entries");
                }
            }
        }
    }

    Ok(())
}
