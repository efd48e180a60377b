//! Tumblr Ripper - bulk photo and video downloader for Tumblr blogs.
//!
//! This library walks the paginated `/api/read` feed of each configured
//! blog and downloads every photo and video it finds into a per-blog folder.
//!
//! # Features
//!
//! - Paginated feed scheduling, videos before photos
//! - Photoset expansion into one download per photo
//! - Video URL resolution from embedded player markup
//! - Range-resumable video downloads
//! - Fixed-size concurrent worker pool
//! - Optional HTTP/HTTPS proxy
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use tumblr_ripper::{Config, Scheduler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::load_or_default(Path::new("tumblr-ripper.toml"))?;
//!     config.sites.accounts = vec!["staff".to_string()];
//!
//!     let stats = Scheduler::new(config)?.run().await?;
//!     println!("{} files downloaded", stats.total_downloaded());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;

// Re-exports for convenience
pub use api::TumblrApi;
pub use config::{Config, ProxyConfig};
pub use download::{AccountStats, FetchOutcome, Fetcher, RunStats, Scheduler, TaskQueue, WorkerPool};
pub use error::{Error, Result};
pub use media::{MediumKind, Post, Task};
