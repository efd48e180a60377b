//! Tumblr API module.
//!
//! This module provides the HTTP client used for feed pages and media:
//! - Feed page requests with bounded retry
//! - Content-range size probes
//! - Plain and ranged medium requests

pub mod client;

pub use client::{parse_probe_content_range, TumblrApi};
