//! Download module.
//!
//! This module provides:
//! - Feed pagination and scheduling
//! - The download worker pool
//! - Resumable medium fetching
//! - Run statistics

pub mod fetch;
pub mod scheduler;
pub mod state;
pub mod worker;

pub use fetch::{FailureReason, FetchOutcome, Fetcher};
pub use scheduler::{PageStop, Pagination, Scheduler};
pub use state::{AccountStats, DownloadState, RunStats};
pub use worker::{process_task, TaskQueue, WorkerContext, WorkerPool};
