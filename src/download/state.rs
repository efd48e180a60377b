//! Download state tracking.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::download::fetch::FetchOutcome;
use crate::media::MediumKind;

/// Counters shared by all workers during a run.
#[derive(Debug, Default)]
pub struct DownloadState {
    pic_count: AtomicU64,
    vid_count: AtomicU64,
    skipped_count: AtomicU64,
    incomplete_count: AtomicU64,
    failed_count: AtomicU64,
    unresolved_count: AtomicU64,
}

impl DownloadState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the terminal outcome of one fetch.
    pub fn record(&self, kind: MediumKind, outcome: &FetchOutcome) {
        let counter = match (outcome, kind) {
            (FetchOutcome::Completed, MediumKind::Photo) => &self.pic_count,
            (FetchOutcome::Completed, MediumKind::Video) => &self.vid_count,
            (FetchOutcome::Skipped, _) => &self.skipped_count,
            (FetchOutcome::Incomplete, _) => &self.incomplete_count,
            (FetchOutcome::Failed(_), _) => &self.failed_count,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a task whose medium URL could not be resolved.
    pub fn increment_unresolved(&self) {
        self.unresolved_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a task that failed before any request was made.
    pub fn increment_failed(&self) {
        self.failed_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a consistent copy of the counters.
    pub fn snapshot(&self) -> RunStats {
        RunStats {
            pic_count: self.pic_count.load(Ordering::Relaxed),
            vid_count: self.vid_count.load(Ordering::Relaxed),
            skipped_count: self.skipped_count.load(Ordering::Relaxed),
            incomplete_count: self.incomplete_count.load(Ordering::Relaxed),
            failed_count: self.failed_count.load(Ordering::Relaxed),
            unresolved_count: self.unresolved_count.load(Ordering::Relaxed),
            ..Default::default()
        }
    }
}

/// Tasks enqueued for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountStats {
    pub account: String,
    pub photo_tasks: u64,
    pub video_tasks: u64,
    pub available: bool,
}

impl AccountStats {
    pub fn new(account: &str) -> Self {
        Self {
            account: account.to_string(),
            ..Default::default()
        }
    }

    pub fn add_tasks(&mut self, kind: MediumKind, count: u64) {
        match kind {
            MediumKind::Photo => self.photo_tasks += count,
            MediumKind::Video => self.video_tasks += count,
        }
    }

    pub fn total_tasks(&self) -> u64 {
        self.photo_tasks + self.video_tasks
    }
}

/// Statistics for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub pic_count: u64,
    pub vid_count: u64,
    pub skipped_count: u64,
    pub incomplete_count: u64,
    pub failed_count: u64,
    pub unresolved_count: u64,
    pub accounts: Vec<AccountStats>,
}

impl RunStats {
    /// Get total downloaded count.
    pub fn total_downloaded(&self) -> u64 {
        self.pic_count + self.vid_count
    }

    /// Tasks that reached any terminal state.
    pub fn total_processed(&self) -> u64 {
        self.total_downloaded()
            + self.skipped_count
            + self.incomplete_count
            + self.failed_count
            + self.unresolved_count
    }

    /// Tasks enqueued over all accounts.
    pub fn total_enqueued(&self) -> u64 {
        self.accounts.iter().map(AccountStats::total_tasks).sum()
    }
}
