//! Progress bar utilities.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Minimum file size to show progress bar (20 MB).
pub const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Progress bars for concurrent downloads, stacked under one display.
#[derive(Debug, Clone)]
pub struct DownloadProgress {
    multi: MultiProgress,
    threshold: u64,
}

impl Default for DownloadProgress {
    fn default() -> Self {
        Self::new(PROGRESS_THRESHOLD)
    }
}

impl DownloadProgress {
    pub fn new(threshold: u64) -> Self {
        Self {
            multi: MultiProgress::new(),
            threshold,
        }
    }

    /// Create a bar for a download, or `None` if it is too small to bother.
    pub fn download_bar(&self, total: Option<u64>, position: u64, label: &str) -> Option<ProgressBar> {
        let total = total.filter(|&t| t > self.threshold)?;
        let bar = self.multi.add(create_download_bar(total));
        bar.set_message(label.to_string());
        bar.set_position(position);
        Some(bar)
    }
}

/// Create a progress bar for downloads.
pub fn create_download_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );
    bar
}
