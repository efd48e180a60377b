//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Progress bars
//! - Statistics reporting

pub mod console;
pub mod progress;
pub mod stats;

pub use self::console::{
    print_banner, print_config_summary, print_error, print_info, print_usage, print_warning,
};
pub use progress::{create_download_bar, DownloadProgress};
pub use stats::{print_account_stats, print_run_stats};
