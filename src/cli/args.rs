//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{parse_sites, Config};

/// Tumblr bulk downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "tumblr-ripper",
    version,
    about = "Download photos and videos from Tumblr blogs",
    long_about = "A CLI tool to download every photo and video posted on one or more Tumblr blogs.\n\n\
                  Each blog gets its own folder. Interrupted video downloads resume on the next run."
)]
pub struct Args {
    /// Blog names, separated by commas.
    /// Falls back to the configuration file, then to the sites file.
    pub sites: Option<String>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "tumblr-ripper.toml")]
    pub config: PathBuf,

    /// File listing blog names, separated by commas or whitespace.
    #[arg(short = 's', long = "sites-file", default_value = "sites.txt")]
    pub sites_file: PathBuf,

    /// JSON file with "http" and "https" proxy addresses.
    #[arg(short, long, default_value = "proxies.json")]
    pub proxies: PathBuf,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory", env = "TUMBLR_RIPPER_DIR")]
    pub download_directory: Option<PathBuf>,

    /// Number of concurrent download workers.
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Attempts per feed page and per medium.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Connect and read timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Hide download progress bars.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Accounts given on the command line, if any.
    pub fn site_list(&self) -> Option<Vec<String>> {
        self.sites
            .as_deref()
            .map(parse_sites)
            .filter(|sites| !sites.is_empty())
    }

    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(sites) = self.site_list() {
            config.sites.accounts = sites;
        }

        if let Some(dir) = &self.download_directory {
            config.options.download_directory = Some(dir.clone());
        }

        if let Some(workers) = self.workers {
            config.options.workers = workers;
        }

        if let Some(retries) = self.retries {
            config.options.retries = retries;
        }

        if let Some(timeout) = self.timeout {
            config.options.timeout_seconds = timeout;
        }

        if self.quiet {
            config.options.show_downloads = false;
        }
    }
}
