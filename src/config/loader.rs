//! Configuration structures and loading logic.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::proxy::ProxyConfig;
use crate::error::{Error, Result};
use crate::media::MediumKind;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sites: SitesConfig,

    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Proxies loaded from the separate proxy file.
    #[serde(skip)]
    pub proxies: Option<ProxyConfig>,
}

/// Accounts to download from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SitesConfig {
    /// Blog names, in processing order.
    #[serde(default)]
    pub accounts: Vec<String>,
}

/// Download tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Base directory for downloads. Each account gets its own folder below it.
    #[serde(default)]
    pub download_directory: Option<PathBuf>,

    /// Connect and read timeout for every request.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Attempts per feed page and per medium.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Offset the feed is read from.
    #[serde(default)]
    pub start: u32,

    /// Photo posts requested per page.
    #[serde(default = "default_page_size")]
    pub photo_page_size: u32,

    /// Video posts requested per page.
    #[serde(default = "default_page_size")]
    pub video_page_size: u32,

    /// Pagination stops once the offset reaches this value.
    #[serde(default = "default_max_offset")]
    pub max_offset: u32,

    /// Number of concurrent download workers.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Retries of a page that cannot be decoded or parsed.
    #[serde(default = "default_max_page_retries")]
    pub max_page_retries: u32,

    /// Delay between feed request attempts.
    #[serde(default = "default_page_retry_delay")]
    pub page_retry_delay_ms: u64,

    /// Whether to show download progress.
    #[serde(default = "default_true")]
    pub show_downloads: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            download_directory: None,
            timeout_seconds: default_timeout(),
            retries: default_retries(),
            start: 0,
            photo_page_size: default_page_size(),
            video_page_size: default_page_size(),
            max_offset: default_max_offset(),
            workers: default_workers(),
            max_page_retries: default_max_page_retries(),
            page_retry_delay_ms: default_page_retry_delay(),
            show_downloads: true,
        }
    }
}

impl OptionsConfig {
    /// Page size used for the given kind.
    pub fn page_size(&self, kind: MediumKind) -> u32 {
        match kind {
            MediumKind::Photo => self.photo_page_size,
            MediumKind::Video => self.video_page_size,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn page_retry_delay(&self) -> Duration {
        Duration::from_millis(self.page_retry_delay_ms)
    }
}

/// Remote endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Feed URL template; `{account}` is replaced with the blog name.
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Host videos are fetched from.
    #[serde(default = "default_video_host")]
    pub video_host: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            video_host: default_video_host(),
        }
    }
}

impl EndpointsConfig {
    /// Build the URL of one feed page.
    pub fn page_url(&self, account: &str, kind: MediumKind, num: u32, start: u32) -> String {
        format!(
            "{}?type={}&num={}&start={}",
            self.feed_url.replace("{account}", account),
            kind,
            num,
            start
        )
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    5
}

fn default_page_size() -> u32 {
    50
}

fn default_max_offset() -> u32 {
    50
}

fn default_workers() -> usize {
    10
}

fn default_max_page_retries() -> u32 {
    3
}

fn default_page_retry_delay() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_feed_url() -> String {
    "https://{account}.tumblr.com/api/read".to_string()
}

fn default_video_host() -> String {
    "https://vt.tumblr.com".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the configuration file if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No configuration file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.options
            .download_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
