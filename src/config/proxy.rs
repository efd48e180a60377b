//! Proxy configuration.
//!
//! The proxy file is a JSON object mapping a URL scheme to a proxy URL:
//!
//! ```json
//! { "http": "http://127.0.0.1:1080", "https": "http://127.0.0.1:1080" }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Per-scheme proxy URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl ProxyConfig {
    /// Parse proxy settings from JSON text.
    ///
    /// Returns `Ok(None)` for an empty object.
    pub fn parse(content: &str) -> Result<Option<Self>> {
        let map: BTreeMap<String, String> = serde_json::from_str(content)
            .map_err(|e| Error::ProxyConfig(format!("Illegal JSON: {}", e)))?;

        let mut config = ProxyConfig::default();
        for (scheme, url) in map {
            reqwest::Proxy::all(&url)
                .map_err(|e| Error::ProxyConfig(format!("Invalid {} proxy '{}': {}", scheme, url, e)))?;

            match scheme.to_lowercase().as_str() {
                "http" => config.http = Some(url),
                "https" => config.https = Some(url),
                other => {
                    return Err(Error::ProxyConfig(format!(
                        "Unsupported proxy scheme '{}' (expected http or https)",
                        other
                    )))
                }
            }
        }

        if config.is_empty() {
            Ok(None)
        } else {
            Ok(Some(config))
        }
    }

    /// Load proxy settings from a file, if it exists.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }

    /// Build the reqwest proxies for these settings.
    pub fn to_proxies(&self) -> Result<Vec<reqwest::Proxy>> {
        let mut proxies = Vec::new();
        if let Some(url) = &self.http {
            proxies.push(
                reqwest::Proxy::http(url).map_err(|e| Error::ProxyConfig(e.to_string()))?,
            );
        }
        if let Some(url) = &self.https {
            proxies.push(
                reqwest::Proxy::https(url).map_err(|e| Error::ProxyConfig(e.to_string()))?,
            );
        }
        Ok(proxies)
    }
}
