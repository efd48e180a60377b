//! Configuration validation logic.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Blog names are subdomains: letters, digits and hyphens.
static ACCOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9-]{1,64}$").unwrap());

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_accounts(&config.sites.accounts)?;
    validate_options(config)?;
    Ok(())
}

/// Validate account names.
pub fn validate_accounts<S: AsRef<str>, I: IntoIterator<Item = S>>(accounts: I) -> Result<()> {
    let accounts: Vec<_> = accounts.into_iter().collect();

    if accounts.is_empty() {
        return Err(Error::MissingConfig(
            "sites (at least one account name required)".to_string(),
        ));
    }

    for account in accounts {
        let account = account.as_ref();

        if !ACCOUNT_PATTERN.is_match(account) {
            return Err(Error::ConfigValidation {
                field: "sites".to_string(),
                message: format!(
                    "Account '{}' is not a valid blog name. Only letters, digits and hyphens are allowed.",
                    account
                ),
            });
        }
    }

    Ok(())
}

fn validate_options(config: &Config) -> Result<()> {
    let options = &config.options;

    let positive = [
        ("workers", options.workers as u64),
        ("retries", options.retries as u64),
        ("photo_page_size", options.photo_page_size as u64),
        ("video_page_size", options.video_page_size as u64),
        ("max_offset", options.max_offset as u64),
        ("timeout_seconds", options.timeout_seconds),
    ];

    for (field, value) in positive {
        if value == 0 {
            return Err(Error::ConfigValidation {
                field: field.to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
    }

    for (field, value) in [
        ("feed_url", &config.endpoints.feed_url),
        ("video_host", &config.endpoints.video_host),
    ] {
        url::Url::parse(&value.replace("{account}", "account")).map_err(|e| {
            Error::ConfigValidation {
                field: field.to_string(),
                message: format!("'{}' is not a valid URL: {}", value, e),
            }
        })?;
    }

    Ok(())
}
