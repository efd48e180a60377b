//! Error types for the tumblr-ripper application.

use thiserror::Error;

use crate::media::MediumKind;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("Invalid proxy configuration: {0}")]
    ProxyConfig(String),

    // Feed errors
    #[error("Site {0} does not exist")]
    FeedUnavailable(String),

    #[error("Feed has no more posts")]
    FeedExhausted,

    #[error("Cannot decode feed page: {0}")]
    FeedDecode(String),

    #[error("Malformed feed page: {0}")]
    MalformedFeed(String),

    // Media errors
    #[error("Unable to find the right {kind} url for downloading: {post}")]
    UnresolvedMedium { kind: MediumKind, post: String },

    // Download errors
    #[error("Access denied when retrieving {0}")]
    AccessDenied(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Task queue is closed")]
    QueueClosed,

    // File system errors
    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error should be reported as a configuration problem at startup.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::ProxyConfig(_)
                | Error::TomlParse(_)
        )
    }
}

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const CONFIG_ERROR: i32 = 3;
    pub const UNEXPECTED_ERROR: i32 = 5;
}
