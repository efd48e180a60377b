//! Configuration module for the tumblr-ripper.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Account list and proxy file parsing
//! - Configuration validation

pub mod loader;
pub mod proxy;
pub mod sites;
pub mod validation;

pub use loader::{Config, EndpointsConfig, OptionsConfig, SitesConfig};
pub use proxy::ProxyConfig;
pub use sites::{load_sites_file, parse_sites};
pub use validation::{validate_accounts, validate_config};
