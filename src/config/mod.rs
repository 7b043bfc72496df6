//! Configuration module for Listing-Courier
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use listing_courier::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("courier.toml")).unwrap();
//! println!("Crawling with the {} medium", config.medium.kind);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserSettings, Config, MediumSettings, RelayConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};

pub(crate) use types::{
    default_data_path, default_relay_proxy, default_request_timeout_secs, default_user_agent,
};
pub(crate) use validation::{
    validate_browser, validate_flush_after, validate_pagination, validate_relay,
};
