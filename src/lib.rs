//! Listing-Courier: a paginated listing crawler
//!
//! This crate authenticates against a listing site, walks its index pages, follows every
//! listing to its detail page and persists what a consumer extracts from each detail page
//! in bounded JSON batches. The same traversal runs over plain HTTP requests, HTTP routed
//! through an anonymizing relay, or a driven Chromium session.

pub mod config;
pub mod crawler;
pub mod link;
pub mod medium;
pub mod model;
pub mod state;
pub mod storage;
pub mod transport;

use thiserror::Error;

/// Main error type for delivery medium operations
#[derive(Debug, Error)]
pub enum MediumError {
    #[error("Unsupported delivery medium: {0}")]
    UnsupportedMedium(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),

    #[error("Storage error: {0}")]
    Sink(#[from] storage::SinkError),

    #[error("login must complete before index pages can be scraped")]
    LoginRequired,

    #[error("{medium} medium cannot perform a {login} login")]
    LoginSpecMismatch {
        medium: medium::MediumKind,
        login: &'static str,
    },

    #[error("delivery medium has already been destroyed")]
    Destroyed,

    #[error("Final flush failed after crawl ended ({termination}): {source}")]
    Flush {
        termination: crawler::Termination,
        source: storage::SinkError,
    },
}

/// Failures below the traversal level: requests, navigation, element interaction
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("Redirect loop detected at {url}")]
    RedirectLoop { url: String },

    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),

    #[error("Invalid relay '{proxy}': {source}")]
    Relay {
        proxy: String,
        source: reqwest::Error,
    },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),
}

/// Errors that end a traversal early
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("No link found for {selector} on {page_url}: {reason}")]
    LinkNotFound {
        page_url: String,
        selector: String,
        #[source]
        reason: LinkError,
    },

    #[error("Storage error: {0}")]
    Sink(#[from] storage::SinkError),
}

/// Link extraction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("no element matched")]
    NoMatch,

    #[error("element is not an anchor and contains none")]
    NoAnchor,

    #[error("anchor has no href")]
    MissingHref,

    #[error("cannot resolve '{href}': {message}")]
    Unresolvable { href: String, message: String },
}

/// Selector conversion and compilation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("XPath selector '{0}' can only be evaluated by a driven browser session")]
    XPathUnsupported(String),

    #[error("Empty locator for {0} selector")]
    EmptyLocator(model::SelectorKind),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidCss { selector: String, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for delivery medium operations
pub type Result<T> = std::result::Result<T, MediumError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Consumer, CrawlReport, PassThrough, Termination};
pub use medium::{DeliveryMedium, MediumConfig, MediumKind};
pub use model::{IndexCrawlRequest, LoginSpec, PaginationSpec, SelectorKind, SelectorSpec};
