use crate::model::{IndexCrawlRequest, LoginSpec, PaginationType};
use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Listing-Courier
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub medium: MediumSettings,
    pub login: LoginSpec,
    pub crawl: IndexCrawlRequest,
}

/// Delivery medium configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MediumSettings {
    /// `direct-request`, `anonymized-request` or `driven-session`
    pub kind: String,

    /// How the next index page is found (`URL` or `NEXT`)
    #[serde(rename = "pagination-type")]
    pub pagination_type: PaginationType,

    /// Index URL template containing `{PAGE_PARAMETER}`; required for `URL`
    #[serde(rename = "pagination-url-template", default)]
    pub pagination_url_template: Option<String>,

    /// Number of artifacts buffered before a batch is written
    #[serde(rename = "flush-after", default)]
    pub flush_after: Option<usize>,

    /// Directory batch files are written to
    #[serde(rename = "data-path", default = "default_data_path")]
    pub data_path: PathBuf,

    /// Whole-request timeout for the HTTP mediums
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub browser: BrowserSettings,
}

/// Anonymizing relay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Proxy URL every request of the anonymized medium goes through
    #[serde(default = "default_relay_proxy")]
    pub proxy: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            proxy: default_relay_proxy(),
        }
    }
}

/// Driven browser configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Chromium binary; auto-detected when absent
    #[serde(default)]
    pub executable: Option<PathBuf>,

    /// How long to wait for listings and login fields to appear
    #[serde(rename = "wait-timeout-ms", default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            executable: None,
            wait_timeout_ms: default_wait_timeout_ms(),
        }
    }
}

pub(crate) fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    30
}

pub(crate) fn default_user_agent() -> String {
    format!("listing-courier/{}", env!("CARGO_PKG_VERSION"))
}

pub(crate) fn default_relay_proxy() -> String {
    "socks5h://127.0.0.1:9050".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_wait_timeout_ms() -> u64 {
    10_000
}
