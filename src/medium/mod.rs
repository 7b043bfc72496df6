//! Delivery medium facade
//!
//! A delivery medium owns a transport, a result buffer and a consumer, and exposes the
//! same four operations whatever it crawls over:
//! - `login`: one authentication exchange
//! - `scrape_index_pages`: one traversal across index pages
//! - `set_data_path`: redirect future batches
//! - `destroy`: flush leftovers and release the transport
//!
//! # Example
//!
//! ```no_run
//! use listing_courier::{DeliveryMedium, IndexCrawlRequest, LoginSpec, MediumConfig, SelectorSpec};
//! use listing_courier::model::{FormLogin, HttpMethod, PaginationType, RequestOptions};
//!
//! # async fn example() -> listing_courier::Result<()> {
//! let config = MediumConfig::new(PaginationType::Url)
//!     .url_template("https://listings.example/page/{PAGE_PARAMETER}")
//!     .flush_after(20);
//! let mut medium = DeliveryMedium::create("direct-request", config).await?;
//!
//! medium
//!     .login(&LoginSpec::Form(FormLogin {
//!         url: "https://listings.example/login".to_string(),
//!         options: RequestOptions::default().with_form_field("user", "me"),
//!         method: HttpMethod::Post,
//!     }))
//!     .await?;
//!
//! let request = IndexCrawlRequest::new(
//!     "https://listings.example/page/1",
//!     SelectorSpec::css(".listing"),
//! )
//! .stop_after(5);
//! let report = medium.scrape_index_pages(&request).await?;
//! println!("{} artifacts ({})", report.artifacts_collected, report.termination);
//!
//! medium.destroy().await?;
//! # Ok(())
//! # }
//! ```

mod kind;
mod request;
mod session;
mod shared;

pub use kind::MediumKind;
pub use request::RequestMedium;
pub use session::SessionMedium;

use crate::config::{
    default_data_path, default_relay_proxy, default_request_timeout_secs, default_user_agent,
    validate_browser, validate_flush_after, validate_pagination, validate_relay, BrowserSettings,
    MediumSettings,
};
use crate::crawler::{Consumer, CrawlReport, PassThrough};
use crate::model::{IndexCrawlRequest, LoginSpec, PaginationType};
use crate::storage::BatchSink;
use crate::transport::{BrowserSession, ChromeSession, HttpTransport};
use crate::{ConfigError, Result};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Construction parameters for a delivery medium
pub struct MediumConfig {
    pub pagination_type: PaginationType,

    /// Required for `URL` pagination; must contain `{PAGE_PARAMETER}`
    pub pagination_url_template: Option<String>,

    /// Buffer capacity; `None` writes a single batch when the crawl ends
    pub flush_after: Option<usize>,

    /// Target directory of the default JSON sink
    pub data_path: PathBuf,

    pub request_timeout: Duration,
    pub user_agent: String,

    /// Proxy URL used by the anonymized medium
    pub relay: String,

    pub browser: BrowserSettings,
    pub consumer: Arc<dyn Consumer>,

    /// Replaces the JSON directory sink
    pub sink: Option<Box<dyn BatchSink>>,
}

impl MediumConfig {
    pub fn new(pagination_type: PaginationType) -> Self {
        Self {
            pagination_type,
            pagination_url_template: None,
            flush_after: None,
            data_path: default_data_path(),
            request_timeout: Duration::from_secs(default_request_timeout_secs()),
            user_agent: default_user_agent(),
            relay: default_relay_proxy(),
            browser: BrowserSettings::default(),
            consumer: Arc::new(PassThrough),
            sink: None,
        }
    }

    /// Builds a medium configuration from the `[medium]` table of a config file
    pub fn from_settings(settings: &MediumSettings) -> Self {
        Self {
            pagination_type: settings.pagination_type,
            pagination_url_template: settings.pagination_url_template.clone(),
            flush_after: settings.flush_after,
            data_path: settings.data_path.clone(),
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
            user_agent: settings.user_agent.clone(),
            relay: settings.relay.proxy.clone(),
            browser: settings.browser.clone(),
            consumer: Arc::new(PassThrough),
            sink: None,
        }
    }

    pub fn url_template(mut self, template: impl Into<String>) -> Self {
        self.pagination_url_template = Some(template.into());
        self
    }

    pub fn flush_after(mut self, capacity: usize) -> Self {
        self.flush_after = Some(capacity);
        self
    }

    pub fn data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn relay(mut self, proxy: impl Into<String>) -> Self {
        self.relay = proxy.into();
        self
    }

    pub fn browser(mut self, browser: BrowserSettings) -> Self {
        self.browser = browser;
        self
    }

    pub fn consumer(mut self, consumer: impl Consumer + 'static) -> Self {
        self.consumer = Arc::new(consumer);
        self
    }

    pub fn sink(mut self, sink: impl BatchSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Validates the parts every medium depends on, plus the kind-specific ones
    pub fn validate(&self, kind: MediumKind) -> std::result::Result<(), ConfigError> {
        validate_pagination(self.pagination_type, self.pagination_url_template.as_deref())?;
        validate_flush_after(self.flush_after)?;
        match kind {
            MediumKind::DirectRequest => Ok(()),
            MediumKind::AnonymizedRequest => validate_relay(&self.relay),
            MediumKind::DrivenSession => validate_browser(&self.browser),
        }
    }
}

impl fmt::Debug for MediumConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediumConfig")
            .field("pagination_type", &self.pagination_type)
            .field("pagination_url_template", &self.pagination_url_template)
            .field("flush_after", &self.flush_after)
            .field("data_path", &self.data_path)
            .field("request_timeout", &self.request_timeout)
            .field("relay", &self.relay)
            .field("browser", &self.browser)
            .field("custom_sink", &self.sink.is_some())
            .finish()
    }
}

/// A delivery medium, one variant per substrate
pub enum DeliveryMedium {
    DirectRequest(RequestMedium),
    AnonymizedRequest(RequestMedium),
    DrivenSession(SessionMedium),
}

impl DeliveryMedium {
    /// Creates a medium from its name
    ///
    /// # Arguments
    ///
    /// * `kind` - `direct-request`, `anonymized-request`, `driven-session`, or one of the
    ///   aliases `request`, `torrequest`, `selenium` (case-insensitive)
    /// * `config` - Medium configuration
    ///
    /// # Returns
    ///
    /// * `Ok(DeliveryMedium)` - Transport ready, not logged in
    /// * `Err(MediumError)` - Unknown kind, invalid configuration, or the transport could
    ///   not be started
    pub async fn create(kind: &str, config: MediumConfig) -> Result<Self> {
        let kind: MediumKind = kind.parse()?;
        Self::with_kind(kind, config).await
    }

    pub async fn with_kind(kind: MediumKind, config: MediumConfig) -> Result<Self> {
        config.validate(kind)?;
        tracing::info!("Creating {} medium", kind);

        let medium = match kind {
            MediumKind::DirectRequest => {
                let transport = HttpTransport::direct(config.request_timeout, &config.user_agent)?;
                Self::DirectRequest(RequestMedium::new(kind, transport, config))
            }
            MediumKind::AnonymizedRequest => {
                let transport = HttpTransport::anonymized(
                    config.request_timeout,
                    &config.user_agent,
                    &config.relay,
                )?;
                Self::AnonymizedRequest(RequestMedium::new(kind, transport, config))
            }
            MediumKind::DrivenSession => {
                let session = ChromeSession::launch(&config.browser).await?;
                Self::DrivenSession(SessionMedium::new(Box::new(session), config))
            }
        };
        Ok(medium)
    }

    /// Creates a driven-session medium over an already running browser session
    pub fn with_browser_session(
        config: MediumConfig,
        session: Box<dyn BrowserSession>,
    ) -> Result<Self> {
        config.validate(MediumKind::DrivenSession)?;
        Ok(Self::DrivenSession(SessionMedium::new(session, config)))
    }

    pub fn kind(&self) -> MediumKind {
        match self {
            Self::DirectRequest(_) => MediumKind::DirectRequest,
            Self::AnonymizedRequest(_) => MediumKind::AnonymizedRequest,
            Self::DrivenSession(_) => MediumKind::DrivenSession,
        }
    }

    /// Authenticates the transport
    ///
    /// The HTTP mediums take a `LoginSpec::Form`, the session medium a
    /// `LoginSpec::Credentials`.
    pub async fn login(&mut self, login: &LoginSpec) -> Result<()> {
        match self {
            Self::DirectRequest(medium) | Self::AnonymizedRequest(medium) => {
                medium.login(login).await
            }
            Self::DrivenSession(medium) => medium.login(login).await,
        }
    }

    /// Walks the index pages described by `request`
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - For every way a crawl can end, including transport and link
    ///   failures; the buffer has been flushed
    /// * `Err(MediumError)` - Not logged in, destroyed, invalid selectors or pagination,
    ///   or the final flush failed
    pub async fn scrape_index_pages(&mut self, request: &IndexCrawlRequest) -> Result<CrawlReport> {
        match self {
            Self::DirectRequest(medium) | Self::AnonymizedRequest(medium) => {
                medium.scrape_index_pages(request).await
            }
            Self::DrivenSession(medium) => medium.scrape_index_pages(request).await,
        }
    }

    /// Redirects future batches; batches already written stay where they are
    pub fn set_data_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        tracing::debug!("Data path set to {}", path.display());
        match self {
            Self::DirectRequest(medium) | Self::AnonymizedRequest(medium) => {
                medium.core_mut().set_data_path(path)
            }
            Self::DrivenSession(medium) => medium.core_mut().set_data_path(path),
        }
    }

    /// Replaces the consumer applied to detail pages
    pub fn set_consumer(&mut self, consumer: impl Consumer + 'static) {
        let consumer: Arc<dyn Consumer> = Arc::new(consumer);
        match self {
            Self::DirectRequest(medium) | Self::AnonymizedRequest(medium) => {
                medium.core_mut().consumer = consumer
            }
            Self::DrivenSession(medium) => medium.core_mut().consumer = consumer,
        }
    }

    /// Number of artifacts waiting for a flush
    pub fn buffered(&self) -> usize {
        match self {
            Self::DirectRequest(medium) | Self::AnonymizedRequest(medium) => {
                medium.core().buffer.len()
            }
            Self::DrivenSession(medium) => medium.core().buffer.len(),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        match self {
            Self::DirectRequest(medium) | Self::AnonymizedRequest(medium) => {
                medium.core().is_logged_in()
            }
            Self::DrivenSession(medium) => medium.core().is_logged_in(),
        }
    }

    /// Flushes leftovers and releases the transport; later calls do nothing
    pub async fn destroy(&mut self) -> Result<()> {
        match self {
            Self::DirectRequest(medium) | Self::AnonymizedRequest(medium) => {
                medium.destroy().await
            }
            Self::DrivenSession(medium) => medium.destroy().await,
        }
    }
}

impl fmt::Debug for DeliveryMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryMedium")
            .field("kind", &self.kind())
            .field("logged_in", &self.is_logged_in())
            .field("buffered", &self.buffered())
            .finish()
    }
}
