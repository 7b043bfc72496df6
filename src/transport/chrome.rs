//! Chromium-backed browser session

use crate::config::BrowserSettings;
use crate::model::{SelectorKind, SelectorSpec};
use crate::transport::{BrowserSession, Interaction};
use crate::TransportError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures_util::stream::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct ChromeSession {
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
}

impl ChromeSession {
    /// Launches Chromium and opens a blank page
    ///
    /// # Arguments
    ///
    /// * `settings` - Headless mode, executable path and timeouts
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, TransportError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(Duration::from_millis(settings.wait_timeout_ms.max(1_000)));
        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &settings.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(TransportError::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(browser_error)?;

        // Drive CDP events until the browser goes away
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(browser_error)?;

        info!(
            "Launched {} browser session",
            if settings.headless { "headless" } else { "headed" }
        );

        Ok(Self {
            browser: Some(browser),
            page: Some(page),
            handler: Some(handler),
        })
    }

    fn page(&self) -> Result<&Page, TransportError> {
        self.page
            .as_ref()
            .ok_or_else(|| TransportError::Browser("browser session is closed".to_string()))
    }

    async fn elements(&self, selector: &SelectorSpec) -> Result<Vec<Element>, TransportError> {
        let page = self.page()?;
        let found = match selector.kind {
            SelectorKind::Xpath => page.find_xpaths(selector.locator.as_str()).await,
            _ => page.find_elements(selector.to_css()?).await,
        };
        found.map_err(browser_error)
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), TransportError> {
        debug!("Navigating to {}", url);
        self.page()?.goto(url).await.map_err(browser_error)?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, TransportError> {
        self.page()?
            .url()
            .await
            .map_err(browser_error)?
            .ok_or_else(|| TransportError::Browser("page has no URL".to_string()))
    }

    async fn page_source(&mut self) -> Result<String, TransportError> {
        self.page()?.content().await.map_err(browser_error)
    }

    async fn locate_elements(&mut self, selector: &SelectorSpec) -> Result<usize, TransportError> {
        Ok(self.elements(selector).await?.len())
    }

    async fn interact(
        &mut self,
        selector: &SelectorSpec,
        index: usize,
        interaction: Interaction,
    ) -> Result<(), TransportError> {
        let mut elements = self.elements(selector).await?;
        if index >= elements.len() {
            return Err(TransportError::ElementNotFound(format!(
                "{} #{} ({} matches)",
                selector,
                index,
                elements.len()
            )));
        }
        let element = elements.swap_remove(index);

        match interaction {
            Interaction::Click => {
                element.click().await.map_err(browser_error)?;
                self.page()?
                    .wait_for_navigation()
                    .await
                    .map_err(browser_error)?;
            }
            Interaction::Type(text) => {
                element.focus().await.map_err(browser_error)?;
                element.type_str(text).await.map_err(browser_error)?;
            }
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.page = None;
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let closed = browser.close().await.map_err(browser_error);
        if let Err(e) = browser.wait().await {
            warn!("Browser process did not exit cleanly: {}", e);
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        info!("Browser session closed");
        closed.map(|_| ())
    }
}

fn browser_error(error: chromiumoxide::error::CdpError) -> TransportError {
    TransportError::Browser(error.to_string())
}
