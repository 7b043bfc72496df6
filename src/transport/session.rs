//! Driven browser session capability
//!
//! The session engine only talks to this trait. Elements are addressed by selector and
//! their position among the current matches, since element handles do not survive a
//! navigation.

use crate::model::SelectorSpec;
use crate::TransportError;
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Interval between element polls while waiting
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What to do with a located element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    /// Click and let any resulting navigation settle
    Click,

    /// Focus and type text
    Type(String),
}

#[async_trait]
pub trait BrowserSession: Send {
    /// Loads `url` and waits for the navigation to complete
    async fn navigate(&mut self, url: &str) -> Result<(), TransportError>;

    async fn current_url(&mut self) -> Result<String, TransportError>;

    /// Serialized DOM of the current page
    async fn page_source(&mut self) -> Result<String, TransportError>;

    /// Number of elements currently matching `selector`
    async fn locate_elements(&mut self, selector: &SelectorSpec) -> Result<usize, TransportError>;

    /// Waits until `selector` matches at least one element
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - An element appeared within `timeout`
    /// * `Ok(false)` - The timeout elapsed first
    async fn wait_for(
        &mut self,
        selector: &SelectorSpec,
        timeout: Duration,
    ) -> Result<bool, TransportError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.locate_elements(selector).await? > 0 {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Performs `interaction` on the `index`-th match of `selector`
    async fn interact(
        &mut self,
        selector: &SelectorSpec,
        index: usize,
        interaction: Interaction,
    ) -> Result<(), TransportError>;

    /// Releases the browser; calling it again is a no-op
    async fn close(&mut self) -> Result<(), TransportError>;
}
