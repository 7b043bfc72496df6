use crate::crawler::{scrape_with_requests, CrawlReport};
use crate::medium::shared::MediumCore;
use crate::medium::{MediumConfig, MediumKind};
use crate::model::{IndexCrawlRequest, LoginSpec};
use crate::transport::HttpTransport;
use crate::{MediumError, Result};

/// Delivery medium over HTTP requests, direct or relayed
pub struct RequestMedium {
    core: MediumCore,
    transport: HttpTransport,
}

impl RequestMedium {
    pub(crate) fn new(kind: MediumKind, transport: HttpTransport, config: MediumConfig) -> Self {
        Self {
            core: MediumCore::new(kind, config),
            transport,
        }
    }

    pub(crate) fn core(&self) -> &MediumCore {
        &self.core
    }

    pub(crate) fn core_mut(&mut self) -> &mut MediumCore {
        &mut self.core
    }

    /// Sends the login request; its cookies authenticate every later request
    pub async fn login(&mut self, login: &LoginSpec) -> Result<()> {
        self.core.ensure_alive()?;
        let form = match login {
            LoginSpec::Form(form) => form,
            other => {
                return Err(MediumError::LoginSpecMismatch {
                    medium: self.core.kind,
                    login: other.shape(),
                })
            }
        };

        self.transport.authenticate(form).await?;
        self.core.mark_logged_in();
        Ok(())
    }

    pub async fn scrape_index_pages(&mut self, request: &IndexCrawlRequest) -> Result<CrawlReport> {
        let pagination = self.core.prepare(request)?;
        let consumer = self.core.consumer.clone();

        scrape_with_requests(
            &mut self.transport,
            &mut self.core.buffer,
            consumer.as_ref(),
            &pagination,
            request,
        )
        .await
    }

    /// Flushes leftovers; there is nothing else to release for HTTP
    pub async fn destroy(&mut self) -> Result<()> {
        match self.core.begin_destroy() {
            Some(flushed) => {
                tracing::debug!("Destroyed {} medium", self.core.kind);
                Ok(flushed?)
            }
            None => Ok(()),
        }
    }
}
