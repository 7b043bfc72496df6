use crate::crawler::{scrape_with_session, CrawlReport};
use crate::medium::shared::MediumCore;
use crate::medium::{MediumConfig, MediumKind};
use crate::model::{IndexCrawlRequest, LoginSpec, SessionLogin};
use crate::transport::{BrowserSession, Interaction};
use crate::{MediumError, Result, TransportError};
use std::time::Duration;

/// Delivery medium over a driven browser session
pub struct SessionMedium {
    core: MediumCore,
    session: Box<dyn BrowserSession>,
    wait_timeout: Duration,
}

impl SessionMedium {
    pub(crate) fn new(session: Box<dyn BrowserSession>, config: MediumConfig) -> Self {
        let wait_timeout = Duration::from_millis(config.browser.wait_timeout_ms);
        Self {
            core: MediumCore::new(MediumKind::DrivenSession, config),
            session,
            wait_timeout,
        }
    }

    pub(crate) fn core(&self) -> &MediumCore {
        &self.core
    }

    pub(crate) fn core_mut(&mut self) -> &mut MediumCore {
        &mut self.core
    }

    /// Opens the login page, types the credentials and submits
    pub async fn login(&mut self, login: &LoginSpec) -> Result<()> {
        self.core.ensure_alive()?;
        let login = match login {
            LoginSpec::Credentials(login) => login,
            other => {
                return Err(MediumError::LoginSpecMismatch {
                    medium: self.core.kind,
                    login: other.shape(),
                })
            }
        };

        self.fill_login_form(login).await?;
        self.core.mark_logged_in();
        Ok(())
    }

    async fn fill_login_form(&mut self, login: &SessionLogin) -> std::result::Result<(), TransportError> {
        tracing::info!("Logging in via browser at {}", login.url);
        self.session.navigate(&login.url).await?;

        let selectors = &login.selectors;
        if !self.session.wait_for(&selectors.user, self.wait_timeout).await? {
            return Err(TransportError::ElementNotFound(format!(
                "{} on {}",
                selectors.user, login.url
            )));
        }

        self.session
            .interact(
                &selectors.user,
                0,
                Interaction::Type(login.credentials.user.clone()),
            )
            .await?;
        self.session
            .interact(
                &selectors.password,
                0,
                Interaction::Type(login.credentials.password.clone()),
            )
            .await?;
        self.session
            .interact(&selectors.submit, 0, Interaction::Click)
            .await?;

        tracing::debug!("Login submitted");
        Ok(())
    }

    pub async fn scrape_index_pages(&mut self, request: &IndexCrawlRequest) -> Result<CrawlReport> {
        let pagination = self.core.prepare(request)?;
        let consumer = self.core.consumer.clone();

        scrape_with_session(
            self.session.as_mut(),
            &mut self.core.buffer,
            consumer.as_ref(),
            &pagination,
            request,
            self.wait_timeout,
        )
        .await
    }

    /// Flushes leftovers and closes the browser
    pub async fn destroy(&mut self) -> Result<()> {
        let Some(flushed) = self.core.begin_destroy() else {
            return Ok(());
        };

        let closed = self.session.close().await;
        tracing::debug!("Destroyed {} medium", self.core.kind);
        flushed?;
        closed?;
        Ok(())
    }
}
