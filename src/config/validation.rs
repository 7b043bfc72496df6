use crate::config::types::{BrowserSettings, Config, MediumSettings};
use crate::medium::MediumKind;
use crate::model::{IndexCrawlRequest, LoginSpec, PaginationType, SelectorSpec, PAGE_PARAMETER};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let kind = validate_medium_settings(&config.medium)?;
    validate_login(kind, &config.login)?;
    validate_crawl(kind, config.medium.pagination_type, &config.crawl)?;
    Ok(())
}

/// Validates medium configuration and returns the parsed medium kind
fn validate_medium_settings(settings: &MediumSettings) -> Result<MediumKind, ConfigError> {
    let kind = parse_kind(&settings.kind)?;

    validate_pagination(
        settings.pagination_type,
        settings.pagination_url_template.as_deref(),
    )?;
    validate_flush_after(settings.flush_after)?;

    if settings.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if settings.data_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "data-path cannot be empty".to_string(),
        ));
    }

    if kind == MediumKind::AnonymizedRequest {
        validate_relay(&settings.relay.proxy)?;
    }
    if kind == MediumKind::DrivenSession {
        validate_browser(&settings.browser)?;
    }

    Ok(kind)
}

pub(crate) fn parse_kind(kind: &str) -> Result<MediumKind, ConfigError> {
    kind.parse::<MediumKind>().map_err(|_| {
        ConfigError::Validation(format!(
            "unknown medium kind '{}' (expected direct-request, anonymized-request or driven-session)",
            kind
        ))
    })
}

/// Validates the pagination mode against the URL template
///
/// `URL` needs a template containing `{PAGE_PARAMETER}` that becomes a valid URL once
/// substituted. `NEXT` ignores the template; its selector is checked per crawl.
pub(crate) fn validate_pagination(
    pagination_type: PaginationType,
    template: Option<&str>,
) -> Result<(), ConfigError> {
    if pagination_type == PaginationType::Next {
        return Ok(());
    }

    let template = template.ok_or_else(|| {
        ConfigError::Validation(
            "pagination-url-template is required when pagination-type is URL".to_string(),
        )
    })?;

    if !template.contains(PAGE_PARAMETER) {
        return Err(ConfigError::Validation(format!(
            "pagination-url-template '{}' must contain {}",
            template, PAGE_PARAMETER
        )));
    }

    validate_http_url("pagination-url-template", &template.replace(PAGE_PARAMETER, "1"))?;
    Ok(())
}

pub(crate) fn validate_flush_after(flush_after: Option<usize>) -> Result<(), ConfigError> {
    if flush_after == Some(0) {
        return Err(ConfigError::Validation(
            "flush-after must be >= 1".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_browser(browser: &BrowserSettings) -> Result<(), ConfigError> {
    if browser.wait_timeout_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "wait-timeout-ms must be >= 100ms, got {}ms",
            browser.wait_timeout_ms
        )));
    }
    Ok(())
}

pub(crate) fn validate_relay(proxy: &str) -> Result<(), ConfigError> {
    let url = Url::parse(proxy)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid relay proxy '{}': {}", proxy, e)))?;

    if !matches!(url.scheme(), "socks5" | "socks5h" | "http" | "https") {
        return Err(ConfigError::Validation(format!(
            "relay proxy '{}' must use socks5, socks5h, http or https",
            proxy
        )));
    }
    Ok(())
}

/// Checks that `url` parses and uses HTTP or HTTPS
pub(crate) fn validate_http_url(label: &str, url: &str) -> Result<Url, ConfigError> {
    let parsed = Url::parse(url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", label, url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use HTTP or HTTPS",
            label, url
        )));
    }
    Ok(parsed)
}

/// Validates the login against the medium kind
fn validate_login(kind: MediumKind, login: &LoginSpec) -> Result<(), ConfigError> {
    if login.shape() != kind.login_shape() {
        return Err(ConfigError::Validation(format!(
            "{} medium cannot perform a {} login",
            kind,
            login.shape()
        )));
    }

    validate_http_url("login url", login.url())?;

    if let LoginSpec::Credentials(session_login) = login {
        for selector in [
            &session_login.selectors.user,
            &session_login.selectors.password,
            &session_login.selectors.submit,
        ] {
            validate_locator(selector)?;
        }
    }

    Ok(())
}

/// Validates the crawl request for the medium kind and pagination mode
pub(crate) fn validate_crawl(
    kind: MediumKind,
    pagination_type: PaginationType,
    crawl: &IndexCrawlRequest,
) -> Result<(), ConfigError> {
    validate_http_url("first-index-url", &crawl.first_index_url)?;

    let next_page = crawl.selectors.next_page.as_ref();
    if pagination_type == PaginationType::Next && next_page.is_none() {
        return Err(ConfigError::Validation(
            "NEXT pagination requires a next-page selector".to_string(),
        ));
    }

    for selector in std::iter::once(&crawl.selectors.listings).chain(next_page) {
        validate_locator(selector)?;
        // Fetched HTML is queried with CSS only
        if kind.is_http() {
            selector
                .to_css()
                .map_err(|e| ConfigError::Validation(e.to_string()))?;
        }
    }

    Ok(())
}

fn validate_locator(selector: &SelectorSpec) -> Result<(), ConfigError> {
    if selector.locator.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{} selector has an empty value",
            selector.kind
        )));
    }
    Ok(())
}
