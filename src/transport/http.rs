//! HTTP transport for the request-based delivery mediums
//!
//! This module handles all HTTP requests for a medium, including:
//! - Building HTTP clients, optionally routed through an anonymizing relay
//! - Sending index, detail and login requests with their options
//! - Manual redirect handling so every hop's `Set-Cookie` reaches the jar
//! - Error classification

use crate::model::{FormLogin, HttpMethod, RequestOptions};
use crate::transport::CookieJar;
use crate::TransportError;
use reqwest::header::{COOKIE, LOCATION};
use reqwest::{redirect::Policy, Client, Proxy, StatusCode};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Maximum number of redirects followed for one request
pub const MAX_REDIRECTS: usize = 10;

/// A successful (2xx) response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects
    pub url: String,
    pub status: u16,
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `timeout` - Whole-request timeout
/// * `user_agent` - `User-Agent` sent with every request
/// * `relay` - Proxy URL every request is routed through (`socks5h://`, `http://`)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(TransportError)` - Invalid relay URL or client configuration
///
/// # Example
///
/// ```no_run
/// use listing_courier::transport::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(
///     Duration::from_secs(30),
///     "listing-courier/1.0",
///     Some("socks5h://127.0.0.1:9050"),
/// )
/// .unwrap();
/// ```
pub fn build_http_client(
    timeout: Duration,
    user_agent: &str,
    relay: Option<&str>,
) -> Result<Client, TransportError> {
    let builder = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::none()) // Handle redirects manually
        .gzip(true)
        .brotli(true);

    let builder = match relay {
        Some(proxy) => {
            let relay = Proxy::all(proxy).map_err(|source| TransportError::Relay {
                proxy: proxy.to_string(),
                source,
            })?;
            builder.proxy(relay)
        }
        // Ignore HTTP(S)_PROXY from the environment so "direct" means direct
        None => builder.no_proxy(),
    };

    builder.build().map_err(TransportError::Client)
}

/// HTTP transport owning the client and the session cookie jar
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    cookies: CookieJar,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cookies: CookieJar::new(),
        }
    }

    /// Transport that talks to the target directly
    pub fn direct(timeout: Duration, user_agent: &str) -> Result<Self, TransportError> {
        Ok(Self::new(build_http_client(timeout, user_agent, None)?))
    }

    /// Transport that routes every request through `relay`
    pub fn anonymized(
        timeout: Duration,
        user_agent: &str,
        relay: &str,
    ) -> Result<Self, TransportError> {
        Ok(Self::new(build_http_client(timeout, user_agent, Some(relay))?))
    }

    /// Performs the login exchange; the session lives on in the cookie jar
    pub async fn authenticate(&mut self, login: &FormLogin) -> Result<HttpResponse, TransportError> {
        info!("Logging in via {} {}", login.method, login.url);
        let response = self.request(login.method, &login.url, &login.options).await?;
        debug!(
            "Login finished at {} with {} cookies",
            response.url,
            self.cookies.len()
        );
        Ok(response)
    }

    /// Sends a request and follows redirects
    ///
    /// # Request Flow
    ///
    /// 1. Send `method` to `url` with the options' headers, query and payload
    /// 2. Absorb `Set-Cookie` from the response into the jar
    /// 3. On 3xx with `Location`, resolve it and repeat (max 10 hops)
    ///    - 301/302/303 after a POST continue as GET without payload
    ///    - 307/308 keep method and payload
    ///    - The query is only appended on the first hop
    /// 4. Non-2xx final status → `TransportError::Status`
    ///
    /// # Arguments
    ///
    /// * `method` - Initial method
    /// * `url` - Absolute URL to request
    /// * `options` - Headers, form, query, body
    ///
    /// # Returns
    ///
    /// * `Ok(HttpResponse)` - Final 2xx response with its body
    /// * `Err(TransportError)` - Network failure, timeout, bad status or redirect failure
    pub async fn request(
        &mut self,
        method: HttpMethod,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        let mut current = Url::parse(url).map_err(|source| TransportError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        let mut method = method;
        let mut send_payload = true;
        let mut visited: HashSet<(HttpMethod, String)> = HashSet::new();

        for hop in 0..=MAX_REDIRECTS {
            if !visited.insert((method, current.to_string())) {
                return Err(TransportError::RedirectLoop {
                    url: current.to_string(),
                });
            }

            debug!("{} {}", method, current);
            let mut builder = self.client.request(method.as_reqwest(), current.clone());

            for (name, value) in &options.headers {
                if !name.eq_ignore_ascii_case(COOKIE.as_str()) {
                    builder = builder.header(name.as_str(), value.as_str());
                }
            }
            if let Some(cookie) = self.cookie_header(options, &current) {
                builder = builder.header(COOKIE, cookie);
            }

            if hop == 0 {
                if let Some(query) = &options.query {
                    builder = builder.query(query);
                }
            }
            if send_payload {
                if let Some(form) = &options.form {
                    builder = builder.form(form);
                } else if let Some(body) = &options.body {
                    builder = builder.body(body.clone());
                }
            }

            let response = builder
                .send()
                .await
                .map_err(|e| classify_error(current.as_str(), e))?;

            self.cookies.absorb(response.headers(), &current);
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok());

                if let Some(location) = location {
                    let next = current
                        .join(location)
                        .map_err(|source| TransportError::InvalidUrl {
                            url: location.to_string(),
                            source,
                        })?;
                    debug!("Redirect {} -> {} ({})", current, next, status.as_u16());

                    if rewrites_to_get(status, method) {
                        method = HttpMethod::Get;
                        send_payload = false;
                    }
                    current = next;
                    continue;
                }
            }

            if !status.is_success() {
                return Err(TransportError::Status {
                    url: current.to_string(),
                    status: status.as_u16(),
                });
            }

            let final_url = current.to_string();
            let body = response
                .text()
                .await
                .map_err(|e| classify_error(&final_url, e))?;

            return Ok(HttpResponse {
                url: final_url,
                status: status.as_u16(),
                body,
            });
        }

        Err(TransportError::RedirectLimit {
            url: url.to_string(),
        })
    }

    /// Merges a caller-supplied `Cookie` header with the jar
    fn cookie_header(&self, options: &RequestOptions, url: &Url) -> Option<String> {
        let explicit = options
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(COOKIE.as_str()))
            .map(|(_, value)| value.clone());

        match (explicit, self.cookies.header_value(url)) {
            (Some(explicit), Some(jar)) => Some(format!("{}; {}", explicit, jar)),
            (explicit, jar) => explicit.or(jar),
        }
    }
}

fn rewrites_to_get(status: StatusCode, method: HttpMethod) -> bool {
    match status {
        StatusCode::SEE_OTHER => true,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => method == HttpMethod::Post,
        _ => false,
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else {
        TransportError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
