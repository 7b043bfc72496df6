//! Session cookie jar
//!
//! A thin wrapper over `cookie_store::CookieStore`. A `Set-Cookie` replaces the cookie with
//! the same name, domain and path, and deletes it when `Max-Age <= 0` or `Expires` lies in
//! the past. Only cookies whose domain and path match a request URL are sent with it.

use cookie_store::CookieStore;
use reqwest::header::{HeaderMap, SET_COOKIE};
use tracing::debug;
use url::Url;

#[derive(Debug, Default)]
pub struct CookieJar {
    store: CookieStore,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies every `Set-Cookie` header of a response served from `url`
    pub fn absorb(&mut self, headers: &HeaderMap, url: &Url) {
        for value in headers.get_all(SET_COOKIE) {
            if let Ok(value) = value.to_str() {
                self.apply_set_cookie(value, url);
            }
        }
    }

    /// Applies a single `Set-Cookie` header value received from `url`
    pub fn apply_set_cookie(&mut self, header: &str, url: &Url) {
        if let Err(e) = self.store.parse(header, url) {
            debug!("Ignoring Set-Cookie '{}' from {}: {}", header, url, e);
        }
    }

    /// Renders the cookies that apply to `url` as a `Cookie` request header value
    ///
    /// Cookies are ordered by name.
    pub fn header_value(&self, url: &Url) -> Option<String> {
        let mut pairs: Vec<(&str, &str)> = self.store.get_request_values(url).collect();
        if pairs.is_empty() {
            return None;
        }
        pairs.sort();

        Some(
            pairs
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Value of the cookie `name` as it would be sent to `url`
    pub fn get(&self, url: &Url, name: &str) -> Option<&str> {
        self.store
            .get_request_values(url)
            .find(|(cookie, _)| *cookie == name)
            .map(|(_, value)| value)
    }

    /// Number of unexpired cookies, across all domains
    pub fn len(&self) -> usize {
        self.store.iter_unexpired().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
