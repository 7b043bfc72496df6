//! Login and crawl request descriptions

use crate::model::SelectorSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// HTTP methods supported by the request transports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    #[serde(rename = "GET", alias = "get")]
    Get,
    #[serde(rename = "POST", alias = "post")]
    Post,
}

impl HttpMethod {
    pub fn as_reqwest(&self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Extra request parts sent with an index or login request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Sent as `application/x-www-form-urlencoded`
    #[serde(default)]
    pub form: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub query: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Headers only; detail pages are fetched without the index request's payload
    pub fn headers_only(&self) -> Self {
        Self {
            headers: self.headers.clone(),
            ..Self::default()
        }
    }
}

/// Selectors used on every index page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSelectors {
    pub listings: SelectorSpec,

    #[serde(
        rename = "next-page",
        alias = "nextPageSelector",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub next_page: Option<SelectorSpec>,
}

/// One `scrape_index_pages` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCrawlRequest {
    #[serde(rename = "first-index-url", alias = "firstIndexUrl")]
    pub first_index_url: String,

    pub selectors: IndexSelectors,

    /// Maximum number of index pages to process; unlimited when absent
    #[serde(rename = "stop-after", alias = "stopAfter", default)]
    pub stop_after: Option<usize>,

    #[serde(default)]
    pub options: RequestOptions,

    #[serde(default)]
    pub method: HttpMethod,
}

impl IndexCrawlRequest {
    pub fn new(first_index_url: impl Into<String>, listings: SelectorSpec) -> Self {
        Self {
            first_index_url: first_index_url.into(),
            selectors: IndexSelectors {
                listings,
                next_page: None,
            },
            stop_after: None,
            options: RequestOptions::default(),
            method: HttpMethod::Get,
        }
    }

    pub fn with_next_page(mut self, selector: SelectorSpec) -> Self {
        self.selectors.next_page = Some(selector);
        self
    }

    pub fn stop_after(mut self, pages: usize) -> Self {
        self.stop_after = Some(pages);
        self
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// Authentication exchange performed by `login`
///
/// The credentials form is listed first so that untagged deserialization does not read a
/// credentials login as a form login with unknown fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoginSpec {
    Credentials(SessionLogin),
    Form(FormLogin),
}

impl LoginSpec {
    pub fn url(&self) -> &str {
        match self {
            Self::Credentials(login) => &login.url,
            Self::Form(login) => &login.url,
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Self::Credentials(_) => "credentials",
            Self::Form(_) => "form",
        }
    }
}

/// A single request (typically a form POST) that establishes the session cookies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormLogin {
    pub url: String,

    #[serde(default)]
    pub options: RequestOptions,

    #[serde(default)]
    pub method: HttpMethod,
}

/// Fill the user and password fields of a login page and click submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLogin {
    pub url: String,
    pub credentials: Credentials,
    pub selectors: LoginSelectors,
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginSelectors {
    pub user: SelectorSpec,
    pub password: SelectorSpec,
    pub submit: SelectorSpec,
}
