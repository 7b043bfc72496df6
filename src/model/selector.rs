//! Selector and pagination descriptions
//!
//! These are pure data: they describe how to find an element and how to find the next
//! index page. Evaluation is left to the transport that owns the DOM.

use crate::{ConfigError, SelectorError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder substituted with the page number in URL templates
pub const PAGE_PARAMETER: &str = "{PAGE_PARAMETER}";

/// How a locator string should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    Class,
    Id,
    #[default]
    Css,
    Xpath,
    Name,
}

impl SelectorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Id => "id",
            Self::Css => "css",
            Self::Xpath => "xpath",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed description of how to find an element
///
/// Deserializes from `{ value = "...", type = "css" }`. When `type` is omitted the
/// locator is read as a CSS selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectorSpec {
    #[serde(rename = "type", default)]
    pub kind: SelectorKind,

    #[serde(rename = "value")]
    pub locator: String,
}

impl SelectorSpec {
    pub fn new(kind: SelectorKind, locator: impl Into<String>) -> Self {
        Self {
            kind,
            locator: locator.into(),
        }
    }

    pub fn css(locator: impl Into<String>) -> Self {
        Self::new(SelectorKind::Css, locator)
    }

    pub fn id(locator: impl Into<String>) -> Self {
        Self::new(SelectorKind::Id, locator)
    }

    pub fn xpath(locator: impl Into<String>) -> Self {
        Self::new(SelectorKind::Xpath, locator)
    }

    /// Converts the selector into an equivalent CSS selector
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - CSS selector text
    /// * `Err(SelectorError)` - The locator is empty, or the selector is XPath
    pub fn to_css(&self) -> Result<String, SelectorError> {
        let locator = self.locator.trim();
        if locator.is_empty() {
            return Err(SelectorError::EmptyLocator(self.kind));
        }

        match self.kind {
            SelectorKind::Css => Ok(locator.to_string()),
            // "a b" names an element carrying both classes
            SelectorKind::Class => Ok(locator
                .split_whitespace()
                .map(|class| format!(".{}", escape_ident(class)))
                .collect()),
            SelectorKind::Id => Ok(format!("[id=\"{}\"]", escape_attr(locator))),
            SelectorKind::Name => Ok(format!("[name=\"{}\"]", escape_attr(locator))),
            SelectorKind::Xpath => Err(SelectorError::XPathUnsupported(locator.to_string())),
        }
    }
}

impl fmt::Display for SelectorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.locator)
    }
}

fn escape_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escapes a class name for use as a CSS identifier
///
/// A digit that would start the identifier becomes a hex escape. ASCII characters other
/// than letters, digits, `-` and `_` get a backslash.
fn escape_ident(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        let starts_ident = i == 0 || (i == 1 && value.starts_with('-'));
        if c.is_ascii_digit() && starts_ident {
            escaped.push_str(&format!("\\{:x} ", c as u32));
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            escaped.push(c);
        } else {
            escaped.push('\\');
            escaped.push(c);
        }
    }
    escaped
}

/// Pagination mode selected in the medium configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationType {
    #[serde(rename = "URL", alias = "url")]
    Url,
    #[serde(rename = "NEXT", alias = "next")]
    Next,
}

impl fmt::Display for PaginationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url => f.write_str("URL"),
            Self::Next => f.write_str("NEXT"),
        }
    }
}

/// How the next index page is found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationSpec {
    /// Substitute the page number into a template; no DOM inspection
    UrlTemplate { template: String },

    /// Follow (or click) the "next" control found on the current index page
    NextAffordance { selector: SelectorSpec },
}

impl PaginationSpec {
    /// Builds the active pagination strategy for one crawl
    ///
    /// # Arguments
    ///
    /// * `pagination_type` - The medium's configured pagination mode
    /// * `template` - The medium's URL template, required for `URL`
    /// * `next_page` - The crawl's next-page selector, required for `NEXT`
    pub fn resolve(
        pagination_type: PaginationType,
        template: Option<&str>,
        next_page: Option<&SelectorSpec>,
    ) -> Result<Self, ConfigError> {
        match pagination_type {
            PaginationType::Url => {
                let template = template.ok_or_else(|| {
                    ConfigError::Validation(
                        "URL pagination requires a pagination URL template".to_string(),
                    )
                })?;
                if !template.contains(PAGE_PARAMETER) {
                    return Err(ConfigError::Validation(format!(
                        "pagination URL template '{}' must contain {}",
                        template, PAGE_PARAMETER
                    )));
                }
                Ok(Self::UrlTemplate {
                    template: template.to_string(),
                })
            }
            PaginationType::Next => {
                let selector = next_page.ok_or_else(|| {
                    ConfigError::Validation(
                        "NEXT pagination requires a next-page selector".to_string(),
                    )
                })?;
                Ok(Self::NextAffordance {
                    selector: selector.clone(),
                })
            }
        }
    }

    /// Returns the URL of index page `page` for template pagination
    pub fn page_url(template: &str, page: usize) -> String {
        template.replace(PAGE_PARAMETER, &page.to_string())
    }

    pub fn next_page_selector(&self) -> Option<&SelectorSpec> {
        match self {
            Self::UrlTemplate { .. } => None,
            Self::NextAffordance { selector } => Some(selector),
        }
    }
}
