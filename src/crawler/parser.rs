//! HTML parser for index pages
//!
//! This module handles parsing index page content to extract:
//! - The detail link of every listing, in document order
//! - The link behind the "next page" control, when one is configured

use crate::link::resolve_anchor;
use crate::model::SelectorSpec;
use crate::{LinkError, SelectorError};
use scraper::{Html, Selector};
use url::Url;

/// Selectors compiled once per crawl
#[derive(Debug)]
pub struct CompiledSelectors {
    listings: Selector,
    next_page: Option<Selector>,
}

impl CompiledSelectors {
    /// Compiles the listing selector and, for next-affordance pagination, the next-page
    /// selector
    ///
    /// # Returns
    ///
    /// * `Ok(CompiledSelectors)` - Both selectors are valid CSS
    /// * `Err(SelectorError)` - XPath, an empty locator, or CSS that does not parse
    pub fn compile(
        listings: &SelectorSpec,
        next_page: Option<&SelectorSpec>,
    ) -> Result<Self, SelectorError> {
        Ok(Self {
            listings: compile_css(listings)?,
            next_page: next_page.map(compile_css).transpose()?,
        })
    }
}

fn compile_css(spec: &SelectorSpec) -> Result<Selector, SelectorError> {
    let css = spec.to_css()?;
    Selector::parse(&css).map_err(|e| SelectorError::InvalidCss {
        message: e.to_string(),
        selector: css.clone(),
    })
}

/// Extracted information from an index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIndexPage {
    /// One entry per listing node; `Err` for listings without a usable anchor
    pub listings: Vec<Result<String, LinkError>>,

    /// `None` when no next-page selector was compiled
    pub next_page: Option<Result<String, LinkError>>,
}

impl ParsedIndexPage {
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

/// Parses an index page and resolves its listing and next-page links
///
/// # Arguments
///
/// * `html` - The index page content
/// * `page_url` - The URL the page was served from, used to resolve relative hrefs
/// * `selectors` - The crawl's compiled selectors
///
/// # Example
///
/// ```
/// use listing_courier::crawler::{parse_index_page, CompiledSelectors};
/// use listing_courier::SelectorSpec;
/// use url::Url;
///
/// let html = r#"<div class="item"><a href="/items/1">One</a></div>"#;
/// let selectors = CompiledSelectors::compile(&SelectorSpec::css(".item"), None).unwrap();
/// let page_url = Url::parse("http://localhost:3000/listings/1").unwrap();
///
/// let parsed = parse_index_page(html, &page_url, &selectors);
/// assert_eq!(parsed.listings, vec![Ok("http://localhost:3000/items/1".to_string())]);
/// ```
pub fn parse_index_page(html: &str, page_url: &Url, selectors: &CompiledSelectors) -> ParsedIndexPage {
    let document = Html::parse_document(html);

    let listings = document
        .select(&selectors.listings)
        .map(|node| resolve_anchor(node, page_url))
        .collect();

    let next_page = selectors.next_page.as_ref().map(|selector| {
        document
            .select(selector)
            .next()
            .ok_or(LinkError::NoMatch)
            .and_then(|node| resolve_anchor(node, page_url))
    });

    ParsedIndexPage {
        listings,
        next_page,
    }
}
