//! Link resolution for listing and next-page nodes
//!
//! A matched node is either an anchor or contains one. The anchor's `href` is resolved
//! against the URL of the page the node was found on.

mod normalize;

pub use normalize::{normalize_href, origin};

use crate::LinkError;
use scraper::ElementRef;
use url::Url;

/// Returns the `href` of `node` if it is an anchor, else of its first descendant anchor
///
/// Descendants are visited in document order.
pub fn anchor_href<'a>(node: ElementRef<'a>) -> Result<&'a str, LinkError> {
    let anchor = node
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name().eq_ignore_ascii_case("a"))
        .ok_or(LinkError::NoAnchor)?;

    anchor.value().attr("href").ok_or(LinkError::MissingHref)
}

/// Resolves the anchor carried by `node` into an absolute URL
///
/// # Arguments
///
/// * `node` - A listing or next-page element
/// * `page_url` - The URL of the index page `node` belongs to
pub fn resolve_anchor(node: ElementRef<'_>, page_url: &Url) -> Result<String, LinkError> {
    let href = anchor_href(node)?;
    normalize_href(href, page_url)
}
