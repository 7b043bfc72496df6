use crate::LinkError;
use url::Url;

/// Turns an href found on `page_url` into an absolute URL
///
/// # Normalization Rules
///
/// 1. `http://` and `https://` hrefs (any case) are returned unchanged
/// 2. Protocol-relative hrefs (`//host/path`) take the page's scheme
/// 3. Root-relative hrefs (`/path`) are appended to the page's origin
/// 4. Anything else is joined relative to the page URL
///
/// # Arguments
///
/// * `href` - The raw `href` attribute value
/// * `page_url` - The URL of the page the anchor was found on
///
/// # Returns
///
/// * `Ok(String)` - Absolute URL
/// * `Err(LinkError)` - The href is empty or cannot be resolved
///
/// # Examples
///
/// ```
/// use listing_courier::link::normalize_href;
/// use url::Url;
///
/// let page = Url::parse("http://localhost:3000/listings/1").unwrap();
/// assert_eq!(
///     normalize_href("/items/1", &page).unwrap(),
///     "http://localhost:3000/items/1"
/// );
/// ```
pub fn normalize_href(href: &str, page_url: &Url) -> Result<String, LinkError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(LinkError::MissingHref);
    }

    if is_absolute(href) {
        return Ok(href.to_string());
    }

    if href.starts_with("//") {
        return Ok(format!("{}:{}", page_url.scheme(), href));
    }

    if href.starts_with('/') {
        return origin(page_url)
            .map(|origin| format!("{}{}", origin, href))
            .map_err(|message| LinkError::Unresolvable {
                href: href.to_string(),
                message,
            });
    }

    page_url
        .join(href)
        .map(|url| url.to_string())
        .map_err(|e| LinkError::Unresolvable {
            href: href.to_string(),
            message: e.to_string(),
        })
}

/// Returns `scheme://host[:port]` for a page URL
///
/// The port is only present when the URL carries a non-default one.
pub fn origin(page_url: &Url) -> Result<String, String> {
    let host = page_url
        .host_str()
        .ok_or_else(|| format!("page URL '{}' has no host", page_url))?;

    Ok(match page_url.port() {
        Some(port) => format!("{}://{}:{}", page_url.scheme(), host, port),
        None => format!("{}://{}", page_url.scheme(), host),
    })
}

fn is_absolute(href: &str) -> bool {
    let lower = href.get(..8).unwrap_or(href).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
