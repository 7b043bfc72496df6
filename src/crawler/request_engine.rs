//! Index traversal over HTTP requests
//!
//! Each index page is requested with the crawl's method and options, its listings are
//! resolved to detail links and every detail page is fetched in order. The next index
//! page comes from the URL template or from the page's next-page link.

use crate::crawler::parser::{parse_index_page, CompiledSelectors};
use crate::crawler::{conclude, Consumer, CrawlCursor, CrawlReport, Termination};
use crate::model::{HttpMethod, IndexCrawlRequest, PaginationSpec};
use crate::state::TraversalPhase;
use crate::storage::ResultBuffer;
use crate::transport::HttpTransport;
use crate::{CrawlError, LinkError, MediumError, TransportError};
use url::Url;

/// Runs one crawl over an HTTP transport
///
/// # Arguments
///
/// * `transport` - Authenticated transport; its cookie jar carries the session
/// * `buffer` - Result buffer shared with the medium
/// * `consumer` - Applied to every detail page body
/// * `pagination` - Active pagination strategy
/// * `request` - The crawl request
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ended, cleanly or not, and the final flush succeeded
/// * `Err(MediumError)` - A selector cannot be evaluated over HTTP, or the final flush failed
pub async fn scrape_with_requests(
    transport: &mut HttpTransport,
    buffer: &mut ResultBuffer,
    consumer: &dyn Consumer,
    pagination: &PaginationSpec,
    request: &IndexCrawlRequest,
) -> Result<CrawlReport, MediumError> {
    let selectors =
        CompiledSelectors::compile(&request.selectors.listings, pagination.next_page_selector())?;

    let mut cursor = CrawlCursor::new(
        &request.first_index_url,
        request.stop_after,
        buffer.batches_written(),
    );
    tracing::info!("Starting request crawl at {}", request.first_index_url);

    let termination = match walk(
        transport,
        buffer,
        consumer,
        pagination,
        request,
        &selectors,
        &mut cursor,
    )
    .await
    {
        Ok(termination) => termination,
        Err(e) => Termination::Failed(e),
    };

    conclude(cursor, termination, buffer)
}

async fn walk(
    transport: &mut HttpTransport,
    buffer: &mut ResultBuffer,
    consumer: &dyn Consumer,
    pagination: &PaginationSpec,
    request: &IndexCrawlRequest,
    selectors: &CompiledSelectors,
    cursor: &mut CrawlCursor,
) -> Result<Termination, CrawlError> {
    let detail_options = request.options.headers_only();

    loop {
        if cursor.limit_reached() {
            return Ok(Termination::LimitReached);
        }

        cursor.advance(TraversalPhase::FetchIndex);
        tracing::debug!(
            "Fetching index page {} ({})",
            cursor.pages_visited() + 1,
            cursor.current_url()
        );
        let index = transport
            .request(request.method, cursor.current_url(), &request.options)
            .await?;

        cursor.advance(TraversalPhase::ExtractLinks);
        let page_url = Url::parse(&index.url).map_err(|source| TransportError::InvalidUrl {
            url: index.url.clone(),
            source,
        })?;
        let parsed = parse_index_page(&index.body, &page_url, selectors);
        if parsed.is_empty() {
            tracing::info!("No listings on {}, index exhausted", index.url);
            return Ok(Termination::Exhausted);
        }

        cursor.advance(TraversalPhase::FetchDetails);
        tracing::debug!("Found {} listings on {}", parsed.listings.len(), index.url);
        for (position, link) in parsed.listings.iter().enumerate() {
            let link = match link {
                Ok(link) => link,
                Err(reason) => {
                    tracing::warn!(
                        "Skipping listing {} on {}: {}",
                        position + 1,
                        index.url,
                        reason
                    );
                    continue;
                }
            };

            buffer.flush_if_full()?;
            let detail = transport
                .request(HttpMethod::Get, link, &detail_options)
                .await?;
            buffer.push(consumer.consume(&detail.body))?;
            cursor.record_artifact();
        }

        cursor.page_completed();
        if cursor.limit_reached() {
            return Ok(Termination::LimitReached);
        }

        cursor.advance(TraversalPhase::ComputeNext);
        let next = match pagination {
            PaginationSpec::UrlTemplate { template } => {
                PaginationSpec::page_url(template, cursor.pages_visited() + 1)
            }
            PaginationSpec::NextAffordance { selector } => {
                match parsed.next_page.unwrap_or(Err(LinkError::NoMatch)) {
                    Ok(url) => url,
                    Err(reason) => {
                        return Err(CrawlError::LinkNotFound {
                            page_url: index.url,
                            selector: selector.to_string(),
                            reason,
                        })
                    }
                }
            }
        };
        cursor.set_url(next);
    }
}
