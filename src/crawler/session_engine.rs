//! Index traversal over a driven browser session
//!
//! Listings are visited by clicking them and capturing the resulting page, then
//! navigating back to the index page and locating the listings again. A listing that
//! cannot be clicked or captured is skipped; failing to get back to the index is fatal.

use crate::crawler::{conclude, Consumer, CrawlCursor, CrawlReport, Termination};
use crate::model::{IndexCrawlRequest, PaginationSpec, SelectorSpec};
use crate::state::TraversalPhase;
use crate::storage::ResultBuffer;
use crate::transport::{BrowserSession, Interaction};
use crate::{CrawlError, LinkError, MediumError, SelectorError, TransportError};
use serde_json::Value;
use std::time::Duration;

/// Runs one crawl over a browser session
///
/// # Arguments
///
/// * `session` - Logged-in browser session
/// * `buffer` - Result buffer shared with the medium
/// * `consumer` - Applied to the page source of every detail page
/// * `pagination` - Active pagination strategy
/// * `request` - The crawl request; its HTTP method and options do not apply here
/// * `wait_timeout` - How long to wait for listings to appear on an index page
pub async fn scrape_with_session(
    session: &mut dyn BrowserSession,
    buffer: &mut ResultBuffer,
    consumer: &dyn Consumer,
    pagination: &PaginationSpec,
    request: &IndexCrawlRequest,
    wait_timeout: Duration,
) -> Result<CrawlReport, MediumError> {
    check_locator(&request.selectors.listings)?;
    if let Some(selector) = pagination.next_page_selector() {
        check_locator(selector)?;
    }

    let mut cursor = CrawlCursor::new(
        &request.first_index_url,
        request.stop_after,
        buffer.batches_written(),
    );
    tracing::info!("Starting session crawl at {}", request.first_index_url);

    let termination = match walk(
        session,
        buffer,
        consumer,
        pagination,
        &request.selectors.listings,
        wait_timeout,
        &mut cursor,
    )
    .await
    {
        Ok(termination) => termination,
        Err(e) => Termination::Failed(e),
    };

    conclude(cursor, termination, buffer)
}

fn check_locator(selector: &SelectorSpec) -> Result<(), SelectorError> {
    if selector.locator.trim().is_empty() {
        return Err(SelectorError::EmptyLocator(selector.kind));
    }
    Ok(())
}

async fn walk(
    session: &mut dyn BrowserSession,
    buffer: &mut ResultBuffer,
    consumer: &dyn Consumer,
    pagination: &PaginationSpec,
    listings: &SelectorSpec,
    wait_timeout: Duration,
    cursor: &mut CrawlCursor,
) -> Result<Termination, CrawlError> {
    // Set after clicking "next": the session is already on the new index page
    let mut arrived = false;

    loop {
        if cursor.limit_reached() {
            return Ok(Termination::LimitReached);
        }

        cursor.advance(TraversalPhase::FetchIndex);
        if !arrived {
            tracing::debug!(
                "Loading index page {} ({})",
                cursor.pages_visited() + 1,
                cursor.current_url()
            );
            session.navigate(cursor.current_url()).await?;
        }
        let index_url = cursor.current_url().to_string();

        cursor.advance(TraversalPhase::ExtractLinks);
        let count = if session.wait_for(listings, wait_timeout).await? {
            session.locate_elements(listings).await?
        } else {
            0
        };
        if count == 0 {
            tracing::info!("No listings on {}, index exhausted", index_url);
            return Ok(Termination::Exhausted);
        }

        cursor.advance(TraversalPhase::FetchDetails);
        tracing::debug!("Found {} listings on {}", count, index_url);
        for position in 0..count {
            buffer.flush_if_full()?;

            match visit_listing(session, listings, position, consumer).await {
                Ok(artifact) => {
                    buffer.push(artifact)?;
                    cursor.record_artifact();
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping listing {} on {}: {}",
                        position + 1,
                        index_url,
                        e
                    );
                }
            }

            return_to_index(session, &index_url, listings, wait_timeout).await?;
        }

        cursor.page_completed();
        if cursor.limit_reached() {
            return Ok(Termination::LimitReached);
        }

        cursor.advance(TraversalPhase::ComputeNext);
        match pagination {
            PaginationSpec::UrlTemplate { template } => {
                cursor.set_url(PaginationSpec::page_url(template, cursor.pages_visited() + 1));
                arrived = false;
            }
            PaginationSpec::NextAffordance { selector } => {
                if session.locate_elements(selector).await? == 0 {
                    return Err(CrawlError::LinkNotFound {
                        page_url: index_url,
                        selector: selector.to_string(),
                        reason: LinkError::NoMatch,
                    });
                }
                session.interact(selector, 0, Interaction::Click).await?;
                let next = session.current_url().await?;
                tracing::debug!("Followed next page control to {}", next);
                cursor.set_url(next);
                arrived = true;
            }
        }
    }
}

async fn visit_listing(
    session: &mut dyn BrowserSession,
    listings: &SelectorSpec,
    position: usize,
    consumer: &dyn Consumer,
) -> Result<Value, TransportError> {
    session
        .interact(listings, position, Interaction::Click)
        .await?;
    let source = session.page_source().await?;
    Ok(consumer.consume(&source))
}

async fn return_to_index(
    session: &mut dyn BrowserSession,
    index_url: &str,
    listings: &SelectorSpec,
    wait_timeout: Duration,
) -> Result<(), TransportError> {
    session.navigate(index_url).await?;
    if !session.wait_for(listings, wait_timeout).await? {
        return Err(TransportError::ElementNotFound(format!(
            "{} after returning to {}",
            listings, index_url
        )));
    }
    Ok(())
}
