//! Crawler module for index traversal
//!
//! This module contains the core traversal logic, including:
//! - Index page parsing and link extraction
//! - The traversal loop over HTTP requests
//! - The traversal loop over a driven browser session
//! - Consumers and crawl outcome reporting

mod consumer;
mod cursor;
mod parser;
mod request_engine;
mod session_engine;

pub use consumer::{Consumer, PassThrough};
pub use cursor::{CrawlCursor, CrawlReport, Termination};
pub use parser::{parse_index_page, CompiledSelectors, ParsedIndexPage};
pub use request_engine::scrape_with_requests;
pub use session_engine::scrape_with_session;

use crate::state::TraversalPhase;
use crate::storage::ResultBuffer;
use crate::MediumError;

/// Ends a traversal: flushes the buffer once and builds the report
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The final flush succeeded (or there was nothing to flush)
/// * `Err(MediumError::Flush)` - The final flush failed; the items stay buffered
pub(crate) fn conclude(
    mut cursor: CrawlCursor,
    termination: Termination,
    buffer: &mut ResultBuffer,
) -> Result<CrawlReport, MediumError> {
    cursor.advance(TraversalPhase::Terminated);

    match &termination {
        Termination::Failed(e) => tracing::error!(
            "Crawl failed after {} pages ({} artifacts): {}",
            cursor.pages_visited(),
            cursor.artifacts(),
            e
        ),
        done => tracing::info!(
            "Crawl finished ({}): {} pages, {} artifacts",
            done,
            cursor.pages_visited(),
            cursor.artifacts()
        ),
    }

    if let Err(source) = buffer.flush() {
        tracing::error!("Final flush failed: {}", source);
        return Err(MediumError::Flush {
            termination,
            source,
        });
    }

    Ok(CrawlReport {
        termination,
        pages_visited: cursor.pages_visited(),
        artifacts_collected: cursor.artifacts(),
        batches_written: buffer.batches_written() - cursor.batches_at_start(),
    })
}
