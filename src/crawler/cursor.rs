//! Traversal cursor and crawl outcome types

use crate::state::TraversalPhase;
use crate::CrawlError;
use std::fmt;

/// Why a traversal stopped
#[derive(Debug)]
pub enum Termination {
    /// An index page had no listings
    Exhausted,

    /// The page limit was reached
    LimitReached,

    /// A transport, link or storage failure ended the crawl early
    Failed(CrawlError),
}

impl Termination {
    /// Returns true for the two clean ends of a crawl
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    pub fn error(&self) -> Option<&CrawlError> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "exhausted"),
            Self::LimitReached => write!(f, "page limit reached"),
            Self::Failed(error) => write!(f, "failed: {}", error),
        }
    }
}

/// Outcome of one `scrape_index_pages` call
#[derive(Debug)]
pub struct CrawlReport {
    pub termination: Termination,

    /// Index pages whose listings were all visited
    pub pages_visited: usize,

    /// Artifacts pushed into the buffer during this crawl
    pub artifacts_collected: usize,

    /// Batches written by the buffer during this crawl, final flush included
    pub batches_written: usize,
}

impl CrawlReport {
    pub fn is_success(&self) -> bool {
        self.termination.is_success()
    }
}

/// Progress of one in-flight traversal
#[derive(Debug)]
pub struct CrawlCursor {
    current_url: String,
    pages_visited: usize,
    page_limit: Option<usize>,
    phase: TraversalPhase,
    artifacts: usize,
    batches_at_start: usize,
}

impl CrawlCursor {
    /// Creates a cursor positioned on the first index page
    ///
    /// # Arguments
    ///
    /// * `first_url` - URL of the first index page
    /// * `page_limit` - Maximum number of index pages to complete
    /// * `batches_at_start` - The buffer's batch count before this crawl
    pub fn new(first_url: &str, page_limit: Option<usize>, batches_at_start: usize) -> Self {
        Self {
            current_url: first_url.to_string(),
            pages_visited: 0,
            page_limit,
            phase: TraversalPhase::Start,
            artifacts: 0,
            batches_at_start,
        }
    }

    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    pub fn pages_visited(&self) -> usize {
        self.pages_visited
    }

    pub fn phase(&self) -> TraversalPhase {
        self.phase
    }

    pub fn artifacts(&self) -> usize {
        self.artifacts
    }

    pub fn batches_at_start(&self) -> usize {
        self.batches_at_start
    }

    pub fn limit_reached(&self) -> bool {
        self.page_limit
            .map_or(false, |limit| self.pages_visited >= limit)
    }

    pub fn advance(&mut self, next: TraversalPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid traversal transition {} -> {}",
            self.phase,
            next
        );
        tracing::trace!("Traversal phase {} -> {}", self.phase, next);
        self.phase = next;
    }

    pub fn set_url(&mut self, url: String) {
        self.current_url = url;
    }

    pub fn page_completed(&mut self) {
        self.pages_visited += 1;
    }

    pub fn record_artifact(&mut self) {
        self.artifacts += 1;
    }
}
