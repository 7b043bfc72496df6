/// Traversal phase definitions for tracking crawl progress
///
/// This module defines every phase an index traversal can be in and the transitions
/// allowed between them.
use std::fmt;

/// Represents the current phase of an index traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalPhase {
    /// Cursor created, nothing fetched yet
    Start,

    /// Loading the current index page
    FetchIndex,

    /// Locating listings on the loaded index page
    ExtractLinks,

    /// Visiting every listing's detail page in order
    FetchDetails,

    /// Working out the URL (or click) that leads to the next index page
    ComputeNext,

    /// No further pages will be visited
    Terminated,
}

impl TraversalPhase {
    /// Returns true if no further processing will happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Returns true if `next` may directly follow this phase
    ///
    /// Every non-terminal phase may terminate. Otherwise the loop is
    /// `FetchIndex -> ExtractLinks -> FetchDetails -> ComputeNext -> FetchIndex`.
    pub fn can_transition_to(&self, next: TraversalPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        if next == Self::Terminated {
            return true;
        }

        matches!(
            (self, next),
            (Self::Start, Self::FetchIndex)
                | (Self::FetchIndex, Self::ExtractLinks)
                | (Self::ExtractLinks, Self::FetchDetails)
                | (Self::FetchDetails, Self::ComputeNext)
                | (Self::ComputeNext, Self::FetchIndex)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::FetchIndex => "fetch_index",
            Self::ExtractLinks => "extract_links",
            Self::FetchDetails => "fetch_details",
            Self::ComputeNext => "compute_next",
            Self::Terminated => "terminated",
        }
    }

    /// Returns all traversal phases in loop order
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::Start,
            Self::FetchIndex,
            Self::ExtractLinks,
            Self::FetchDetails,
            Self::ComputeNext,
            Self::Terminated,
        ]
    }
}

impl fmt::Display for TraversalPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
