//! State module for tracking traversal progress
//!
//! # Components
//!
//! - `TraversalPhase`: the phase an index traversal is in (fetching the index, visiting
//!   details, computing the next page, terminated)

mod phase;

// Re-export main types
pub use phase::TraversalPhase;
