//! Batch sink trait and error types
//!
//! A sink receives one batch of consumer outputs per buffer flush. Sinks are
//! append-only: a batch that has been written is never revisited.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while persisting a batch
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for flushed result batches
pub trait BatchSink: Send {
    /// Appends one batch
    ///
    /// # Arguments
    ///
    /// * `batch` - The buffered artifacts, in push order
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The batch was persisted
    /// * `Err(SinkError)` - Nothing can be assumed about the batch
    fn write_batch(&mut self, batch: &[Value]) -> SinkResult<()>;

    /// Redirects future batches; batches already written stay where they are
    fn set_data_path(&mut self, path: PathBuf);

    /// Current target directory, if the sink has one
    fn data_path(&self) -> Option<&Path> {
        None
    }
}
