//! Storage module for crawl results
//!
//! This module handles buffering and persisting consumer outputs:
//! - `ResultBuffer`: bounded, ordered buffer with flush-on-threshold
//! - `BatchSink`: destination for flushed batches
//! - `JsonDirSink`: one JSON array file per batch
//! - `MemorySink`: batches kept in memory

mod buffer;
mod json_dir;
mod memory;
mod traits;

pub use buffer::ResultBuffer;
pub use json_dir::JsonDirSink;
pub use memory::MemorySink;
pub use traits::{BatchSink, SinkError, SinkResult};
