//! Bounded result buffer
//!
//! Artifacts accumulate in push order. When a capacity is set the buffer flushes into its
//! sink as soon as it holds exactly `capacity` items and another push is attempted, so
//! its length never exceeds the capacity.

use crate::storage::{BatchSink, SinkResult};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ResultBuffer {
    items: Vec<Value>,
    capacity: Option<usize>,
    sink: Box<dyn BatchSink>,
    batches_written: usize,
}

impl ResultBuffer {
    /// Creates an empty buffer
    ///
    /// # Arguments
    ///
    /// * `capacity` - Flush threshold; `None` buffers until an explicit flush
    /// * `sink` - Destination for flushed batches
    pub fn new(capacity: Option<usize>, sink: Box<dyn BatchSink>) -> Self {
        Self {
            items: Vec::new(),
            capacity,
            sink,
            batches_written: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.capacity
            .map_or(false, |capacity| self.items.len() >= capacity)
    }

    /// Number of non-empty batches handed to the sink since creation
    pub fn batches_written(&self) -> usize {
        self.batches_written
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Appends an artifact, flushing first if the buffer is full
    pub fn push(&mut self, item: Value) -> SinkResult<()> {
        self.flush_if_full()?;
        self.items.push(item);
        Ok(())
    }

    /// Flushes only when the buffer has reached its capacity
    ///
    /// # Returns
    ///
    /// `true` if a batch was written
    pub fn flush_if_full(&mut self) -> SinkResult<bool> {
        if self.is_full() {
            self.flush()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Writes all buffered items as one batch and clears the buffer
    ///
    /// An empty buffer writes nothing. If the sink fails the items stay buffered.
    ///
    /// # Returns
    ///
    /// The number of items written
    pub fn flush(&mut self) -> SinkResult<usize> {
        if self.items.is_empty() {
            return Ok(0);
        }

        self.sink.write_batch(&self.items)?;
        let written = self.items.len();
        self.items.clear();
        self.batches_written += 1;

        debug!("Flushed batch of {} artifacts", written);
        Ok(written)
    }

    pub fn set_data_path(&mut self, path: PathBuf) {
        self.sink.set_data_path(path);
    }

    pub fn data_path(&self) -> Option<&Path> {
        self.sink.data_path()
    }
}

impl std::fmt::Debug for ResultBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultBuffer")
            .field("len", &self.items.len())
            .field("capacity", &self.capacity)
            .field("batches_written", &self.batches_written)
            .finish()
    }
}
