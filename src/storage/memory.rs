use crate::storage::{BatchSink, SinkResult};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory sink; clones share the same batch list
///
/// Used by embedders that post-process batches themselves, and by tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    batches: Arc<Mutex<Vec<Vec<Value>>>>,
    data_path: Option<PathBuf>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every batch written so far
    pub fn batches(&self) -> Vec<Vec<Value>> {
        self.batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// All artifacts across batches, in write order
    pub fn artifacts(&self) -> Vec<Value> {
        self.batches().into_iter().flatten().collect()
    }
}

impl BatchSink for MemorySink {
    fn write_batch(&mut self, batch: &[Value]) -> SinkResult<()> {
        self.batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(batch.to_vec());
        Ok(())
    }

    fn set_data_path(&mut self, path: PathBuf) {
        self.data_path = Some(path);
    }

    fn data_path(&self) -> Option<&Path> {
        self.data_path.as_deref()
    }
}
