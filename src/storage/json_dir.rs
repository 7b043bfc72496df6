//! JSON batch files on disk
//!
//! Every batch becomes its own file under the data path, named
//! `<unix-millis>-<seq>.json`, so that lexical order is write order.

use crate::storage::{BatchSink, SinkResult};
use chrono::Utc;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes each batch as a JSON array into a directory
#[derive(Debug)]
pub struct JsonDirSink {
    data_path: PathBuf,
    sequence: u32,
}

impl JsonDirSink {
    /// Creates a sink targeting `data_path`
    ///
    /// The directory is created lazily on the first write.
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            sequence: 0,
        }
    }

    fn next_file_name(&mut self) -> String {
        self.sequence = self.sequence.wrapping_add(1);
        format!(
            "{}-{:04}.json",
            Utc::now().timestamp_millis(),
            self.sequence % 10_000
        )
    }
}

impl BatchSink for JsonDirSink {
    fn write_batch(&mut self, batch: &[Value]) -> SinkResult<()> {
        fs::create_dir_all(&self.data_path)?;

        let name = self.next_file_name();
        let path = self.data_path.join(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, batch)?;
        writer.flush()?;

        debug!("Wrote {} artifacts to {}", batch.len(), path.display());
        Ok(())
    }

    fn set_data_path(&mut self, path: PathBuf) {
        self.data_path = path;
    }

    fn data_path(&self) -> Option<&Path> {
        Some(&self.data_path)
    }
}
