//! State shared by every delivery medium: buffer, consumer, pagination, lifecycle flags

use crate::crawler::Consumer;
use crate::medium::{MediumConfig, MediumKind};
use crate::model::{IndexCrawlRequest, PaginationSpec, PaginationType};
use crate::storage::{JsonDirSink, ResultBuffer, SinkError};
use crate::{ConfigError, MediumError};
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

pub(crate) struct MediumCore {
    pub(crate) kind: MediumKind,
    pagination_type: PaginationType,
    pagination_url_template: Option<String>,
    pub(crate) buffer: ResultBuffer,
    pub(crate) consumer: Arc<dyn Consumer>,
    logged_in: bool,
    destroyed: bool,
}

impl MediumCore {
    pub(crate) fn new(kind: MediumKind, config: MediumConfig) -> Self {
        let sink = config
            .sink
            .unwrap_or_else(|| Box::new(JsonDirSink::new(config.data_path)));

        Self {
            kind,
            pagination_type: config.pagination_type,
            pagination_url_template: config.pagination_url_template,
            buffer: ResultBuffer::new(config.flush_after, sink),
            consumer: config.consumer,
            logged_in: false,
            destroyed: false,
        }
    }

    pub(crate) fn ensure_alive(&self) -> Result<(), MediumError> {
        if self.destroyed {
            return Err(MediumError::Destroyed);
        }
        Ok(())
    }

    /// Checks the preconditions of a crawl and builds its pagination strategy
    pub(crate) fn prepare(&self, request: &IndexCrawlRequest) -> Result<PaginationSpec, MediumError> {
        self.ensure_alive()?;
        if !self.logged_in {
            return Err(MediumError::LoginRequired);
        }

        Url::parse(&request.first_index_url).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid first index URL '{}': {}",
                request.first_index_url, e
            ))
        })?;

        Ok(PaginationSpec::resolve(
            self.pagination_type,
            self.pagination_url_template.as_deref(),
            request.selectors.next_page.as_ref(),
        )?)
    }

    pub(crate) fn mark_logged_in(&mut self) {
        self.logged_in = true;
    }

    pub(crate) fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Marks the medium destroyed and flushes leftovers
    ///
    /// # Returns
    ///
    /// `None` if the medium was already destroyed, else the outcome of the flush
    pub(crate) fn begin_destroy(&mut self) -> Option<Result<(), SinkError>> {
        if self.destroyed {
            return None;
        }
        self.destroyed = true;
        Some(self.buffer.flush().map(|_| ()))
    }

    pub(crate) fn set_data_path(&mut self, path: PathBuf) {
        self.buffer.set_data_path(path);
    }
}
