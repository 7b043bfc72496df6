//! Detail page consumers
//!
//! A consumer turns the content of one detail page into the artifact that gets buffered
//! and persisted.

use serde_json::Value;

pub trait Consumer: Send + Sync {
    fn consume(&self, content: &str) -> Value;
}

/// Keeps the page content unchanged, as a JSON string
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl Consumer for PassThrough {
    fn consume(&self, content: &str) -> Value {
        Value::String(content.to_string())
    }
}

impl<F> Consumer for F
where
    F: Fn(&str) -> Value + Send + Sync,
{
    fn consume(&self, content: &str) -> Value {
        self(content)
    }
}
