//! Table sinks: where sanitized submissions end up

pub mod google;
pub mod memory;
pub mod schema;

pub use google::GoogleSheetsSink;
pub use memory::MemorySheetSink;
pub use schema::{SheetRow, SheetSchema, APPOINTMENTS, CONTACTS, SUBMITTED_AT};

use crate::error::SinkError;
use async_trait::async_trait;

/// Capability to keep a named table with a fixed header row and append to it.
#[async_trait]
pub trait TableSink: Send + Sync {
    /// Creates the table with `headers` if it does not exist, and rewrites the
    /// header row if the table exists without one.
    async fn ensure_schema(&self, name: &str, headers: &[&str]) -> Result<(), SinkError>;

    async fn append_row(&self, name: &str, row: &SheetRow) -> Result<(), SinkError>;

    /// Short label for logs and the health endpoint.
    fn describe(&self) -> &'static str;
}
