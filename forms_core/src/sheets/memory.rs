//! In-process table sink

use super::{SheetRow, TableSink};
use crate::error::SinkError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Keeps tables in memory with the same create-and-repair behaviour as the
/// spreadsheet backend. Clones share state.
#[derive(Clone, Default)]
pub struct MemorySheetSink {
    tables: Arc<RwLock<HashMap<String, MemoryTable>>>,
    ensure_calls: Arc<AtomicUsize>,
    append_calls: Arc<AtomicUsize>,
    failure: Option<Arc<str>>,
}

impl MemorySheetSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every call fails with `reason`.
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(Arc::from(reason)),
            ..Self::default()
        }
    }

    /// Seeds a table. Passing no headers models a sheet whose header row was deleted.
    pub fn with_table(self, name: &str, headers: &[&str]) -> Self {
        self.tables.write().insert(
            name.to_string(),
            MemoryTable {
                headers: headers.iter().map(|h| h.to_string()).collect(),
                rows: Vec::new(),
            },
        );
        self
    }

    pub fn table(&self, name: &str) -> Option<MemoryTable> {
        self.tables.read().get(name).cloned()
    }

    pub fn rows(&self, name: &str) -> Vec<Vec<String>> {
        self.table(name).map(|table| table.rows).unwrap_or_default()
    }

    pub fn ensure_calls(&self) -> usize {
        self.ensure_calls.load(Ordering::SeqCst)
    }

    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.ensure_calls() + self.append_calls()
    }

    fn check_failure(&self) -> Result<(), SinkError> {
        match &self.failure {
            Some(reason) => Err(SinkError::Request(reason.to_string())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TableSink for MemorySheetSink {
    async fn ensure_schema(&self, name: &str, headers: &[&str]) -> Result<(), SinkError> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let mut tables = self.tables.write();
        let table = tables.entry(name.to_string()).or_insert_with(|| {
            debug!(table = name, "Creating table");
            MemoryTable::default()
        });

        if table.headers.is_empty() {
            debug!(table = name, "Writing header row");
            table.headers = headers.iter().map(|h| h.to_string()).collect();
        }

        Ok(())
    }

    async fn append_row(&self, name: &str, row: &SheetRow) -> Result<(), SinkError> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let mut tables = self.tables.write();
        let table = tables
            .get_mut(name)
            .ok_or_else(|| SinkError::UnknownTable(name.to_string()))?;

        let values = row.values_for(&table.headers);
        table.rows.push(values);

        Ok(())
    }

    fn describe(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::{APPOINTMENTS, CONTACTS};

    #[tokio::test]
    async fn test_creates_table_with_headers() {
        let sink = MemorySheetSink::new();
        sink.ensure_schema(CONTACTS.name, CONTACTS.headers).await.unwrap();

        let table = sink.table("Contacts").unwrap();
        assert_eq!(table.headers, CONTACTS.headers);
        assert!(table.rows.is_empty());
    }

    #[tokio::test]
    async fn test_repairs_missing_header_row() {
        let sink = MemorySheetSink::new().with_table("Appointments", &[]);
        sink.ensure_schema(APPOINTMENTS.name, APPOINTMENTS.headers).await.unwrap();

        assert_eq!(sink.table("Appointments").unwrap().headers, APPOINTMENTS.headers);
    }

    #[tokio::test]
    async fn test_existing_headers_are_kept() {
        let sink = MemorySheetSink::new().with_table("Contacts", &["Email", "Name"]);
        sink.ensure_schema(CONTACTS.name, CONTACTS.headers).await.unwrap();

        let row = SheetRow::new().with("Name", "Ravi").with("Email", "r@example.com");
        sink.append_row("Contacts", &row).await.unwrap();

        assert_eq!(sink.table("Contacts").unwrap().headers, vec!["Email", "Name"]);
        assert_eq!(sink.rows("Contacts"), vec![vec!["r@example.com", "Ravi"]]);
    }

    #[tokio::test]
    async fn test_append_to_unknown_table_fails() {
        let sink = MemorySheetSink::new();
        let result = sink.append_row("Nope", &SheetRow::new()).await;
        assert!(matches!(result, Err(SinkError::UnknownTable(_))));
        assert_eq!(sink.append_calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_sink_counts_calls() {
        let sink = MemorySheetSink::failing("quota exceeded");
        assert!(sink.ensure_schema(CONTACTS.name, CONTACTS.headers).await.is_err());
        assert_eq!(sink.total_calls(), 1);
        assert!(sink.table("Contacts").is_none());
    }
}
