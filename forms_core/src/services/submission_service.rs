//! Turns a validated submission into a sheet append

use crate::{
    error::Result,
    models::{Fields, FormType},
    sheets::{SheetRow, SheetSchema, TableSink, APPOINTMENTS, CONTACTS, SUBMITTED_AT},
    validation::sanitize,
};
use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub const SUCCESS_MESSAGE: &str = "Success";
pub const MOCK_SUCCESS_MESSAGE: &str = "Mock success: Application not yet connected to Sheets.";

pub const QUICK_REQUEST_DATE: &str = "Quick Request";
pub const QUICK_REQUEST_TIME: &str = "ASAP";

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Stored { submission_id: Uuid },
    /// No sink credentials; nothing was written.
    Mocked,
}

impl SubmissionOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SubmissionOutcome::Stored { .. } => SUCCESS_MESSAGE,
            SubmissionOutcome::Mocked => MOCK_SUCCESS_MESSAGE,
        }
    }
}

#[derive(Clone)]
pub struct SubmissionService {
    sink: Option<Arc<dyn TableSink>>,
    utc_offset: FixedOffset,
}

impl SubmissionService {
    pub fn new(sink: Option<Arc<dyn TableSink>>, utc_offset: FixedOffset) -> Self {
        Self { sink, utc_offset }
    }

    pub fn with_sink(sink: Arc<dyn TableSink>, utc_offset: FixedOffset) -> Self {
        Self::new(Some(sink), utc_offset)
    }

    pub fn mock(utc_offset: FixedOffset) -> Self {
        Self::new(None, utc_offset)
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }

    pub fn is_connected(&self) -> bool {
        self.sink.is_some()
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.as_ref().map(|sink| sink.describe()).unwrap_or("mock")
    }

    /// Expects `fields` to have passed validation for `form_type`.
    pub async fn submit(
        &self,
        form_type: FormType,
        fields: Fields<'_>,
    ) -> Result<SubmissionOutcome> {
        let Some(sink) = &self.sink else {
            warn!(
                form_type = %form_type,
                "Sheet credentials missing. Mocking success for dev/preview."
            );
            return Ok(SubmissionOutcome::Mocked);
        };

        let submission_id = Uuid::new_v4();
        let submitted_at = format_submitted_at(Utc::now(), self.utc_offset);
        let (schema, row) = build_row(form_type, fields, &submitted_at);

        sink.ensure_schema(schema.name, schema.headers).await?;
        sink.append_row(schema.name, &row).await?;

        info!(
            submission_id = %submission_id,
            form_type = %form_type,
            sheet = schema.name,
            "Submission stored"
        );

        Ok(SubmissionOutcome::Stored { submission_id })
    }
}

/// Maps a submission onto its sheet. Quick requests share the appointment sheet
/// with placeholder date and time.
pub fn build_row(
    form_type: FormType,
    fields: Fields<'_>,
    submitted_at: &str,
) -> (SheetSchema, SheetRow) {
    match form_type {
        FormType::Appointment => (
            APPOINTMENTS,
            SheetRow::new()
                .with("Name", sanitize(fields.raw("name")))
                .with("Phone Number", sanitize(fields.raw("phone")))
                .with("Email", sanitize(fields.raw("email")))
                .with("Date", sanitize(fields.raw("date")))
                .with("Time", sanitize(fields.raw("time")))
                .with("Reason", sanitize(fields.raw("reason")))
                .with(SUBMITTED_AT, submitted_at),
        ),
        FormType::Contact => (
            CONTACTS,
            SheetRow::new()
                .with("Name", sanitize(fields.raw("name")))
                .with("Email", sanitize(fields.raw("email")))
                .with("Message", sanitize(fields.raw("message")))
                .with(SUBMITTED_AT, submitted_at),
        ),
        FormType::QuickAppointment => (
            APPOINTMENTS,
            SheetRow::new()
                .with("Name", sanitize(fields.raw("name")))
                .with("Phone Number", sanitize(fields.raw("phone")))
                .with("Email", "")
                .with("Date", QUICK_REQUEST_DATE)
                .with("Time", QUICK_REQUEST_TIME)
                .with("Reason", sanitize(fields.raw("message")))
                .with(SUBMITTED_AT, submitted_at),
        ),
    }
}

/// `en-IN` style local time, e.g. `6/1/2030, 3:05:09 pm`.
pub fn format_submitted_at(now: DateTime<Utc>, offset: FixedOffset) -> String {
    now.with_timezone(&offset)
        .format("%-d/%-m/%Y, %-I:%M:%S %P")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::MemorySheetSink;
    use chrono::TimeZone;
    use serde_json::json;

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(330 * 60).unwrap()
    }

    #[test]
    fn test_submitted_at_uses_fixed_offset() {
        let now = Utc.with_ymd_and_hms(2030, 1, 6, 9, 35, 9).unwrap();
        assert_eq!(format_submitted_at(now, ist()), "6/1/2030, 3:05:09 pm");

        let midnight = Utc.with_ymd_and_hms(2030, 12, 24, 18, 30, 0).unwrap();
        assert_eq!(format_submitted_at(midnight, ist()), "25/12/2030, 12:00:00 am");
    }

    #[test]
    fn test_appointment_row_is_sanitized() {
        let data = json!({
            "name": "  Priya  ",
            "phone": "+91 98765 43210",
            "email": "=HYPERLINK(\"x\")",
            "date": "2030-05-14",
            "time": "10:30 AM",
            "_honey": ""
        });
        let fields = Fields::new(data.as_object().unwrap());
        let (schema, row) = build_row(FormType::Appointment, fields, "now");

        assert_eq!(schema, APPOINTMENTS);
        assert_eq!(row.get("Name"), Some("Priya"));
        assert_eq!(row.get("Phone Number"), Some("'+91 98765 43210"));
        assert_eq!(row.get("Email"), Some("'=HYPERLINK(\"x\")"));
        assert_eq!(row.get("Reason"), Some(""));
        assert_eq!(row.get(SUBMITTED_AT), Some("now"));
        assert_eq!(row.len(), APPOINTMENTS.headers.len());
    }

    #[test]
    fn test_quick_appointment_maps_onto_appointments() {
        let data = json!({ "name": "Asha", "phone": "9876543210", "message": "-call me" });
        let fields = Fields::new(data.as_object().unwrap());
        let (schema, row) = build_row(FormType::QuickAppointment, fields, "now");

        assert_eq!(schema, APPOINTMENTS);
        assert_eq!(
            row.values_for(schema.headers),
            vec!["Asha", "9876543210", "", "Quick Request", "ASAP", "'-call me", "now"]
        );
    }

    #[test]
    fn test_contact_row() {
        let data = json!({ "name": "Ravi", "email": "ravi@example.com", "message": "Hello" });
        let fields = Fields::new(data.as_object().unwrap());
        let (schema, row) = build_row(FormType::Contact, fields, "now");

        assert_eq!(schema, CONTACTS);
        assert_eq!(
            row.values_for(schema.headers),
            vec!["Ravi", "ravi@example.com", "Hello", "now"]
        );
    }

    #[tokio::test]
    async fn test_mock_service_writes_nothing() {
        let service = SubmissionService::mock(ist());
        let data = json!({ "name": "Ravi", "email": "ravi@example.com", "message": "Hello" });

        let outcome = service
            .submit(FormType::Contact, Fields::new(data.as_object().unwrap()))
            .await
            .unwrap();
        assert_eq!(outcome, SubmissionOutcome::Mocked);
        assert_eq!(outcome.message(), MOCK_SUCCESS_MESSAGE);
        assert!(!service.is_connected());
    }

    #[tokio::test]
    async fn test_connected_service_appends_row() {
        let sink = MemorySheetSink::new();
        let service = SubmissionService::with_sink(Arc::new(sink.clone()), ist());
        let data = json!({ "name": "Ravi", "email": "ravi@example.com", "message": "Hello" });

        let outcome = service
            .submit(FormType::Contact, Fields::new(data.as_object().unwrap()))
            .await
            .unwrap();

        assert!(matches!(outcome, SubmissionOutcome::Stored { .. }));
        assert_eq!(sink.ensure_calls(), 1);
        assert_eq!(sink.rows("Contacts").len(), 1);
        assert_eq!(service.sink_name(), "memory");
    }
}
