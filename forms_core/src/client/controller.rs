//! Form state and submit flow behind the clinic site's forms

use super::mirror::{validate_field, AppointmentField};
use super::transport::{SubmissionRequest, SubmissionTransport, TransportResponse};
use crate::models::{FormType, MessageResponse, HONEYPOT_FIELD};
use chrono::{Local, NaiveDate};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

pub const FIX_ERRORS_MESSAGE: &str = "Please fix the errors above before submitting.";
pub const APPOINTMENT_BOOKED_MESSAGE: &str =
    "Appointment booked successfully! We will call you to confirm.";
pub const MESSAGE_SENT_MESSAGE: &str = "Message sent successfully! We will get back to you soon.";
pub const QUICK_REQUEST_MESSAGE: &str = "Request received! We will call you shortly.";
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";
pub const SERVER_UNAVAILABLE_MESSAGE: &str = "Server is not available. Please try again later.";
pub const UNEXPECTED_RESPONSE_MESSAGE: &str = "Unexpected server response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormStatus {
    pub loading: bool,
    pub message: String,
    pub kind: Option<StatusKind>,
}

impl FormStatus {
    fn set(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.kind = Some(kind);
        self.message = message.into();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub date: String,
    pub time: String,
    pub reason: String,
    /// Hidden from people; only bots fill it.
    pub honey: String,
}

impl AppointmentForm {
    pub fn get(&self, field: AppointmentField) -> &str {
        match field {
            AppointmentField::Name => &self.name,
            AppointmentField::Phone => &self.phone,
            AppointmentField::Email => &self.email,
            AppointmentField::Date => &self.date,
            AppointmentField::Time => &self.time,
            AppointmentField::Reason => &self.reason,
        }
    }

    pub fn set(&mut self, field: AppointmentField, value: impl Into<String>) {
        let value = value.into();
        match field {
            AppointmentField::Name => self.name = value,
            AppointmentField::Phone => self.phone = value,
            AppointmentField::Email => self.email = value,
            AppointmentField::Date => self.date = value,
            AppointmentField::Time => self.time = value,
            AppointmentField::Reason => self.reason = value,
        }
    }

    fn to_request(&self) -> SubmissionRequest {
        SubmissionRequest {
            form_type: FormType::Appointment,
            data: json!({
                "name": self.name,
                "phone": self.phone,
                "email": self.email,
                "date": self.date,
                "time": self.time,
                "reason": self.reason,
                HONEYPOT_FIELD: self.honey,
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuickAppointmentForm {
    pub name: String,
    pub phone: String,
    pub message: String,
    pub honey: String,
}

type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Holds the three forms and talks to the endpoint through `T`.
pub struct FormController<T: SubmissionTransport> {
    transport: T,
    today: Today,
    pub appointment: AppointmentForm,
    pub appointment_errors: BTreeMap<AppointmentField, String>,
    pub appointment_touched: BTreeSet<AppointmentField>,
    pub appointment_status: FormStatus,
    pub contact: ContactForm,
    pub contact_status: FormStatus,
    pub quick: QuickAppointmentForm,
    pub quick_status: FormStatus,
}

impl<T: SubmissionTransport> FormController<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            today: Arc::new(|| Local::now().date_naive()),
            appointment: AppointmentForm::default(),
            appointment_errors: BTreeMap::new(),
            appointment_touched: BTreeSet::new(),
            appointment_status: FormStatus::default(),
            contact: ContactForm::default(),
            contact_status: FormStatus::default(),
            quick: QuickAppointmentForm::default(),
            quick_status: FormStatus::default(),
        }
    }

    /// Pins the date used by the past-date check.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Arc::new(move || today);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn error(&self, field: AppointmentField) -> Option<&str> {
        self.appointment_errors.get(&field).map(String::as_str)
    }

    /// Re-checks one field and records its message. Returns true when valid.
    pub fn validate_field(&mut self, field: AppointmentField) -> bool {
        let today = (self.today)();
        match validate_field(field, self.appointment.get(field), today) {
            Some(message) => {
                self.appointment_errors.insert(field, message.to_string());
                false
            }
            None => {
                self.appointment_errors.remove(&field);
                true
            }
        }
    }

    /// Blur handler.
    pub fn touch_field(&mut self, field: AppointmentField) {
        self.appointment_touched.insert(field);
        self.validate_field(field);
    }

    /// Input handler: only fields the user already left are re-validated.
    pub fn on_field_input(&mut self, field: AppointmentField, value: impl Into<String>) {
        self.appointment.set(field, value);
        if self.appointment_touched.contains(&field) {
            self.validate_field(field);
        }
    }

    pub fn validate_all_fields(&mut self) -> bool {
        let mut all_valid = true;
        for field in AppointmentField::ALL {
            if field != AppointmentField::Reason {
                self.appointment_touched.insert(field);
            }
            all_valid &= self.validate_field(field);
        }
        all_valid
    }

    pub async fn submit_appointment(&mut self) -> &FormStatus {
        if !self.validate_all_fields() {
            self.appointment_status.set(StatusKind::Error, FIX_ERRORS_MESSAGE);
            return &self.appointment_status;
        }

        self.appointment_status.loading = true;
        self.appointment_status.message.clear();

        let request = self.appointment.to_request();
        match self.send(&request, "Failed to book appointment").await {
            Ok(_) => {
                self.appointment_status.set(StatusKind::Success, APPOINTMENT_BOOKED_MESSAGE);
                self.appointment = AppointmentForm::default();
                self.appointment_errors.clear();
                self.appointment_touched.clear();
            }
            Err(message) => self.appointment_status.set(StatusKind::Error, message),
        }

        self.appointment_status.loading = false;
        &self.appointment_status
    }

    /// Contact failures always show the same generic text.
    pub async fn submit_contact(&mut self) -> &FormStatus {
        self.contact_status.loading = true;
        self.contact_status.message.clear();

        let request = SubmissionRequest {
            form_type: FormType::Contact,
            data: json!({
                "name": self.contact.name,
                "email": self.contact.email,
                "message": self.contact.message,
            }),
        };

        match self.send(&request, "Failed to send message").await {
            Ok(_) => {
                self.contact_status.set(StatusKind::Success, MESSAGE_SENT_MESSAGE);
                self.contact = ContactForm::default();
            }
            Err(message) => {
                warn!(error = %message, "Contact submission failed");
                self.contact_status.set(StatusKind::Error, GENERIC_ERROR_MESSAGE);
            }
        }

        self.contact_status.loading = false;
        &self.contact_status
    }

    /// No client-side checks; the server's message is shown as-is on failure.
    pub async fn submit_quick_appointment(&mut self) -> &FormStatus {
        self.quick_status.loading = true;
        self.quick_status.message.clear();

        let request = SubmissionRequest {
            form_type: FormType::QuickAppointment,
            data: json!({
                "name": self.quick.name,
                "phone": self.quick.phone,
                "message": self.quick.message,
                HONEYPOT_FIELD: self.quick.honey,
            }),
        };

        match self.send(&request, "Failed to send request").await {
            Ok(_) => {
                self.quick_status.set(StatusKind::Success, QUICK_REQUEST_MESSAGE);
                self.quick = QuickAppointmentForm::default();
            }
            Err(message) => self.quick_status.set(StatusKind::Error, message),
        }

        self.quick_status.loading = false;
        &self.quick_status
    }

    async fn send(&self, request: &SubmissionRequest, fallback: &str) -> Result<String, String> {
        let response = self.transport.send(request).await.map_err(|e| {
            debug!(error = %e, "Transport failure");
            GENERIC_ERROR_MESSAGE.to_string()
        })?;

        interpret_response(&response, fallback)
    }
}

/// Non-JSON bodies (e.g. a dev server's HTML 404) never reach the user verbatim.
pub fn interpret_response(response: &TransportResponse, fallback: &str) -> Result<String, String> {
    if !response.is_json() {
        return Err(if response.is_success() {
            UNEXPECTED_RESPONSE_MESSAGE.to_string()
        } else {
            SERVER_UNAVAILABLE_MESSAGE.to_string()
        });
    }

    let message = serde_json::from_str::<MessageResponse>(&response.body)
        .ok()
        .map(|body| body.message)
        .filter(|message| !message.is_empty());

    if response.is_success() {
        Ok(message.unwrap_or_default())
    } else {
        Err(message.unwrap_or_else(|| fallback.to_string()))
    }
}
