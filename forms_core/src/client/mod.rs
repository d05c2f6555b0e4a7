//! Client-side form controller: the UI shell's view of the submission pipeline

pub mod controller;
pub mod mirror;
pub mod transport;

pub use controller::{
    AppointmentForm, ContactForm, FormController, FormStatus, QuickAppointmentForm, StatusKind,
};
pub use mirror::{validate_field, AppointmentField};
pub use transport::{
    HttpTransport, SubmissionRequest, SubmissionTransport, TransportError, TransportResponse,
};
