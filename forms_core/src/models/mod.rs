pub mod submission;

pub use submission::{Fields, FormType, MessageResponse, SubmissionEnvelope, HONEYPOT_FIELD};
