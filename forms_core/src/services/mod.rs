pub mod submission_service;

pub use submission_service::{
    SubmissionOutcome, SubmissionService, MOCK_SUCCESS_MESSAGE, SUCCESS_MESSAGE,
};
