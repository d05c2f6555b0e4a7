//! Server-side validation and sanitization of form submissions

pub mod rules;
pub mod sanitize;

pub use rules::*;
pub use sanitize::{sanitize, sanitize_str};

use crate::models::{Fields, FormType};
use serde::Serialize;
use serde_json::Value;
use validator::ValidationError;

pub const INVALID_REQUEST_DATA: &str = "Invalid request data.";

/// Ordered list of user-facing errors. Empty means valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    errors: Vec<String>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self::default()
    }

    pub fn invalid_request() -> Self {
        Self {
            errors: vec![INVALID_REQUEST_DATA.to_string()],
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    pub fn check(&mut self, outcome: Result<(), ValidationError>) {
        if let Err(error) = outcome {
            self.errors.push(error_message(&error));
        }
    }

    pub fn message(&self) -> String {
        self.errors.join(" ")
    }
}

/// Runs every rule of `form_type` against `data`. The payload must be a JSON object.
pub fn validate(form_type: FormType, data: Option<&Value>) -> ValidationResult {
    let Some(map) = data.and_then(Value::as_object) else {
        return ValidationResult::invalid_request();
    };
    let fields = Fields::new(map);

    match form_type {
        FormType::Appointment => validate_appointment(fields),
        FormType::Contact => validate_contact(fields),
        FormType::QuickAppointment => validate_quick_appointment(fields),
    }
}

fn validate_appointment(fields: Fields<'_>) -> ValidationResult {
    let mut result = ValidationResult::success();

    result.check(validate_name(fields.str("name"), true));
    result.check(validate_phone(fields.non_empty("phone")));
    result.check(validate_optional_email(fields.str("email")));
    result.check(validate_date(fields.non_empty("date")));
    result.check(validate_time(fields.str("time")));
    result.check(validate_max_length(
        fields.str("reason"),
        NOTE_MAX_CHARS,
        "reason_too_long",
        "Reason must be under 500 characters.",
    ));

    result
}

fn validate_contact(fields: Fields<'_>) -> ValidationResult {
    let mut result = ValidationResult::success();

    result.check(validate_name(fields.str("name"), false));
    result.check(validate_required_email(fields.str("email")));
    result.check(validate_message(fields.str("message")));

    result
}

fn validate_quick_appointment(fields: Fields<'_>) -> ValidationResult {
    let mut result = ValidationResult::success();

    result.check(validate_name(fields.str("name"), false));
    result.check(validate_phone(fields.non_empty("phone")));
    result.check(validate_max_length(
        fields.str("message"),
        NOTE_MAX_CHARS,
        "message_too_long",
        "Message must be under 500 characters.",
    ));

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_appointment() -> Value {
        json!({
            "name": "Priya Sharma",
            "phone": "+91 98765 43210",
            "email": "priya@example.com",
            "date": "2030-05-14",
            "time": "10:30 AM",
            "reason": "Routine check-up",
            "_honey": ""
        })
    }

    #[test]
    fn test_valid_payloads_have_no_errors() {
        assert!(validate(FormType::Appointment, Some(&valid_appointment())).is_valid());

        let contact = json!({
            "name": "Ravi",
            "email": "ravi@example.com",
            "message": "Hello there"
        });
        assert!(validate(FormType::Contact, Some(&contact)).is_valid());

        let quick = json!({ "name": "Asha", "phone": "9876543210" });
        assert!(validate(FormType::QuickAppointment, Some(&quick)).is_valid());
    }

    #[test]
    fn test_non_object_payload_short_circuits() {
        for data in [json!("text"), json!([1, 2]), json!(null), json!(5)] {
            let result = validate(FormType::Contact, Some(&data));
            assert_eq!(result.errors(), [INVALID_REQUEST_DATA]);
        }
        assert_eq!(
            validate(FormType::Appointment, None).errors(),
            [INVALID_REQUEST_DATA]
        );
    }

    #[test]
    fn test_appointment_collects_all_errors_in_order() {
        let data = json!({
            "name": "J",
            "phone": "123",
            "email": "nope",
            "date": "14/05/2030",
            "time": " ",
            "reason": "r".repeat(501)
        });

        let result = validate(FormType::Appointment, Some(&data));
        assert_eq!(
            result.errors(),
            [
                "Name is required (minimum 2 characters).",
                "Enter a valid phone number (10-12 digits).",
                "Please enter a valid email address.",
                "Invalid date format.",
                "Time slot is required.",
                "Reason must be under 500 characters.",
            ]
        );
    }

    #[test]
    fn test_appointment_missing_fields() {
        let result = validate(FormType::Appointment, Some(&json!({})));
        assert_eq!(
            result.errors(),
            [
                "Name is required (minimum 2 characters).",
                "Phone number is required.",
                "Date is required.",
                "Time slot is required.",
            ]
        );
    }

    #[test]
    fn test_appointment_non_string_fields_are_invalid() {
        let mut data = valid_appointment();
        data["phone"] = json!(9876543210u64);
        data["date"] = json!(true);

        let result = validate(FormType::Appointment, Some(&data));
        assert_eq!(result.errors(), ["Phone number is required.", "Date is required."]);
    }

    #[test]
    fn test_server_does_not_enforce_client_only_rules() {
        let mut data = valid_appointment();
        data["phone"] = json!("1234567890");
        data["date"] = json!("2000-01-02");
        data["email"] = json!("");

        assert!(validate(FormType::Appointment, Some(&data)).is_valid());
    }

    #[test]
    fn test_contact_errors() {
        let data = json!({ "name": "A", "email": "bad", "message": "hi" });
        let result = validate(FormType::Contact, Some(&data));
        assert_eq!(
            result.errors(),
            ["Name is required (minimum 2 characters).", "A valid email address is required."]
        );

        let data = json!({ "name": "A", "email": "bad", "message": "h" });
        let result = validate(FormType::Contact, Some(&data));
        assert!(result.errors().contains(&"Message is required.".to_string()));
        assert_eq!(result.errors().len(), 3);
    }

    #[test]
    fn test_contact_name_has_no_character_rule() {
        let data = json!({ "name": "R2-D2 ✨", "email": "r2@example.com", "message": "beep" });
        assert!(validate(FormType::Contact, Some(&data)).is_valid());
    }

    #[test]
    fn test_quick_appointment_message_limit() {
        let data = json!({ "name": "Asha", "phone": "9876543210", "message": "m".repeat(501) });
        let result = validate(FormType::QuickAppointment, Some(&data));
        assert_eq!(result.message(), "Message must be under 500 characters.");
    }
}
