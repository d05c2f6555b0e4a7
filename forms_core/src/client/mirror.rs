//! Browser-side field checks for the appointment form.
//!
//! These run on every blur/input for quick feedback and are stricter than the
//! server in a few places (Indian mobile prefix, mandatory email, no past dates,
//! closed on Sundays). The server never relies on them.

use crate::validation::{
    is_valid_email, is_valid_name_characters, is_valid_phone_digits, phone_digits, NOTE_MAX_CHARS,
};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Weekday the clinic does not take appointments.
pub const CLOSED_DAY: Weekday = Weekday::Sun;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentField {
    Name,
    Phone,
    Email,
    Date,
    Time,
    Reason,
}

impl AppointmentField {
    /// Fields checked on submit, in display order.
    pub const ALL: [AppointmentField; 6] = [
        AppointmentField::Name,
        AppointmentField::Phone,
        AppointmentField::Email,
        AppointmentField::Date,
        AppointmentField::Time,
        AppointmentField::Reason,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            AppointmentField::Name => "name",
            AppointmentField::Phone => "phone",
            AppointmentField::Email => "email",
            AppointmentField::Date => "date",
            AppointmentField::Time => "time",
            AppointmentField::Reason => "reason",
        }
    }
}

/// Returns the message to show under `field`, if any.
pub fn validate_field(
    field: AppointmentField,
    value: &str,
    today: NaiveDate,
) -> Option<&'static str> {
    match field {
        AppointmentField::Name => check_name(value),
        AppointmentField::Phone => check_phone(value),
        AppointmentField::Email => check_email(value),
        AppointmentField::Date => check_date(value, today),
        AppointmentField::Time => {
            value.is_empty().then_some("Please select a preferred time slot.")
        }
        AppointmentField::Reason => (value.trim().chars().count() > NOTE_MAX_CHARS)
            .then_some("Please keep your message under 500 characters."),
    }
}

fn check_name(value: &str) -> Option<&'static str> {
    let name = value.trim();
    if name.is_empty() {
        Some("Full name is required.")
    } else if name.chars().count() < 2 {
        Some("Name must be at least 2 characters.")
    } else if !is_valid_name_characters(name) {
        Some("Name can only contain letters, spaces, dots, hyphens, and apostrophes.")
    } else {
        None
    }
}

fn check_phone(value: &str) -> Option<&'static str> {
    if value.trim().is_empty() {
        return Some("Phone number is required.");
    }

    let digits = phone_digits(value);
    if !is_valid_phone_digits(&digits) {
        Some("Enter a valid 10-digit phone number.")
    } else if digits.len() == 10 && !digits.starts_with(['6', '7', '8', '9']) {
        Some("Indian phone numbers must start with 6-9.")
    } else {
        None
    }
}

fn check_email(value: &str) -> Option<&'static str> {
    let email = value.trim();
    if email.is_empty() {
        Some("Email is required.")
    } else if !is_valid_email(email) {
        Some("Please enter a valid email address.")
    } else {
        None
    }
}

/// Dates the browser cannot parse are left to the server's format check.
fn check_date(value: &str, today: NaiveDate) -> Option<&'static str> {
    if value.is_empty() {
        return Some("Please select an appointment date.");
    }

    let selected = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    if selected < today {
        Some("Date cannot be in the past.")
    } else if selected.weekday() == CLOSED_DAY {
        Some("Clinic is closed on Sundays. Please pick another day.")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        // A Wednesday.
        NaiveDate::from_ymd_opt(2030, 5, 15).unwrap()
    }

    #[test]
    fn test_phone_prefix_rule() {
        assert_eq!(validate_field(AppointmentField::Phone, "9876543210", today()), None);
        assert_eq!(
            validate_field(AppointmentField::Phone, "1234567890", today()),
            Some("Indian phone numbers must start with 6-9.")
        );
        assert_eq!(validate_field(AppointmentField::Phone, "+91 12345 67890", today()), None);
        assert_eq!(
            validate_field(AppointmentField::Phone, "123", today()),
            Some("Enter a valid 10-digit phone number.")
        );
        assert_eq!(
            validate_field(AppointmentField::Phone, "  ", today()),
            Some("Phone number is required.")
        );
    }

    #[test]
    fn test_date_rules() {
        assert_eq!(validate_field(AppointmentField::Date, "2030-05-15", today()), None);
        assert_eq!(
            validate_field(AppointmentField::Date, "2030-05-14", today()),
            Some("Date cannot be in the past.")
        );
        assert_eq!(
            validate_field(AppointmentField::Date, "2030-05-19", today()),
            Some("Clinic is closed on Sundays. Please pick another day.")
        );
        assert_eq!(
            validate_field(AppointmentField::Date, "", today()),
            Some("Please select an appointment date.")
        );
        assert_eq!(validate_field(AppointmentField::Date, "not-a-date", today()), None);
    }

    #[test]
    fn test_email_is_required_on_the_client() {
        assert_eq!(
            validate_field(AppointmentField::Email, "", today()),
            Some("Email is required.")
        );
        assert_eq!(
            validate_field(AppointmentField::Email, "a@b", today()),
            Some("Please enter a valid email address.")
        );
        assert_eq!(validate_field(AppointmentField::Email, "a@b.in", today()), None);
    }

    #[test]
    fn test_name_and_reason() {
        assert_eq!(
            validate_field(AppointmentField::Name, "", today()),
            Some("Full name is required.")
        );
        assert_eq!(
            validate_field(AppointmentField::Name, "A", today()),
            Some("Name must be at least 2 characters.")
        );
        assert_eq!(
            validate_field(AppointmentField::Name, "Anu 2", today()),
            Some("Name can only contain letters, spaces, dots, hyphens, and apostrophes.")
        );
        assert_eq!(validate_field(AppointmentField::Reason, "", today()), None);
        assert!(validate_field(AppointmentField::Reason, &"x".repeat(501), today()).is_some());
    }
}
