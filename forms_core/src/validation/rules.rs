//! Field rules shared by the server validator and the client mirror

use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use validator::ValidationError;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const MESSAGE_MIN_CHARS: usize = 2;
pub const MESSAGE_MAX_CHARS: usize = 2000;
pub const NOTE_MAX_CHARS: usize = 500;

lazy_static! {
    static ref NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z\s.'-]+$").unwrap();

    static ref PHONE_SEPARATORS: Regex = Regex::new(r"[\s\-()+]").unwrap();

    static ref PHONE_DIGITS_REGEX: Regex = Regex::new(r"^[0-9]{10,12}$").unwrap();

    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();

    static ref DATE_REGEX: Regex = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap();
}

pub fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// The user-facing text of a rule failure.
pub fn error_message(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|message| message.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

pub fn is_valid_name_characters(value: &str) -> bool {
    NAME_REGEX.is_match(value)
}

/// Drops spaces, hyphens, parentheses and plus signs.
pub fn phone_digits(value: &str) -> String {
    PHONE_SEPARATORS.replace_all(value, "").into_owned()
}

pub fn is_valid_phone_digits(digits: &str) -> bool {
    PHONE_DIGITS_REGEX.is_match(digits)
}

pub fn is_iso_date_format(value: &str) -> bool {
    DATE_REGEX.is_match(value)
}

pub fn validate_name(value: Option<&str>, check_characters: bool) -> Result<(), ValidationError> {
    let name = value.map(str::trim).unwrap_or_default();

    if char_len(name) < NAME_MIN_CHARS {
        return Err(rule_error("name_required", "Name is required (minimum 2 characters)."));
    }

    if char_len(name) > NAME_MAX_CHARS {
        return Err(rule_error("name_too_long", "Name must be under 100 characters."));
    }

    if check_characters && !is_valid_name_characters(name) {
        return Err(rule_error("name_characters", "Name contains invalid characters."));
    }

    Ok(())
}

pub fn validate_phone(value: Option<&str>) -> Result<(), ValidationError> {
    let phone = value.ok_or_else(|| rule_error("phone_required", "Phone number is required."))?;

    if !is_valid_phone_digits(&phone_digits(phone)) {
        return Err(rule_error(
            "phone_format",
            "Enter a valid phone number (10-12 digits).",
        ));
    }

    Ok(())
}

pub fn validate_optional_email(value: Option<&str>) -> Result<(), ValidationError> {
    match value.map(str::trim) {
        Some(email) if !email.is_empty() && !is_valid_email(email) => Err(rule_error(
            "email_format",
            "Please enter a valid email address.",
        )),
        _ => Ok(()),
    }
}

pub fn validate_required_email(value: Option<&str>) -> Result<(), ValidationError> {
    match value.map(str::trim) {
        Some(email) if is_valid_email(email) => Ok(()),
        _ => Err(rule_error("email_required", "A valid email address is required.")),
    }
}

/// Format only. Calendar validity, past dates and closed days are not checked here.
pub fn validate_date(value: Option<&str>) -> Result<(), ValidationError> {
    let date = value.ok_or_else(|| rule_error("date_required", "Date is required."))?;

    if !is_iso_date_format(date) {
        return Err(rule_error("date_format", "Invalid date format."));
    }

    Ok(())
}

pub fn validate_time(value: Option<&str>) -> Result<(), ValidationError> {
    match value.map(str::trim) {
        Some(time) if !time.is_empty() => Ok(()),
        _ => Err(rule_error("time_required", "Time slot is required.")),
    }
}

pub fn validate_message(value: Option<&str>) -> Result<(), ValidationError> {
    let message = value.map(str::trim).unwrap_or_default();

    if char_len(message) < MESSAGE_MIN_CHARS {
        return Err(rule_error("message_required", "Message is required."));
    }

    if char_len(message) > MESSAGE_MAX_CHARS {
        return Err(rule_error("message_too_long", "Message must be under 2000 characters."));
    }

    Ok(())
}

pub fn validate_max_length(
    value: Option<&str>,
    max: usize,
    code: &'static str,
    message: &'static str,
) -> Result<(), ValidationError> {
    match value {
        Some(text) if char_len(text.trim()) > max => Err(rule_error(code, message)),
        _ => Ok(()),
    }
}
