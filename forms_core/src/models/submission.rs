//! Submission envelope and form types

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Hidden field bots tend to fill in.
pub const HONEYPOT_FIELD: &str = "_honey";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    Appointment,
    Contact,
    QuickAppointment,
}

impl FormType {
    pub const ALL: [FormType; 3] = [
        FormType::Appointment,
        FormType::Contact,
        FormType::QuickAppointment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FormType::Appointment => "appointment",
            FormType::Contact => "contact",
            FormType::QuickAppointment => "quick_appointment",
        }
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        FormType::ALL
            .into_iter()
            .find(|form_type| form_type.as_str() == s)
            .ok_or(AppError::InvalidFormType)
    }
}

/// The raw `{ "type": ..., "data": ... }` document, kept untyped until validated.
#[derive(Debug, Clone)]
pub struct SubmissionEnvelope {
    pub form_type: Option<Value>,
    pub data: Option<Value>,
}

impl SubmissionEnvelope {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let document: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::MalformedBody(e.to_string()))?;
        Self::from_value(document)
    }

    /// A `null` document cannot be destructured and is treated like a parse failure.
    /// Any other non-object document simply carries no type and no data.
    pub fn from_value(document: Value) -> Result<Self> {
        match document {
            Value::Null => Err(AppError::MalformedBody("request body is null".to_string())),
            Value::Object(mut object) => Ok(Self {
                form_type: object.remove("type"),
                data: object.remove("data"),
            }),
            _ => Ok(Self {
                form_type: None,
                data: None,
            }),
        }
    }

    pub fn is_honeypot_triggered(&self) -> bool {
        self.data
            .as_ref()
            .and_then(|data| data.get(HONEYPOT_FIELD))
            .map(is_truthy)
            .unwrap_or(false)
    }

    pub fn form_type(&self) -> Result<FormType> {
        match &self.form_type {
            Some(Value::String(name)) => name.parse(),
            _ => Err(AppError::InvalidFormType),
        }
    }

    /// The payload fields, if `data` is an object.
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.data.as_ref().and_then(Value::as_object)
    }
}

/// Loose truthiness for the honeypot: anything a person could have typed counts.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Read-only view over an untrusted field map. Non-string values read as absent.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    pub fn str(&self, name: &str) -> Option<&'a str> {
        self.map.get(name).and_then(Value::as_str)
    }

    /// A present, non-empty string. Empty strings count as missing.
    pub fn non_empty(&self, name: &str) -> Option<&'a str> {
        self.str(name).filter(|value| !value.is_empty())
    }

    pub fn raw(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_type_parsing() {
        assert_eq!("appointment".parse::<FormType>().unwrap(), FormType::Appointment);
        assert_eq!("contact".parse::<FormType>().unwrap(), FormType::Contact);
        assert_eq!(
            "quick_appointment".parse::<FormType>().unwrap(),
            FormType::QuickAppointment
        );
        assert!("Appointment".parse::<FormType>().is_err());
        assert!("".parse::<FormType>().is_err());
    }

    #[test]
    fn test_envelope_rejects_null_and_garbage() {
        assert!(SubmissionEnvelope::from_slice(b"not json").is_err());
        assert!(SubmissionEnvelope::from_slice(b"null").is_err());

        let envelope = SubmissionEnvelope::from_slice(b"42").unwrap();
        assert!(envelope.form_type().is_err());
        assert!(envelope.fields().is_none());
    }

    #[test]
    fn test_envelope_type_must_be_string() {
        let envelope = SubmissionEnvelope::from_value(json!({ "type": 1, "data": {} })).unwrap();
        assert!(matches!(envelope.form_type(), Err(AppError::InvalidFormType)));
    }

    #[test]
    fn test_honeypot_truthiness() {
        let cases = [
            (json!({ "_honey": "" }), false),
            (json!({ "_honey": null }), false),
            (json!({ "_honey": false }), false),
            (json!({ "_honey": 0 }), false),
            (json!({}), false),
            (json!({ "_honey": "x" }), true),
            (json!({ "_honey": true }), true),
            (json!({ "_honey": 7 }), true),
            (json!({ "_honey": [] }), true),
        ];

        for (data, expected) in cases {
            let document = json!({ "type": "contact", "data": data.clone() });
            let envelope = SubmissionEnvelope::from_value(document).unwrap();
            assert_eq!(envelope.is_honeypot_triggered(), expected, "data: {}", data);
        }
    }

    #[test]
    fn test_fields_treat_non_strings_as_absent() {
        let map = json!({ "name": 42, "email": "", "phone": "9876543210" });
        let fields = Fields::new(map.as_object().unwrap());
        assert_eq!(fields.str("name"), None);
        assert_eq!(fields.str("email"), Some(""));
        assert_eq!(fields.non_empty("email"), None);
        assert_eq!(fields.non_empty("phone"), Some("9876543210"));
    }
}
