//! Spreadsheet formula-injection neutralization

use serde_json::Value;

const FORMULA_TRIGGERS: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// Trims the value and prefixes a single quote when the result would be read
/// as a formula. Anything that is not a JSON string becomes empty.
pub fn sanitize(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => sanitize_str(text),
        _ => String::new(),
    }
}

pub fn sanitize_str(value: &str) -> String {
    let trimmed = value.trim();

    if trimmed.starts_with(FORMULA_TRIGGERS) {
        format!("'{}", trimmed)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_formula_prefixes_are_neutralized() {
        assert_eq!(sanitize_str("=cmd"), "'=cmd");
        assert_eq!(sanitize_str("  @SUM(1,1)  "), "'@SUM(1,1)");
        assert_eq!(sanitize_str("+911234567890"), "'+911234567890");
        assert_eq!(sanitize_str("-5"), "'-5");
        assert_eq!(sanitize_str("John Doe"), "John Doe");
        assert_eq!(sanitize_str("a=b"), "a=b");
        assert_eq!(sanitize_str(""), "");
    }

    #[test]
    fn test_non_strings_become_empty() {
        assert_eq!(sanitize(Some(&json!(42))), "");
        assert_eq!(sanitize(Some(&json!(null))), "");
        assert_eq!(sanitize(Some(&json!(["=x"]))), "");
        assert_eq!(sanitize(None), "");
        assert_eq!(sanitize(Some(&json!(" =HYPERLINK() "))), "'=HYPERLINK()");
    }

    #[test]
    fn test_second_pass_is_noop() {
        let inputs = [
            "=cmd",
            "  @SUM(1,1)  ",
            "+91 98765 43210",
            "-1",
            "plain text",
            "  spaced  ",
            "'already quoted",
            "",
        ];

        for input in inputs {
            let once = sanitize_str(input);
            assert_eq!(sanitize_str(&once), once, "input: {:?}", input);
        }
    }
}
