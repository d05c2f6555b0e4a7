use std::collections::HashMap;

pub const SUBMITTED_AT: &str = "Submitted At";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetSchema {
    pub name: &'static str,
    pub headers: &'static [&'static str],
}

pub const APPOINTMENTS: SheetSchema = SheetSchema {
    name: "Appointments",
    headers: &["Name", "Phone Number", "Email", "Date", "Time", "Reason", SUBMITTED_AT],
};

pub const CONTACTS: SheetSchema = SheetSchema {
    name: "Contacts",
    headers: &["Name", "Email", "Message", SUBMITTED_AT],
};

/// Header-keyed cell values for a single append.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    cells: HashMap<String, String>,
}

impl SheetRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, header: &str, value: impl Into<String>) -> Self {
        self.cells.insert(header.to_string(), value.into());
        self
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells.get(header).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Values laid out in header order; unknown headers read as empty cells.
    pub fn values_for<S: AsRef<str>>(&self, headers: &[S]) -> Vec<String> {
        headers
            .iter()
            .map(|header| self.get(header.as_ref()).unwrap_or_default().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_follow_header_order() {
        let row = SheetRow::new()
            .with("Message", "Hello")
            .with("Name", "Ravi")
            .with(SUBMITTED_AT, "01/01/2030, 9:00:00 am");

        assert_eq!(
            row.values_for(CONTACTS.headers),
            vec!["Ravi", "", "Hello", "01/01/2030, 9:00:00 am"]
        );
    }

    #[test]
    fn test_schemas_end_with_timestamp() {
        for schema in [APPOINTMENTS, CONTACTS] {
            assert_eq!(schema.headers.last(), Some(&SUBMITTED_AT));
        }
    }
}
