use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The fields of the new bill form. The serialized name of each variant is the stable identifier
/// (`data-testid`) the host page gives the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormField {
    ExpenseType,
    ExpenseName,
    #[serde(rename = "datepicker")]
    Date,
    Amount,
    Vat,
    Pct,
    Commentary,
    File,
}

serde_plain::derive_display_from_serialize!(FormField);
serde_plain::derive_fromstr_from_deserialize!(FormField);

/// The raw string values of the form at the moment it is submitted. A field that the host page
/// did not provide reads as an empty string, as an empty input would.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues(HashMap<FormField, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `set`.
    pub fn with(mut self, field: FormField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: FormField, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }

    pub fn get(&self, field: FormField) -> &str {
        self.0.get(&field).map(String::as_str).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_field_identifiers() {
        assert_eq!(FormField::ExpenseType.to_string(), "expense-type");
        assert_eq!(FormField::ExpenseName.to_string(), "expense-name");
        assert_eq!(FormField::Date.to_string(), "datepicker");
        assert_eq!(FormField::from_str("pct").unwrap(), FormField::Pct);
    }

    #[test]
    fn test_missing_field_reads_empty() {
        let values = FormValues::new().with(FormField::Vat, "70");
        assert_eq!(values.get(FormField::Vat), "70");
        assert_eq!(values.get(FormField::Commentary), "");
    }
}
