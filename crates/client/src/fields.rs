//! Typed reads out of a record's `fieldData`.
//!
//! FileMaker returns text fields as strings and number fields as JSON numbers,
//! but calculated fields may come back as either. Empty strings mean "unset".

use api_types::FieldData;
use serde_json::Value;

pub(crate) trait FieldDataExt {
    fn text(&self, name: &str) -> Option<String>;
    fn number(&self, name: &str) -> Option<f64>;

    fn mapped_text(&self, name: Option<&str>) -> Option<String> {
        name.and_then(|name| self.text(name))
    }

    fn mapped_number(&self, name: Option<&str>) -> Option<f64> {
        name.and_then(|name| self.number(name))
    }
}

impl FieldDataExt for FieldData {
    fn text(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }

    fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}
