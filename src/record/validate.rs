// src/record/validate.rs

use thiserror::Error;

use super::FieldMap;

/// Soft, per-listing diagnostic: some fields came back absent or empty.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Could not find data for {}. Data: {}", joined(.fields), render(.data))]
pub struct ValidationError {
    /// Offending field names, in schema order.
    pub fields: Vec<&'static str>,
    /// The full record, for diagnosis.
    pub data: FieldMap,
}

fn joined(fields: &[&str]) -> String {
    fields.join(",")
}

fn render(data: &FieldMap) -> String {
    serde_json::to_string(data).unwrap_or_else(|_| format!("{:?}", data))
}

/// Flag every text field that is absent or empty. Numeric fields always pass.
pub fn validate_info(info: &FieldMap) -> Result<(), ValidationError> {
    let fields: Vec<&'static str> = info
        .iter()
        .filter(|(_, v)| v.is_missing())
        .map(|(k, _)| k)
        .collect();

    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError {
            fields,
            data: info.clone(),
        })
    }
}
