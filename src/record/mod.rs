// src/record/mod.rs

pub mod course;
pub mod credits;
pub mod program;
pub mod validate;

pub use course::Course;
pub use credits::get_credits;
pub use program::Program;
pub use validate::{validate_info, ValidationError};

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Selectors shared by the course and program listings.
pub(crate) static FACULTY: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("span.views-field-field-faculty-code span").expect("faculty selector")
});
pub(crate) static DEPARTMENT: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("span.views-field-field-dept-code span").expect("department selector")
});

/// Declared type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// A single extracted value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// `None` when the selector matched nothing on the listing.
    Text(Option<String>),
    Number(f64),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Number(_) => FieldKind::Number,
        }
    }

    /// Absent or empty text. Numbers, zero included, are never missing.
    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Text(v) => v.as_deref().map_or(true, str::is_empty),
            FieldValue::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(v) => v.as_deref(),
            FieldValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(Some(s)) => serializer.serialize_str(s),
            FieldValue::Text(None) => serializer.serialize_none(),
            FieldValue::Number(n) => serializer.serialize_f64(*n),
        }
    }
}

/// Ordered field name → value mapping for one listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(&'static str, FieldValue)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: FieldValue) -> Self {
        self.entries.push((name, value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Serialized as a JSON object in field order.
impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A catalog record type with a fixed, ordered field schema.
///
/// Implementors describe how one `div.views-row` listing is turned into a
/// typed record, and how that record flattens back into a [`FieldMap`] whose
/// keys follow [`CatalogRecord::FIELDS`] exactly.
pub trait CatalogRecord: Sized {
    /// Sheet name used for reporting and export.
    const SHEET: &'static str;
    /// Field names and kinds, in column order.
    const FIELDS: &'static [(&'static str, FieldKind)];

    /// Pull every field out of one listing row. Never fails; missing
    /// elements become absent values.
    fn extract(row: ElementRef<'_>) -> Self;

    fn field_map(&self) -> FieldMap;
}

/// Extract one listing and validate it. The error, if any, is diagnostic only.
pub fn extract_listing<R: CatalogRecord>(row: ElementRef<'_>) -> (FieldMap, Option<ValidationError>) {
    let data = R::extract(row).field_map();
    let error = validate_info(&data).err();
    (data, error)
}

/// Trimmed text of the first element under `row` matching `selector`.
pub(crate) fn select_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}
