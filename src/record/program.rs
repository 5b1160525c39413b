// src/record/program.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

use super::{
    get_credits, select_text, CatalogRecord, FieldKind, FieldMap, FieldValue, DEPARTMENT, FACULTY,
};

static TITLE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.views-field.views-field-field-calendar-title a")
        .expect("program title selector")
});
static LEVEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("span.views-field-field-level-code span").expect("program level selector")
});
static DEGREE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("span.views-field-field-degree-code span").expect("degree selector")
});

/// One listing from the program search.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: Option<String>,
    pub faculty: Option<String>,
    pub department: Option<String>,
    pub level: Option<String>,
    pub degree: Option<String>,
    pub credits: f64,
}

impl CatalogRecord for Program {
    const SHEET: &'static str = "Programs";
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("Name", FieldKind::Text),
        ("Faculty", FieldKind::Text),
        ("Department", FieldKind::Text),
        ("Level", FieldKind::Text),
        ("Degree", FieldKind::Text),
        ("Credits", FieldKind::Number),
    ];

    fn extract(row: ElementRef<'_>) -> Self {
        let name = select_text(row, &TITLE);
        let credits = name.as_deref().map_or(0.0, get_credits);
        Program {
            name,
            faculty: select_text(row, &FACULTY),
            department: select_text(row, &DEPARTMENT),
            level: select_text(row, &LEVEL),
            degree: select_text(row, &DEGREE),
            credits,
        }
    }

    fn field_map(&self) -> FieldMap {
        FieldMap::new()
            .with("Name", FieldValue::Text(self.name.clone()))
            .with("Faculty", FieldValue::Text(self.faculty.clone()))
            .with("Department", FieldValue::Text(self.department.clone()))
            .with("Level", FieldValue::Text(self.level.clone()))
            .with("Degree", FieldValue::Text(self.degree.clone()))
            .with("Credits", FieldValue::Number(self.credits))
    }
}
