// src/record/course.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

use super::{
    get_credits, select_text, CatalogRecord, FieldKind, FieldMap, FieldValue, DEPARTMENT, FACULTY,
};

static TITLE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.views-field-field-course-title-long a").expect("course title selector")
});
static LEVEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.views-field-level span").expect("course level selector"));

/// One listing from the course search.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub name: Option<String>,
    pub faculty: Option<String>,
    pub department: Option<String>,
    pub level: Option<String>,
    pub credits: f64,
}

impl CatalogRecord for Course {
    const SHEET: &'static str = "Courses";
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("Name", FieldKind::Text),
        ("Faculty", FieldKind::Text),
        ("Department", FieldKind::Text),
        ("Level", FieldKind::Text),
        ("Credits", FieldKind::Number),
    ];

    fn extract(row: ElementRef<'_>) -> Self {
        let name = select_text(row, &TITLE);
        let credits = name.as_deref().map_or(0.0, get_credits);
        Course {
            name,
            faculty: select_text(row, &FACULTY),
            department: select_text(row, &DEPARTMENT),
            level: select_text(row, &LEVEL),
            credits,
        }
    }

    fn field_map(&self) -> FieldMap {
        FieldMap::new()
            .with("Name", FieldValue::Text(self.name.clone()))
            .with("Faculty", FieldValue::Text(self.faculty.clone()))
            .with("Department", FieldValue::Text(self.department.clone()))
            .with("Level", FieldValue::Text(self.level.clone()))
            .with("Credits", FieldValue::Number(self.credits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::extract_listing;
    use scraper::Html;

    const ROW: &str = r#"
<div class="views-row views-row-1">
  <div class="views-field views-field-field-course-title-long">
    <h4 class="field-content"><a href="/study/courses/comp-202">COMP 202 Foundations of Programming (3 credits)</a></h4>
  </div>
  <span class="views-field views-field-field-faculty-code"><span class="field-content">Faculty of Science</span></span>
  <span class="views-field views-field-field-dept-code"><span class="field-content">Computer Science</span></span>
  <span class="views-field views-field-level"><span class="field-content"> Undergraduate </span></span>
</div>"#;

    fn first_row(doc: &Html) -> ElementRef<'_> {
        let sel = Selector::parse("div.views-row").unwrap();
        doc.select(&sel).next().unwrap()
    }

    #[test]
    fn extracts_every_field() {
        let doc = Html::parse_fragment(ROW);
        let course = Course::extract(first_row(&doc));
        assert_eq!(
            course,
            Course {
                name: Some("COMP 202 Foundations of Programming (3 credits)".into()),
                faculty: Some("Faculty of Science".into()),
                department: Some("Computer Science".into()),
                level: Some("Undergraduate".into()),
                credits: 3.0,
            }
        );
    }

    #[test]
    fn field_map_follows_schema() {
        let doc = Html::parse_fragment(ROW);
        let (data, error) = extract_listing::<Course>(first_row(&doc));
        assert!(error.is_none());
        let keys: Vec<_> = data.keys().collect();
        let schema: Vec<_> = Course::FIELDS.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, schema);
    }

    #[test]
    fn missing_element_is_reported() {
        let html = ROW.replace("views-field-field-dept-code", "views-field-other");
        let doc = Html::parse_fragment(&html);
        let (data, error) = extract_listing::<Course>(first_row(&doc));
        assert_eq!(data.get("Department"), Some(&FieldValue::Text(None)));
        assert_eq!(error.unwrap().fields, vec!["Department"]);
    }
}
