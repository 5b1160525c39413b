// src/crawl/page.rs

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::trace;

use crate::record::{extract_listing, CatalogRecord, ValidationError};
use crate::table::Columns;

static ROW: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.views-row").expect("listing row selector"));

/// One page's worth of listings.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub columns: Columns,
    pub errors: Vec<ValidationError>,
}

/// Extract every listing row on a page.
///
/// Every row lands in the columns, valid or not. Rows that fail validation
/// also leave their error behind.
pub fn aggregate_page<R: CatalogRecord>(document: &Html) -> Result<PageResult> {
    let mut columns = Columns::for_record::<R>();
    let mut errors = Vec::new();

    for (idx, row) in document.select(&ROW).enumerate() {
        let (data, error) = extract_listing::<R>(row);
        if let Some(err) = error {
            trace!(row = idx, error = %err, "incomplete listing");
            errors.push(err);
        }
        columns
            .push(&data)
            .with_context(|| format!("listing row {} does not fit the {} schema", idx, R::SHEET))?;
    }

    Ok(PageResult { columns, errors })
}
