// src/crawl/mod.rs

use anyhow::{Context, Result};
use scraper::Html;
use tracing::{debug, info, instrument};
use url::Url;

use crate::fetch::{last_page_number, page_url, PageSource};
use crate::record::{CatalogRecord, ValidationError};
use crate::table::{Columns, Table};

pub mod page;

pub use page::{aggregate_page, PageResult};

/// All pages merged, in page order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    pub columns: Columns,
    pub errors: Vec<ValidationError>,
}

impl AggregateResult {
    pub fn empty<R: CatalogRecord>() -> Self {
        Self {
            columns: Columns::for_record::<R>(),
            errors: Vec::new(),
        }
    }

    /// Append one page's rows and errors after everything seen so far.
    pub fn merge(&mut self, page: PageResult) -> Result<()> {
        self.columns.append(page.columns)?;
        self.errors.extend(page.errors);
        Ok(())
    }
}

/// Walk every page of a paginated listing.
///
/// `document` is the already-fetched first page; it is only used to find the
/// last page index. Pages `0..=last` are then fetched from `source` one at a
/// time. Any fetch failure aborts the whole crawl.
#[instrument(level = "info", skip_all, fields(sheet = R::SHEET, base = %base))]
pub fn crawl_pages<R, S>(document: &Html, base: &Url, source: &S) -> Result<AggregateResult>
where
    R: CatalogRecord,
    S: PageSource + ?Sized,
{
    let last_page = last_page_number(document, base)
        .with_context(|| format!("finding last page of {}", base))?;
    info!(last_page, "discovered pagination");

    let mut all = AggregateResult::empty::<R>();
    for page_num in 0..=last_page {
        let url = page_url(base, page_num);
        info!("Page {} / {}", page_num, last_page);

        let body = source.fetch(&url)?;
        let page_doc = Html::parse_document(&body);
        let page = aggregate_page::<R>(&page_doc).with_context(|| format!("aggregating {}", url))?;
        debug!(
            page = page_num,
            rows = page.columns.len(),
            errors = page.errors.len(),
            "page aggregated"
        );
        all.merge(page)?;
    }

    Ok(all)
}

/// Outcome of scraping one catalog.
#[derive(Debug, Clone)]
pub struct Scrape {
    pub sheet: &'static str,
    pub table: Table,
    pub errors: Vec<ValidationError>,
}

/// Fetch the catalog's landing page, crawl every page, and assemble the table.
pub fn scrape_catalog<R, S>(source: &S, base: &Url) -> Result<Scrape>
where
    R: CatalogRecord,
    S: PageSource + ?Sized,
{
    info!("Getting {}...", R::SHEET.to_lowercase());
    let body = source.fetch(base)?;
    let document = Html::parse_document(&body);

    let aggregate = crawl_pages::<R, S>(&document, base, source)?;
    let table = Table::from_columns(&aggregate.columns)?;
    debug!(errors = aggregate.errors.len(), "catalog assembled");

    Ok(Scrape {
        sheet: R::SHEET,
        table,
        errors: aggregate.errors,
    })
}
