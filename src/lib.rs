pub mod config;
pub mod crawl;
pub mod fetch;
pub mod record;
pub mod table;

pub use config::{Config, ExportFormat};
pub use crawl::{scrape_catalog, Scrape};
pub use fetch::{HttpFetcher, PageSource};
pub use record::{CatalogRecord, Course, FieldMap, FieldValue, Program, ValidationError};
pub use table::{Columns, Table};
