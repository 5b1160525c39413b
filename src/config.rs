// src/config.rs

use anyhow::{bail, Context, Result};
use std::{env, path::PathBuf, str::FromStr, time::Duration};
use url::Url;

pub const COURSES_URL: &str = "https://www.mcgill.ca/study/courses/search";
pub const PROGRAMS_URL: &str = "https://www.mcgill.ca/study/programs/search";

const DEFAULT_WORKBOOK_NAME: &str = "McGill";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// File format of each workbook sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// One `.xlsx` file, one worksheet per sheet.
    #[default]
    Xlsx,
    Parquet,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Parquet => "parquet",
            ExportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" => Ok(ExportFormat::Xlsx),
            "parquet" => Ok(ExportFormat::Parquet),
            "csv" => Ok(ExportFormat::Csv),
            other => bail!("unknown export format {:?} (expected xlsx, parquet or csv)", other),
        }
    }
}

/// Runtime settings, read from `CATALOG_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub courses_url: Url,
    pub programs_url: Url,
    pub output_dir: PathBuf,
    pub workbook_name: String,
    pub format: ExportFormat,
    /// Per-request budget; `None` waits forever.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, falling back to defaults for
    /// anything unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = |key: &str, default: &str| -> Result<Url> {
            let raw = lookup(key).unwrap_or_else(|| default.to_string());
            Url::parse(&raw).with_context(|| format!("{} is not a valid URL: {:?}", key, raw))
        };
        let courses_url = url("CATALOG_COURSES_URL", COURSES_URL)?;
        let programs_url = url("CATALOG_PROGRAMS_URL", PROGRAMS_URL)?;

        let format = match lookup("CATALOG_FORMAT") {
            Some(raw) => raw.parse().context("CATALOG_FORMAT")?,
            None => ExportFormat::default(),
        };

        let timeout_secs = match lookup("CATALOG_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("CATALOG_TIMEOUT_SECS is not a number: {:?}", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        Ok(Self {
            courses_url,
            programs_url,
            output_dir: lookup("CATALOG_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            workbook_name: lookup("CATALOG_WORKBOOK_NAME")
                .unwrap_or_else(|| DEFAULT_WORKBOOK_NAME.to_string()),
            format,
            timeout,
            user_agent: lookup("CATALOG_USER_AGENT")
                .unwrap_or_else(|| format!("catalogscraper/{}", env!("CARGO_PKG_VERSION"))),
        })
    }
}
