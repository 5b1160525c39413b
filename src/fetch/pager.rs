// src/fetch/pager.rs

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::trace;
use url::Url;

static PAGER_LAST: Lazy<Selector> =
    Lazy::new(|| Selector::parse("li.pager-last.last").expect("pager selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("link selector"));

/// Zero-based index of the final page, read from the pager's "last" link.
///
/// The link is resolved against `base`, and its `page` query parameter must
/// be present and numeric. Anything else means the markup isn't what we
/// expect, so the crawl can't continue.
pub fn last_page_number(document: &Html, base: &Url) -> Result<usize> {
    let pager = document
        .select(&PAGER_LAST)
        .next()
        .context("pager control `li.pager-last.last` not found")?;
    let href = pager
        .select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .context("last-page link has no href")?;
    let target = base
        .join(href)
        .with_context(|| format!("resolving last-page link {:?}", href))?;
    let page = target
        .query_pairs()
        .find(|(k, _)| k == "page")
        .map(|(_, v)| v.into_owned())
        .with_context(|| format!("no page parameter in {}", target))?;
    trace!(%target, page = %page, "found last-page link");

    page.trim()
        .parse()
        .with_context(|| format!("non-numeric page parameter {:?} in {}", page, target))
}

/// `{base}?page={n}`, replacing any query already on `base`.
pub fn page_url(base: &Url, page: usize) -> Url {
    let mut url = base.clone();
    url.set_query(Some(&format!("page={}", page)));
    url
}
