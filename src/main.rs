use anyhow::Result;
use catalogscraper::{
    scrape_catalog,
    table::{write_workbook, Sheet},
    Config, Course, HttpFetcher, Program, Scrape,
};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,catalogscraper=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    let start = Instant::now();
    info!("startup");

    // ─── 2) configure ────────────────────────────────────────────────
    let config = Config::from_env()?;
    info!(?config, "loaded config");
    let fetcher = HttpFetcher::from_config(&config)?;

    // ─── 3) crawl both catalogs ──────────────────────────────────────
    let courses = scrape_catalog::<Course, _>(&fetcher, &config.courses_url)?;
    println!("{} courses found", courses.table.num_rows());
    println!("--------------------------------");
    let programs = scrape_catalog::<Program, _>(&fetcher, &config.programs_url)?;
    println!("{} programs found", programs.table.num_rows());
    println!("--------------------------------");

    // ─── 4) write the workbook ───────────────────────────────────────
    let sheets = [sheet(&courses), sheet(&programs)];
    let out = write_workbook(
        &config.output_dir,
        &config.workbook_name,
        config.format,
        &sheets,
    )?;
    info!("wrote workbook → {}", out.display());

    // ─── 5) report soft errors ───────────────────────────────────────
    report("course", &courses);
    report("program", &programs);

    println!("Done");
    println!("Operation took {:.4} seconds", start.elapsed().as_secs_f64());
    info!(elapsed = ?start.elapsed(), "all done");
    Ok(())
}

fn sheet(scrape: &Scrape) -> Sheet<'_> {
    Sheet::new(scrape.sheet, &scrape.table, &scrape.errors)
}

fn report(kind: &str, scrape: &Scrape) {
    if scrape.errors.is_empty() {
        return;
    }
    println!("{} possible {} errors:", scrape.errors.len(), kind);
    for err in &scrape.errors {
        println!("{}", err);
    }
}
