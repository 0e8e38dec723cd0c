use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ku_planner_core::prelude::*;

use crate::{cache::FileCache, display, session};

/// Freshness window for catalogs fetched over HTTP
const CATALOG_CACHE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Where to read the catalog from, shared by every subcommand
pub struct CatalogOptions {
    pub location: String,
    pub no_cache: bool,
}

impl CatalogOptions {
    fn is_remote(&self) -> bool {
        self.location.starts_with("http://") || self.location.starts_with("https://")
    }

    /// Remote catalogs go through the on-disk cache unless disabled
    pub fn source(&self) -> Result<Box<dyn CatalogSource>> {
        if !self.is_remote() {
            return Ok(Box::new(FileSource::new(&self.location)));
        }

        let http = HttpSource::new(&self.location)?;
        if self.no_cache {
            return Ok(Box::new(http));
        }

        match FileCache::with_default_dir("ku-planner") {
            Ok(cache) => Ok(Box::new(CachedSource::new(http, cache, CATALOG_CACHE_TTL))),
            Err(e) => {
                tracing::warn!("Catalog cache unavailable, fetching directly: {}", e);
                Ok(Box::new(http))
            }
        }
    }

    async fn load(&self) -> Result<Catalog> {
        let source = self.source()?;
        source
            .load()
            .await
            .with_context(|| format!("Failed to load course catalog from {}", source.describe()))
    }
}

/// List catalog courses, optionally filtered
pub async fn courses_command(
    catalog: &CatalogOptions,
    filter: CourseFilter,
    json: bool,
) -> Result<()> {
    let catalog = catalog.load().await?;
    let courses = catalog.list_courses(&filter);
    tracing::info!("{} of {} courses match", courses.len(), catalog.len());
    print_courses(&courses, json)
}

/// Free-text search over code and name
pub async fn search_command(catalog: &CatalogOptions, term: &str, json: bool) -> Result<()> {
    let catalog = catalog.load().await?;
    print_courses(&catalog.search(term), json)
}

fn print_courses(courses: &[CourseRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(courses)?);
        return Ok(());
    }

    if courses.is_empty() {
        println!("No matching courses");
    }
    for course in courses {
        println!("{}", display::course_line(course));
    }
    Ok(())
}

/// One-shot planning parameters
pub struct PlanParams {
    pub add: Vec<String>,
    pub html: Option<PathBuf>,
    pub ics: Option<PathBuf>,
    pub week_start: Option<NaiveDate>,
    pub weeks: u32,
}

/// Build a schedule from catalog course codes, print it and optionally export it
pub async fn plan_command(catalog: &CatalogOptions, params: PlanParams) -> Result<()> {
    let catalog = catalog.load().await?;

    let mut state = PlannerState::new().update(Intent::CatalogLoaded(catalog))?;
    for code in &params.add {
        state = state
            .update(Intent::Select(code.clone()))
            .and_then(|selected| selected.update(Intent::Add))
            .with_context(|| format!("Cannot add {code}"))?;
        tracing::debug!("Added {}", code);
    }

    if let Some(grid) = state.grid() {
        print!("{}", display::render_grid(&grid));
    }

    if let Some(path) = params.html {
        let written = write_export(&HtmlTableExporter::default(), state.store(), path)?;
        println!("HTML table written to {}", written.display());
    }

    if let Some(path) = params.ics {
        let mut options = IcsOptions {
            weeks: Some(params.weeks),
            ..IcsOptions::default()
        };
        if let Some(week_start) = params.week_start {
            options.week_start = week_start;
        }
        let written = write_export(&IcsExporter::new(options), state.store(), path)?;
        println!("Calendar written to {}", written.display());
    }

    Ok(())
}

/// Interactive planner over stdin
pub async fn session_command(catalog: &CatalogOptions) -> Result<()> {
    session::run(catalog.source()?).await
}
