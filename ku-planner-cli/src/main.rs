mod cache;
mod commands;
mod display;
mod session;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ku_planner_core::catalog::CourseFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{CatalogOptions, PlanParams};

#[derive(Parser)]
#[command(name = "ku-planner")]
#[command(about = "Browse the KU course catalog and plan a weekly class schedule")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Catalog JSON file or http(s) URL of a /courses endpoint
    #[arg(long, global = true, default_value = "ku_courses.json")]
    catalog: String,

    /// Always fetch remote catalogs instead of using the local cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog courses
    Courses {
        /// Only courses of this faculty
        #[arg(short, long)]
        faculty: Option<String>,

        /// Only this course code
        #[arg(short, long)]
        course_code: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Search courses by code or name
    Search {
        term: String,

        #[arg(long)]
        json: bool,
    },

    /// Build a schedule from course codes and export it
    Plan {
        /// Course codes to add, in order
        #[arg(short, long, num_args = 1.., required = true)]
        add: Vec<String>,

        /// Write the HTML schedule table to this file or directory
        #[arg(long)]
        html: Option<PathBuf>,

        /// Write a weekly recurring calendar to this file or directory
        #[arg(long)]
        ics: Option<PathBuf>,

        /// First week of classes (YYYY-MM-DD), snapped to its Monday
        #[arg(long)]
        week_start: Option<NaiveDate>,

        /// Number of weeks the calendar repeats
        #[arg(long, default_value = "16", value_parser = clap::value_parser!(u32).range(1..))]
        weeks: u32,
    },

    /// Interactive planner session on stdin
    Session,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("ku_planner_cli={log_level},ku_planner_core={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let catalog = CatalogOptions {
        location: cli.catalog,
        no_cache: cli.no_cache,
    };

    match cli.command {
        Commands::Courses {
            faculty,
            course_code,
            json,
        } => {
            let filter = CourseFilter {
                faculty,
                course_code,
            };
            commands::courses_command(&catalog, filter, json).await
        }

        Commands::Search { term, json } => commands::search_command(&catalog, &term, json).await,

        Commands::Plan {
            add,
            html,
            ics,
            week_start,
            weeks,
        } => {
            commands::plan_command(
                &catalog,
                PlanParams {
                    add,
                    html,
                    ics,
                    week_start,
                    weeks,
                },
            )
            .await
        }

        Commands::Session => commands::session_command(&catalog).await,
    }
}
