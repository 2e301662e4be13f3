//! Hausbaum CLI - ZIP data import, lookups and service-area management.
//!
//! # Usage
//!
//! ```bash
//! # Import the ZIP centroid CSV
//! hb-cli zip import data/uszips.csv
//!
//! # ZIPs within 10 miles of 33131
//! hb-cli zip radius 33131 --miles 10
//!
//! # Declare a service area
//! hb-cli service-area set biz-42 --zip 44718 --zip 44720 --category homecare
//!
//! # Businesses serving 44718 or anything within 15 miles
//! hb-cli search 44718 --miles 15
//! ```
//!
//! # Environment Variables
//!
//! - `HAUSBAUM_REDIS_URL` - Redis connection string (falls back to `REDIS_URL`, `KV_URL`)
//! - `HAUSBAUM_LOG_FORMAT` - `json` for structured logs, text otherwise
//! - `RUST_LOG` - Log filter (default: `hausbaum_directory=info,hausbaum_cli=info`)
//!
//! See `hausbaum_directory::config` for the remaining tuning variables.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "hb-cli")]
#[command(author, version, about = "Hausbaum directory CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import and query ZIP code data
    Zip {
        #[command(subcommand)]
        action: ZipAction,
    },
    /// Manage business service areas
    ServiceArea {
        #[command(subcommand)]
        action: ServiceAreaAction,
    },
    /// Find businesses serving a ZIP code
    Search {
        /// ZIP code to search from
        zip: String,

        /// Only businesses in this category (ID or page path)
        #[arg(short, long)]
        category: Option<String>,

        /// Also match businesses serving ZIPs within this many miles
        #[arg(short, long)]
        miles: Option<f64>,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 25)]
        limit: usize,
    },
    /// List the directory categories
    Categories,
}

#[derive(Subcommand)]
enum ZipAction {
    /// Import ZIP codes from a CSV file
    Import {
        /// Path to the CSV file
        path: std::path::PathBuf,

        /// Rows saved concurrently per batch
        #[arg(short, long)]
        batch_size: Option<usize>,
    },
    /// Show a ZIP code record
    Get {
        zip: String,
    },
    /// List ZIP codes within a radius
    Radius {
        zip: String,

        #[arg(short, long, default_value_t = 10.0)]
        miles: f64,

        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Distance in miles between two ZIP codes
    Distance {
        from: String,
        to: String,
    },
    /// Number of ZIP codes stored, and the last import
    Count,
    /// List ZIP codes in a state (optionally one city)
    State {
        /// Two-letter state code
        state_code: String,

        #[arg(long)]
        city: Option<String>,

        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Subcommand)]
enum ServiceAreaAction {
    /// Replace a business's service area
    Set {
        business_id: String,

        /// Serve every ZIP code
        #[arg(long)]
        nationwide: bool,

        /// ZIP code served (repeatable)
        #[arg(short, long = "zip")]
        zips: Vec<String>,

        /// Category the business is listed under (repeatable)
        #[arg(short, long = "category")]
        categories: Vec<String>,
    },
    /// Show a business's service area
    Show {
        business_id: String,
    },
    /// Delete a business's service area and category listings
    Delete {
        business_id: String,
    },
    /// Check whether a business serves a ZIP code
    Check {
        business_id: String,
        zip: String,

        /// Also accept ZIPs within this many miles
        #[arg(long)]
        near_miles: Option<f64>,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hausbaum_directory=info,hausbaum_cli=info".into());

    let json = std::env::var("HAUSBAUM_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if matches!(cli.command, Commands::Categories) {
        commands::search::categories();
        return Ok(());
    }

    let ctx = commands::Context::connect().await?;

    match cli.command {
        Commands::Zip { action } => match action {
            ZipAction::Import { path, batch_size } => {
                commands::zip::import(&ctx, &path, batch_size).await?;
            }
            ZipAction::Get { zip } => commands::zip::get(&ctx, &zip).await?,
            ZipAction::Radius { zip, miles, limit } => {
                commands::zip::radius(&ctx, &zip, miles, limit).await?;
            }
            ZipAction::Distance { from, to } => commands::zip::distance(&ctx, &from, &to).await?,
            ZipAction::Count => commands::zip::count(&ctx).await?,
            ZipAction::State {
                state_code,
                city,
                limit,
            } => commands::zip::state(&ctx, &state_code, city.as_deref(), limit).await?,
        },
        Commands::ServiceArea { action } => match action {
            ServiceAreaAction::Set {
                business_id,
                nationwide,
                zips,
                categories,
            } => {
                commands::service_area::set(&ctx, &business_id, nationwide, &zips, &categories)
                    .await?;
            }
            ServiceAreaAction::Show { business_id } => {
                commands::service_area::show(&ctx, &business_id).await?;
            }
            ServiceAreaAction::Delete { business_id } => {
                commands::service_area::delete(&ctx, &business_id).await?;
            }
            ServiceAreaAction::Check {
                business_id,
                zip,
                near_miles,
            } => commands::service_area::check(&ctx, &business_id, &zip, near_miles).await?,
        },
        Commands::Search {
            zip,
            category,
            miles,
            limit,
        } => commands::search::search(&ctx, &zip, category.as_deref(), miles, limit).await?,
        Commands::Categories => {}
    }
    Ok(())
}
