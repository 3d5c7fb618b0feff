//! CLI entry point for the NEO rater.
//!
//! Provides subcommands for syncing and scoring the NeoWs feed, looking up a
//! single object, managing a per-user bookmark catalog, and serving the JSON
//! API.

use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use neo_rater::{
    catalog::{CatalogSummary, SortDirection, SortKey, sort_asteroids},
    config::{Config, DEFAULT_LOG_FILE_PATH},
    error::SyncError,
    feed::RawFeed,
    fetch::{BasicClient, fetch_bytes},
    infra::bookmarks::{BookmarkStore, JsonFileStore, SaveOutcome},
    infra::neows::NeoWsClient,
    normalize::normalize_feed,
    output::{FeedResponse, append_records, print_pretty, write_json},
    risk::{RiskInputs, assess, risk_terms},
    server,
    services::neo_api::DateRange,
    services::sync::{sync_detail, sync_feed},
};
use serde_json::json;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "neo_rater")]
#[command(about = "A tool to sync and risk-score Near-Earth Objects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, normalize and score the NeoWs feed for a date range
    Feed {
        /// First day of the range (defaults to yesterday, UTC)
        #[arg(long)]
        start_date: Option<NaiveDate>,

        /// Last day of the range (defaults to today, UTC)
        #[arg(long)]
        end_date: Option<NaiveDate>,

        /// Normalize a saved NeoWs feed file or URL instead of querying the API
        #[arg(short, long, value_name = "FILE_OR_URL")]
        input: Option<String>,

        /// Column to order the catalog by
        #[arg(short, long, value_enum)]
        sort: Option<SortKey>,

        /// Sort in descending order
        #[arg(long, default_value_t = false)]
        descending: bool,

        /// CSV file to append results to
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show the detail view for one object
    Lookup {
        #[arg(value_name = "ASTEROID_ID")]
        id: String,
    },
    /// Score a close approach from raw parameters
    Score {
        /// Maximum estimated diameter in meters
        #[arg(long)]
        diameter: f64,

        /// Miss distance in kilometers
        #[arg(long)]
        miss_distance: f64,

        /// Relative velocity in km/s
        #[arg(long)]
        velocity: f64,

        /// Flagged potentially hazardous upstream
        #[arg(long, default_value_t = false)]
        hazardous: bool,
    },
    /// Bookmark an object into a user's catalog
    Save {
        #[arg(short, long)]
        user: String,

        #[arg(value_name = "ASTEROID_ID")]
        id: String,
    },
    /// Remove a bookmarked object from a user's catalog
    Remove {
        #[arg(short, long)]
        user: String,

        #[arg(value_name = "ASTEROID_ID")]
        id: String,
    },
    /// List a user's bookmarked objects
    Saved {
        #[arg(short, long)]
        user: String,
    },
    /// Serve the JSON API
    Serve {
        /// Port to listen on (defaults to PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Tracing goes up first so config defaults are logged.
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE_PATH.to_string());
    let _file_guard = init_tracing(&log_file_path)?;
    let config = Config::from_env()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Feed {
            start_date,
            end_date,
            input,
            sort,
            descending,
            output,
        } => {
            let mut asteroids = match input {
                Some(source) => {
                    let bytes = fetcher(&source).await?;
                    let feed = RawFeed::from_slice(&bytes)
                        .with_context(|| format!("{source} is not a NeoWs feed"))?;
                    normalize_feed(&feed)
                }
                None => {
                    let today = Utc::now().date_naive();
                    let start = start_date.unwrap_or(today - Duration::days(1));
                    let end = end_date.unwrap_or(today);
                    let client = neows_client(&config)?;
                    let range = DateRange::new(start, end).map_err(report)?;
                    sync_feed(&client, range).await.map_err(report)?
                }
            };

            if let Some(key) = sort {
                let direction = if descending {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                };
                sort_asteroids(&mut asteroids, key, direction);
            }

            let summary = CatalogSummary::from_asteroids(&asteroids);
            info!(
                count = summary.count,
                hazardous = summary.hazardous,
                hazardous_pct = summary.hazardous_pct(),
                average_risk = summary.average_risk,
                critical = summary.critical,
                high = summary.high,
                moderate = summary.moderate,
                low = summary.low,
                closest = summary.closest_id.as_deref().unwrap_or("-"),
                "Catalog summary"
            );
            print_pretty(&summary);

            if let Some(path) = output {
                append_records(&path, &asteroids)?;
                info!(path = %path, rows = asteroids.len(), "Appended catalog to CSV");
            }

            write_json(std::io::stdout().lock(), &FeedResponse::new(asteroids))?;
        }
        Commands::Lookup { id } => {
            let client = neows_client(&config)?;
            let detail = sync_detail(&client, &id).await.map_err(report)?;
            if detail.assessment.is_none() {
                warn!(id = %id, "No Earth approach in the recent window, no assessment");
            }
            write_json(std::io::stdout().lock(), &json!({ "asteroid": detail }))?;
        }
        Commands::Score {
            diameter,
            miss_distance,
            velocity,
            hazardous,
        } => {
            if [diameter, miss_distance, velocity]
                .iter()
                .any(|v| !v.is_finite() || *v < 0.0)
            {
                bail!("diameter, miss distance and velocity must be non-negative numbers");
            }
            let inputs = RiskInputs {
                diameter_m: diameter,
                miss_distance_km: miss_distance,
                velocity_km_s: velocity,
                hazardous,
            };
            let terms = risk_terms(&inputs);
            let result = assess(&inputs);
            write_json(
                std::io::stdout().lock(),
                &json!({ "terms": terms, "composite": terms.total(), "result": result }),
            )?;
        }
        Commands::Save { user, id } => {
            let client = neows_client(&config)?;
            let detail = sync_detail(&client, &id).await.map_err(report)?;
            let Some(asteroid) = detail.assessment else {
                bail!("asteroid {id} has no Earth approach in its recent window, nothing to save");
            };

            let mut store = JsonFileStore::load(&config.bookmarks_path)?;
            let message = match store.save(&user, asteroid)? {
                SaveOutcome::Saved => "Celestial object successfully saved to catalog",
                SaveOutcome::AlreadySaved => "Asteroid is already in your catalog",
            };
            info!(user = %user, id = %id, path = %store.path().display(), "{message}");
        }
        Commands::Remove { user, id } => {
            let mut store = JsonFileStore::load(&config.bookmarks_path)?;
            if store.remove(&user, &id)? {
                info!(user = %user, id = %id, "Asteroid removed from catalog");
            } else {
                warn!(user = %user, id = %id, "Asteroid was not in the catalog");
            }
        }
        Commands::Saved { user } => {
            let store = JsonFileStore::load(&config.bookmarks_path)?;
            let saved = store.list(&user);
            info!(user = %user, saved = saved.len(), "Catalog loaded");
            write_json(std::io::stdout().lock(), &json!({ "savedAsteroids": saved }))?;
        }
        Commands::Serve { port } => {
            let client = neows_client(&config)?;
            server::serve(port.unwrap_or(config.port), Arc::new(client)).await?;
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_tracing(log_file_path: &str) -> Result<WorkerGuard> {
    let log_dir = Path::new(log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("neo_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

fn neows_client(config: &Config) -> Result<NeoWsClient<BasicClient>> {
    let http = BasicClient::new()?;
    NeoWsClient::new(http, &config.base_url, config.api_key.clone()).map_err(report)
}

/// Prints the sync failure envelope and hands the error back for the exit path.
fn report(e: SyncError) -> anyhow::Error {
    error!(status = e.status(), error = %e, "NeoWs sync failed");
    let envelope = json!({ "status": e.status(), "error": e.to_failure().error, "details": e.to_string() });
    if let Err(write_err) = write_json(std::io::stdout().lock(), &envelope) {
        error!(error = %write_err, "Failed to print failure envelope");
    }
    e.into()
}

/// Loads feed data from a local file path or fetches it over HTTP.
#[tracing::instrument]
async fn fetcher(source: &str) -> Result<Vec<u8>> {
    let bytes = if source.starts_with("http") {
        let client = BasicClient::new()?;
        fetch_bytes(&client, source).await?
    } else {
        std::fs::read(source).with_context(|| format!("reading {source}"))?
    };
    Ok(bytes)
}
