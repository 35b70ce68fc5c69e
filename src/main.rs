mod client;
mod config;
mod db;
mod enrichment;
mod error;
mod picks;
mod pipeline;
mod scoring;
mod standings;
mod types;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::client::{SportsApi, SportsDataClient};
use crate::config::Config;
use crate::db::repository::Repository;
use crate::enrichment::EnrichmentService;
use crate::error::{AppError, Result};
use crate::picks::PickSelector;
use crate::pipeline::PicksPipeline;
use crate::standings::StandingsService;

const USAGE: &str = "usage: matchday picks [YYYY-MM-DD] | match <fixture_id> | standings <league_id> <season>";

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let options = SqliteConnectOptions::new()
        .filename(&cfg.db_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database ready at {}", cfg.db_path);

    // --- Remote client (optional: without a key everything runs store-only) ---
    let client: Option<Arc<dyn SportsApi>> = match &cfg.api_key {
        Some(key) => Some(Arc::new(SportsDataClient::new(key.clone(), &cfg)?)),
        None => {
            warn!("SPORTS_API_KEY not set — store-only mode, no remote fetches");
            None
        }
    };

    let repo = Repository::new(pool);
    let enrichment = EnrichmentService::new(repo.clone(), client.clone());

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("picks") => {
            let date = match args.get(1) {
                Some(raw) => parse_date(raw)?,
                None => Utc::now().date_naive(),
            };
            let selector = Arc::new(PickSelector::new(repo.clone()));
            let pipeline = PicksPipeline::new(repo, enrichment, selector, &cfg);

            let run = pipeline.generate_daily_picks(date).await?;
            info!(%date, count = run.count, "pick generation finished");
            if let Some(featured) = &run.featured {
                info!(
                    market = %featured.market,
                    odd = featured.odd,
                    "Featured: {} ({})",
                    featured.match_name,
                    featured.competition,
                );
                println!("{}", serde_json::to_string_pretty(featured)?);
            }
            for pick in &run.picks {
                info!(
                    fixture_id = pick.fixture_id,
                    risk = %pick.risk,
                    market = %pick.market,
                    odd = pick.odd,
                    score = pick.score,
                    featured = pick.is_featured,
                    "{}",
                    pick.title,
                );
            }
        }
        Some("match") => {
            let fixture_id = args
                .get(1)
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| AppError::Validation(USAGE.to_string()))?;

            let details = enrichment.match_details(fixture_id).await?;
            info!(
                fixture_id,
                status = %details.fixture.status,
                fetched_from_api = details.fetched_from_api,
                lineups = details.lineups.state(),
                lineups_confirmed = details.lineups_confirmed,
                events = details.events.state(),
                stats = details.stats.state(),
                odds = details.odds.state(),
                predictions = details.predictions.state(),
                "{} vs {}",
                details.fixture.home_name,
                details.fixture.away_name,
            );
        }
        Some("standings") => {
            let (Some(league_id), Some(season)) = (
                args.get(1).and_then(|s| s.parse::<i64>().ok()),
                args.get(2).and_then(|s| s.parse::<i32>().ok()),
            ) else {
                return Err(AppError::Validation(USAGE.to_string()));
            };

            let service = StandingsService::new(repo, client);
            match service.standings(league_id, season).await? {
                Some(payload) => println!("{}", serde_json::to_string_pretty(&payload)?),
                None => info!(league_id, season, "no standings available"),
            }
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date {raw:?}, expected YYYY-MM-DD")))
}
