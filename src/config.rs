use crate::error::{AppError, Result};

pub const SPORTS_API_URL: &str = "https://v3.football.api-sports.io";

/// Bookmaker requested on the odds endpoint. Id 1 = Bet365, used as the
/// reference book; only its markets are normalized and stored.
pub const DEFAULT_BOOKMAKER_ID: u32 = 1;

/// Leagues the daily picks job considers. Everything else is synced for the
/// fixture views but never scored.
pub const DEFAULT_TARGET_LEAGUES: &[i64] = &[39, 140, 135, 78, 61, 71, 618];

/// Retry backoff values in milliseconds for remote API calls.
pub const RETRY_BACKOFF_MS: &[u64] = &[250, 500, 1000];

/// Per-request HTTP timeout (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 15;

/// Upper bound on concurrent per-fixture enrichment calls. The remote API has
/// no documented rate limit headroom on the free tier, so keep this small.
pub const MAX_CONCURRENT_ENRICHMENTS: usize = 4;

/// Maximum picks persisted per date (featured + 4 others).
pub const MAX_PICKS_PER_DAY: usize = 5;

/// Free-tier standings data stops at this season; plan-restricted requests
/// for later seasons fall back to it.
pub const PLAN_SEASON_FLOOR: i32 = 2024;

#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the sports-data provider (SPORTS_API_KEY). Optional — with
    /// no key the pipeline runs store-only and never calls the remote.
    pub api_key: Option<String>,
    pub api_url: String,
    pub log_level: String,
    pub db_path: String,
    /// League ids eligible for daily picks (TARGET_LEAGUES, comma-separated).
    pub target_leagues: Vec<i64>,
    /// Bookmaker id passed to the odds endpoint (BOOKMAKER_ID).
    pub bookmaker_id: u32,
    /// Concurrent enrichment cap (MAX_CONCURRENT_ENRICHMENTS).
    pub max_concurrent_enrichments: usize,
    /// HTTP timeout in seconds (HTTP_TIMEOUT_SECS).
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let target_leagues = match std::env::var("TARGET_LEAGUES") {
            Ok(raw) => parse_league_list(&raw)?,
            Err(_) => DEFAULT_TARGET_LEAGUES.to_vec(),
        };

        Ok(Self {
            api_key: std::env::var("SPORTS_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            api_url: std::env::var("SPORTS_API_URL")
                .unwrap_or_else(|_| SPORTS_API_URL.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            db_path: std::env::var("DB_PATH").unwrap_or_else(|_| "matchday.db".to_string()),
            target_leagues,
            bookmaker_id: std::env::var("BOOKMAKER_ID")
                .unwrap_or_default()
                .parse::<u32>()
                .unwrap_or(DEFAULT_BOOKMAKER_ID),
            max_concurrent_enrichments: std::env::var("MAX_CONCURRENT_ENRICHMENTS")
                .unwrap_or_default()
                .parse::<usize>()
                .unwrap_or(MAX_CONCURRENT_ENRICHMENTS),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_default()
                .parse::<u64>()
                .unwrap_or(HTTP_TIMEOUT_SECS),
        })
    }
}

fn parse_league_list(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::Config(format!("TARGET_LEAGUES: invalid league id {s:?}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn league_list_parses_and_trims() {
        let leagues = parse_league_list("39, 140,135 ,,78").unwrap();
        assert_eq!(leagues, vec![39, 140, 135, 78]);
    }

    #[test]
    fn league_list_rejects_garbage() {
        assert!(parse_league_list("39,abc").is_err());
    }
}
