use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::config::{Config, RETRY_BACKOFF_MS};
use crate::error::{AppError, Result};

/// Envelope every provider endpoint responds with: a `response` array of
/// opaque JSON plus an `errors` member that is `[]` when clean and an object
/// (e.g. `{"plan": "..."}`) when the request hit an account restriction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub response: Vec<Value>,
    #[serde(default)]
    pub errors: Value,
}

impl ApiResponse {
    pub fn is_empty(&self) -> bool {
        self.response.is_empty()
    }

    pub fn plan_restriction(&self) -> Option<&str> {
        self.errors.get("plan").and_then(|p| p.as_str())
    }

    /// Promote a body-level plan/tier error to a typed failure.
    pub fn check_plan(&self) -> Result<()> {
        match self.plan_restriction() {
            Some(msg) => Err(AppError::PlanRestricted(msg.to_string())),
            None => Ok(()),
        }
    }
}

/// Remote sports-data API surface. Split out as a trait so enrichment and
/// standings can run against an in-memory fake in tests.
#[async_trait]
pub trait SportsApi: Send + Sync {
    async fn fixture_lineups(&self, fixture_id: i64) -> Result<ApiResponse>;
    async fn fixture_events(&self, fixture_id: i64) -> Result<ApiResponse>;
    async fn fixture_statistics(&self, fixture_id: i64) -> Result<ApiResponse>;
    async fn fixture_odds(&self, fixture_id: i64) -> Result<ApiResponse>;
    async fn fixture_predictions(&self, fixture_id: i64) -> Result<ApiResponse>;
    async fn standings(&self, league_id: i64, season: i32) -> Result<ApiResponse>;
}

/// Key-authenticated HTTP client for the provider's v3 API.
pub struct SportsDataClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    bookmaker_id: u32,
}

impl SportsDataClient {
    pub fn new(api_key: String, cfg: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: cfg.api_url.trim_end_matches('/').to_string(),
            api_key,
            bookmaker_id: cfg.bookmaker_id,
        })
    }

    /// GET with bounded retry. Transient failures back off through
    /// RETRY_BACKOFF_MS; the last error surfaces once the schedule is spent.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0usize;

        loop {
            match self.try_get(&url, query).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt >= RETRY_BACKOFF_MS.len() {
                        return Err(e);
                    }
                    let backoff = RETRY_BACKOFF_MS[attempt];
                    warn!(path, attempt, "request failed, retrying in {backoff}ms: {e}");
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn try_get(&self, url: &str, query: &[(&str, String)]) -> Result<ApiResponse> {
        let resp = self
            .http
            .get(url)
            .header("x-apisports-key", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("{url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!("{url}: HTTP {status}")));
        }

        resp.json::<ApiResponse>()
            .await
            .map_err(|e| AppError::Upstream(format!("{url}: malformed JSON: {e}")))
    }
}

#[async_trait]
impl SportsApi for SportsDataClient {
    async fn fixture_lineups(&self, fixture_id: i64) -> Result<ApiResponse> {
        self.get("/fixtures/lineups", &[("fixture", fixture_id.to_string())])
            .await
    }

    async fn fixture_events(&self, fixture_id: i64) -> Result<ApiResponse> {
        self.get("/fixtures/events", &[("fixture", fixture_id.to_string())])
            .await
    }

    async fn fixture_statistics(&self, fixture_id: i64) -> Result<ApiResponse> {
        self.get("/fixtures/statistics", &[("fixture", fixture_id.to_string())])
            .await
    }

    async fn fixture_odds(&self, fixture_id: i64) -> Result<ApiResponse> {
        self.get(
            "/odds",
            &[
                ("fixture", fixture_id.to_string()),
                ("bookmaker", self.bookmaker_id.to_string()),
            ],
        )
        .await
    }

    async fn fixture_predictions(&self, fixture_id: i64) -> Result<ApiResponse> {
        self.get("/predictions", &[("fixture", fixture_id.to_string())])
            .await
    }

    async fn standings(&self, league_id: i64, season: i32) -> Result<ApiResponse> {
        self.get(
            "/standings",
            &[
                ("league", league_id.to_string()),
                ("season", season.to_string()),
            ],
        )
        .await
    }
}
