use std::sync::Arc;

use chrono::{Datelike, Utc};
use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::SportsApi;
use crate::config::PLAN_SEASON_FLOOR;
use crate::db::repository::Repository;
use crate::error::{AppError, Result};

/// Cache-aside standings lookup with season fallback.
///
/// Free-tier accounts are cut off from current seasons; when the remote
/// reports a plan restriction the lookup drops once to the fixed floor
/// season. An empty (but allowed) season walks back one year at a time while
/// it stays recent. The season strictly decreases on every recursive call,
/// so both paths terminate.
#[derive(Clone)]
pub struct StandingsService {
    repo: Repository,
    client: Option<Arc<dyn SportsApi>>,
    current_year: i32,
}

impl StandingsService {
    pub fn new(repo: Repository, client: Option<Arc<dyn SportsApi>>) -> Self {
        Self::with_current_year(repo, client, Utc::now().year())
    }

    fn with_current_year(
        repo: Repository,
        client: Option<Arc<dyn SportsApi>>,
        current_year: i32,
    ) -> Self {
        Self {
            repo,
            client,
            current_year,
        }
    }

    pub async fn standings(&self, league_id: i64, season: i32) -> Result<Option<Value>> {
        if league_id <= 0 {
            return Err(AppError::Validation(format!(
                "league id must be positive, got {league_id}"
            )));
        }
        if season < 2000 {
            return Err(AppError::Validation(format!("implausible season {season}")));
        }
        self.lookup(league_id, season).await
    }

    fn lookup(&self, league_id: i64, season: i32) -> BoxFuture<'_, Result<Option<Value>>> {
        Box::pin(async move {
            if let Some(stored) = self.repo.standings(league_id, season).await? {
                debug!(league_id, season, "standings served from store");
                return Ok(Some(stored));
            }

            let Some(client) = self.client.as_ref() else {
                return Ok(None);
            };

            let resp = match client.standings(league_id, season).await {
                Ok(resp) => resp,
                Err(AppError::PlanRestricted(msg)) => {
                    return self.plan_fallback(league_id, season, &msg).await
                }
                Err(e) => return Err(e),
            };

            if let Some(msg) = resp.plan_restriction() {
                return self.plan_fallback(league_id, season, msg).await;
            }

            if resp.is_empty() {
                // Recent seasons that come back empty usually mean the table
                // has not been published yet; try the season before.
                if season >= self.current_year - 1 {
                    debug!(league_id, season, "empty standings, trying previous season");
                    return self.lookup(league_id, season - 1).await;
                }
                return Ok(None);
            }

            let payload = Value::Array(resp.response);
            self.repo
                .upsert_standings(league_id, season, &payload)
                .await?;
            Ok(Some(payload))
        })
    }

    async fn plan_fallback(
        &self,
        league_id: i64,
        season: i32,
        msg: &str,
    ) -> Result<Option<Value>> {
        if season > PLAN_SEASON_FLOOR {
            info!(
                league_id,
                season,
                floor = PLAN_SEASON_FLOOR,
                "plan restriction ({msg}), falling back to floor season"
            );
            return self.lookup(league_id, PLAN_SEASON_FLOOR).await;
        }
        info!(league_id, season, "plan restriction at floor season: {msg}");
        Ok(None)
    }
}
