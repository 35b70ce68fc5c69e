use std::future::Future;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::client::{ApiResponse, SportsApi};
use crate::db::repository::{Repository, Secondary};
use crate::error::{AppError, Result};
use crate::types::{Fixture, Payload};

/// Complete match-detail view for one fixture, assembled cache-aside: the
/// store is read first and only the empty pieces are fetched remotely.
#[derive(Debug)]
pub struct MatchDetails {
    pub fixture: Fixture,
    pub lineups: Payload,
    pub lineups_confirmed: bool,
    pub events: Payload,
    pub stats: Payload,
    pub odds: Payload,
    pub predictions: Payload,
    /// True when this call went to the remote for at least one field.
    pub fetched_from_api: bool,
}

#[derive(Clone)]
pub struct EnrichmentService {
    repo: Repository,
    client: Option<Arc<dyn SportsApi>>,
}

impl EnrichmentService {
    pub fn new(repo: Repository, client: Option<Arc<dyn SportsApi>>) -> Self {
        Self { repo, client }
    }

    pub async fn match_details(&self, fixture_id: i64) -> Result<MatchDetails> {
        if fixture_id <= 0 {
            return Err(AppError::Validation(format!(
                "fixture id must be positive, got {fixture_id}"
            )));
        }

        let (fixture, lineup_rec, mut events, mut stats, mut odds, mut predictions) = tokio::try_join!(
            self.repo.fixture(fixture_id),
            self.repo.lineups(fixture_id),
            self.repo.secondary(Secondary::Events, fixture_id),
            self.repo.secondary(Secondary::Stats, fixture_id),
            self.repo.secondary(Secondary::Odds, fixture_id),
            self.repo.secondary(Secondary::Predictions, fixture_id),
        )?;
        let fixture = fixture.ok_or_else(|| {
            AppError::NotFound(format!("fixture {fixture_id} — run sync first"))
        })?;
        let (mut lineups, mut lineups_confirmed) = lineup_rec;

        let needs_fetch = lineups.needs_fetch()
            || events.needs_fetch()
            || stats.needs_fetch()
            || odds.needs_fetch()
            || predictions.needs_fetch();
        let fetched_from_api = needs_fetch && self.client.is_some();

        if let (true, Some(client)) = (needs_fetch, self.client.as_ref()) {
            // Only the empty fields go to the remote; failures degrade per
            // field and never abort the call.
            let (api_lineups, api_events, api_stats, api_odds, api_predictions) = tokio::join!(
                fetch_soft(lineups.needs_fetch(), "lineups", client.fixture_lineups(fixture_id)),
                fetch_soft(events.needs_fetch(), "events", client.fixture_events(fixture_id)),
                fetch_soft(stats.needs_fetch(), "stats", client.fixture_statistics(fixture_id)),
                fetch_soft(odds.needs_fetch(), "odds", client.fixture_odds(fixture_id)),
                fetch_soft(
                    predictions.needs_fetch(),
                    "predictions",
                    client.fixture_predictions(fixture_id)
                ),
            );

            if let Some(resp) = api_lineups {
                if !resp.response.is_empty() {
                    let confirmed = lineups_confirmed_from(&resp);
                    let payload = Value::Array(resp.response);
                    self.repo
                        .upsert_lineups(fixture_id, confirmed, &payload)
                        .await?;
                    lineups = Payload::Present(payload);
                    lineups_confirmed = confirmed;
                }
            }

            // Events and stats persist whatever a successful call returned,
            // empty arrays included — an empty array stays "empty" under the
            // tri-state, so the next enrichment refreshes it again.
            if let Some(resp) = api_events {
                let payload = Value::Array(resp.response);
                self.repo
                    .upsert_secondary(Secondary::Events, fixture_id, &payload)
                    .await?;
                events = Payload::from_db(Some(payload));
            }

            if let Some(resp) = api_stats {
                let payload = Value::Array(resp.response);
                self.repo
                    .upsert_secondary(Secondary::Stats, fixture_id, &payload)
                    .await?;
                stats = Payload::from_db(Some(payload));
            }

            if let Some(resp) = api_odds {
                match normalize_odds(&resp) {
                    Some(normalized) => {
                        self.repo
                            .upsert_secondary(Secondary::Odds, fixture_id, &normalized)
                            .await?;
                        debug!(
                            fixture_id,
                            markets = normalized.as_array().map(Vec::len).unwrap_or(0),
                            "odds normalized"
                        );
                        odds = Payload::from_db(Some(normalized));
                    }
                    None => debug!(fixture_id, "no odds returned by remote"),
                }
            }

            if let Some(resp) = api_predictions {
                if let Some(first) = resp.response.into_iter().next() {
                    self.repo
                        .upsert_secondary(Secondary::Predictions, fixture_id, &first)
                        .await?;
                    predictions = Payload::Present(first);
                }
            }
        }

        // Probable-lineup fallback: view only, never persisted, so a later
        // official lineup fetch is not masked.
        if lineups.needs_fetch() {
            if let Some(pred) = predictions.as_value() {
                if let Some(probable) =
                    probable_lineups(pred, &fixture.home_name, &fixture.away_name)
                {
                    lineups = Payload::Present(probable);
                    lineups_confirmed = false;
                }
            }
        }

        Ok(MatchDetails {
            fixture,
            lineups,
            lineups_confirmed,
            events,
            stats,
            odds,
            predictions,
            fetched_from_api,
        })
    }

    /// Narrow backfill used by the daily picks job: odds and predictions only,
    /// fetched just for fixtures where they are still empty.
    pub async fn backfill_markets(&self, fixture_id: i64) -> Result<()> {
        let Some(client) = self.client.as_ref() else {
            return Ok(());
        };

        let (odds, predictions) = tokio::try_join!(
            self.repo.secondary(Secondary::Odds, fixture_id),
            self.repo.secondary(Secondary::Predictions, fixture_id),
        )?;

        let (api_odds, api_predictions) = tokio::join!(
            fetch_soft(odds.needs_fetch(), "odds", client.fixture_odds(fixture_id)),
            fetch_soft(
                predictions.needs_fetch(),
                "predictions",
                client.fixture_predictions(fixture_id)
            ),
        );

        if let Some(resp) = api_odds {
            if let Some(normalized) = normalize_odds(&resp) {
                self.repo
                    .upsert_secondary(Secondary::Odds, fixture_id, &normalized)
                    .await?;
            }
        }

        if let Some(resp) = api_predictions {
            if let Some(first) = resp.response.into_iter().next() {
                self.repo
                    .upsert_secondary(Secondary::Predictions, fixture_id, &first)
                    .await?;
            }
        }

        Ok(())
    }
}

async fn fetch_soft<F>(needed: bool, field: &'static str, fut: F) -> Option<ApiResponse>
where
    F: Future<Output = Result<ApiResponse>>,
{
    if !needed {
        return None;
    }
    match fut.await {
        Ok(resp) => Some(resp),
        Err(e) => {
            warn!(field, "remote fetch failed, degrading to empty: {e}");
            None
        }
    }
}

/// First response entry → first bookmaker → bets, reduced to the generic
/// `[{name, values}]` shape every downstream consumer reads.
pub fn normalize_odds(resp: &ApiResponse) -> Option<Value> {
    let first = resp.response.first()?;
    let bets = first
        .get("bookmakers")
        .and_then(Value::as_array)
        .and_then(|a| a.first())
        .and_then(|bk| bk.get("bets"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let markets: Vec<Value> = bets
        .iter()
        .map(|bet| {
            json!({
                "name": bet.get("name").cloned().unwrap_or(Value::Null),
                "values": bet.get("values").cloned().unwrap_or_else(|| json!([])),
            })
        })
        .collect();

    Some(Value::Array(markets))
}

fn lineups_confirmed_from(resp: &ApiResponse) -> bool {
    resp.response
        .first()
        .and_then(|l| l.get("formation"))
        .map(|f| !f.is_null())
        .unwrap_or(false)
}

/// Synthesize probable home/away lineup groups from the prediction payload.
/// Entries must carry a `team` field — formation-only arrays yield None.
pub fn probable_lineups(pred: &Value, home_name: &str, away_name: &str) -> Option<Value> {
    let entries = pred.get("lineups")?.as_array()?;
    if !entries
        .iter()
        .any(|e| e.get("team").is_some_and(|t| !t.is_null()))
    {
        return None;
    }

    let side = |name: &str| -> Value {
        let start_xi: Vec<Value> = entries
            .iter()
            .filter(|e| {
                e.get("team")
                    .and_then(|t| t.get("name"))
                    .and_then(Value::as_str)
                    == Some(name)
            })
            .map(|e| json!({"player": {"name": e.get("name").cloned().unwrap_or(Value::Null)}}))
            .collect();
        json!({"team": {"name": format!("{name} (probable)")}, "startXI": start_xi})
    };

    Some(Value::Array(vec![side(home_name), side(away_name)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{FakeApi, Script};
    use crate::db::test_util::memory_pool;

    async fn seeded_repo() -> Repository {
        let repo = Repository::new(memory_pool().await);
        repo.upsert_league(39, "Premier League").await.unwrap();
        repo.upsert_team(1, "Arsenal").await.unwrap();
        repo.upsert_team(2, "Chelsea").await.unwrap();
        repo.upsert_fixture(1001, 39, 1, 2, "2026-08-30T15:00:00Z", "NS")
            .await
            .unwrap();
        repo
    }

    fn odds_response() -> Vec<Value> {
        vec![json!({
            "bookmakers": [{
                "name": "Bet365",
                "bets": [
                    {"name": "Match Winner", "values": [
                        {"value": "Home", "odd": "1.60"},
                        {"value": "Draw", "odd": "3.90"},
                        {"value": "Away", "odd": "5.25"}
                    ]}
                ]
            }]
        })]
    }

    fn predictions_response(with_lineups: bool) -> Vec<Value> {
        let mut entry = json!({
            "predictions": {
                "percent": {"home": "80%", "draw": "12%", "away": "8%"},
                "winner": {"id": 1, "name": "Arsenal"}
            }
        });
        if with_lineups {
            entry["lineups"] = json!([
                {"name": "Saka", "team": {"name": "Arsenal"}},
                {"name": "Palmer", "team": {"name": "Chelsea"}},
                {"name": "Rice", "team": {"name": "Arsenal"}}
            ]);
        }
        vec![entry]
    }

    #[tokio::test]
    async fn rejects_bad_fixture_id() {
        let svc = EnrichmentService::new(seeded_repo().await, None);
        assert!(matches!(
            svc.match_details(0).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn unknown_fixture_is_not_found() {
        let svc = EnrichmentService::new(seeded_repo().await, None);
        assert!(matches!(
            svc.match_details(4242).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn fetches_only_empty_fields_and_is_idempotent() {
        let api = Arc::new(FakeApi {
            odds: Script::Respond(odds_response()),
            predictions: Script::Respond(predictions_response(false)),
            ..FakeApi::new()
        });
        let svc = EnrichmentService::new(seeded_repo().await, Some(api.clone()));

        let first = svc.match_details(1001).await.unwrap();
        assert!(first.fetched_from_api);
        assert!(!first.odds.needs_fetch());
        assert!(!first.predictions.needs_fetch());
        assert_eq!(api.count("odds"), 1);
        assert_eq!(api.count("predictions"), 1);

        // Odds and predictions are now populated; only the still-empty fields
        // (lineups/events/stats — the fake returns empty for them) re-fetch.
        let second = svc.match_details(1001).await.unwrap();
        assert_eq!(api.count("odds"), 1);
        assert_eq!(api.count("predictions"), 1);
        assert_eq!(second.odds, first.odds);
        assert_eq!(second.predictions, first.predictions);
    }

    #[tokio::test]
    async fn per_field_failure_is_isolated() {
        let api = Arc::new(FakeApi {
            odds: Script::Fail,
            predictions: Script::Respond(predictions_response(false)),
            ..FakeApi::new()
        });
        let svc = EnrichmentService::new(seeded_repo().await, Some(api));

        let details = svc.match_details(1001).await.unwrap();
        assert!(details.odds.needs_fetch());
        assert!(!details.predictions.needs_fetch());
    }

    #[tokio::test]
    async fn probable_lineups_fallback_from_predictions() {
        let api = Arc::new(FakeApi {
            predictions: Script::Respond(predictions_response(true)),
            ..FakeApi::new()
        });
        let svc = EnrichmentService::new(seeded_repo().await, Some(api));

        let details = svc.match_details(1001).await.unwrap();
        assert!(!details.lineups_confirmed);
        let groups = details.lineups.as_value().unwrap().as_array().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups[0]["team"]["name"].as_str(),
            Some("Arsenal (probable)")
        );
        assert_eq!(groups[0]["startXI"].as_array().unwrap().len(), 2);
        assert_eq!(groups[1]["startXI"].as_array().unwrap().len(), 1);

        // The fallback is view-only: nothing was persisted for lineups.
        let (stored, _) = svc.repo.lineups(1001).await.unwrap();
        assert!(stored.needs_fetch());
    }

    #[tokio::test]
    async fn formation_only_prediction_lineups_skip_fallback() {
        let mut entry = predictions_response(false).remove(0);
        entry["lineups"] = json!([{"formation": "4-3-3"}, {"formation": "4-2-3-1"}]);
        let api = Arc::new(FakeApi {
            predictions: Script::Respond(vec![entry]),
            ..FakeApi::new()
        });
        let svc = EnrichmentService::new(seeded_repo().await, Some(api));

        let details = svc.match_details(1001).await.unwrap();
        assert!(details.lineups.needs_fetch());
    }

    #[tokio::test]
    async fn official_lineups_set_confirmed_from_formation() {
        let api = Arc::new(FakeApi {
            lineups: Script::Respond(vec![
                json!({"team": {"name": "Arsenal"}, "formation": "4-3-3", "startXI": []}),
                json!({"team": {"name": "Chelsea"}, "formation": "4-2-3-1", "startXI": []}),
            ]),
            ..FakeApi::new()
        });
        let svc = EnrichmentService::new(seeded_repo().await, Some(api));

        let details = svc.match_details(1001).await.unwrap();
        assert!(details.lineups_confirmed);
        assert!(!details.lineups.needs_fetch());
    }

    #[tokio::test]
    async fn no_client_runs_store_only() {
        let svc = EnrichmentService::new(seeded_repo().await, None);
        let details = svc.match_details(1001).await.unwrap();
        assert!(!details.fetched_from_api);
        assert!(details.odds.needs_fetch());
    }

    #[test]
    fn normalize_odds_takes_first_bookmaker() {
        let resp = ApiResponse {
            response: odds_response(),
            errors: Value::Null,
        };
        let normalized = normalize_odds(&resp).unwrap();
        let markets = normalized.as_array().unwrap();
        assert_eq!(markets.len(), 1);
        assert_eq!(markets[0]["name"].as_str(), Some("Match Winner"));
        assert_eq!(markets[0]["values"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn normalize_odds_empty_response_is_none() {
        assert!(normalize_odds(&ApiResponse::default()).is_none());
    }
}
