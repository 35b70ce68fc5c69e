use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::repository::{Repository, Secondary};
use crate::enrichment::EnrichmentService;
use crate::error::Result;
use crate::picks::{PickRun, PickSelector};
use crate::scoring::score_fixture;
use crate::types::Fixture;

/// The daily job: enrich the day's fixtures, score their markets and persist
/// the pick portfolio for the date.
pub struct PicksPipeline {
    repo: Repository,
    enrichment: EnrichmentService,
    selector: Arc<PickSelector>,
    target_leagues: Vec<i64>,
    max_concurrent: usize,
}

impl PicksPipeline {
    pub fn new(
        repo: Repository,
        enrichment: EnrichmentService,
        selector: Arc<PickSelector>,
        cfg: &Config,
    ) -> Self {
        Self {
            repo,
            enrichment,
            selector,
            target_leagues: cfg.target_leagues.clone(),
            max_concurrent: cfg.max_concurrent_enrichments,
        }
    }

    pub async fn generate_daily_picks(&self, date: NaiveDate) -> Result<PickRun> {
        let fixtures: Vec<Fixture> = self
            .repo
            .fixtures_for_date(date)
            .await?
            .into_iter()
            .filter(|f| f.is_upcoming() && self.target_leagues.contains(&f.league_id))
            .collect();
        info!(%date, fixtures = fixtures.len(), "scoring day's fixtures");

        self.backfill(&fixtures).await;

        let mut candidates = Vec::new();
        for fixture in &fixtures {
            let (odds, predictions) = tokio::try_join!(
                self.repo.secondary(Secondary::Odds, fixture.id),
                self.repo.secondary(Secondary::Predictions, fixture.id),
            )?;
            let (Some(odds), Some(predictions)) = (odds.as_value(), predictions.as_value())
            else {
                continue;
            };
            candidates.extend(score_fixture(fixture, odds, predictions));
        }
        info!(candidates = candidates.len(), "market scoring complete");

        self.selector.select_and_persist(date, candidates).await
    }

    /// Fetch odds+predictions for fixtures still missing them, at most
    /// `max_concurrent` fixtures in flight. Failures are logged per fixture
    /// and never abort the run.
    async fn backfill(&self, fixtures: &[Fixture]) {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();

        for fixture in fixtures {
            let enrichment = self.enrichment.clone();
            let semaphore = semaphore.clone();
            let fixture_id = fixture.id;
            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition cannot fail.
                let _permit = match semaphore.acquire_owned().await {
                    Ok(p) => p,
                    Err(_) => return (fixture_id, Ok(())),
                };
                (fixture_id, enrichment.backfill_markets(fixture_id).await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((fixture_id, Err(e))) => {
                    warn!(fixture_id, "market backfill failed: {e}");
                }
                Ok((_, Ok(()))) => {}
                Err(e) => warn!("backfill task panicked: {e}"),
            }
        }
    }
}
