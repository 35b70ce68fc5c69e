use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::MAX_PICKS_PER_DAY;
use crate::db::repository::Repository;
use crate::error::Result;
use crate::types::{Candidate, DailyPick, FeaturedAnalysis, PickMarket, RiskLevel, Selection};

use super::copy::CopyDeck;

const EXTRA_CONSERVATIVE_SLOTS: usize = 2;
const EXTRA_MODERATE_SLOTS: usize = 2;
const AGGRESSIVE_SLOTS: usize = 1;

/// Result of one pick-selection run for a date.
#[derive(Debug)]
pub struct PickRun {
    pub date: NaiveDate,
    pub count: usize,
    pub featured: Option<FeaturedAnalysis>,
    pub picks: Vec<DailyPick>,
}

/// Ranks scored candidates, enforces the portfolio invariants and persists
/// the day's picks. The copy deck sits behind a mutex, which also serializes
/// regeneration runs: two concurrent calls for the same date cannot
/// interleave their delete/insert cycles.
pub struct PickSelector {
    repo: Repository,
    deck: Mutex<CopyDeck>,
}

impl PickSelector {
    pub fn new(repo: Repository) -> Self {
        Self::with_deck(repo, CopyDeck::new())
    }

    pub fn with_deck(repo: Repository, deck: CopyDeck) -> Self {
        Self {
            repo,
            deck: Mutex::new(deck),
        }
    }

    /// Select up to five picks for `date` and replace whatever that date had
    /// before. An empty candidate list still clears the date.
    pub async fn select_and_persist(
        &self,
        date: NaiveDate,
        mut candidates: Vec<Candidate>,
    ) -> Result<PickRun> {
        let mut deck = self.deck.lock().await;

        // Stable sort: equal scores keep generation order.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        let featured_idx = candidates
            .iter()
            .position(|c| c.risk != RiskLevel::Aggressive);

        let mut chosen: Vec<usize> = Vec::new();
        if let Some(i) = featured_idx {
            chosen.push(i);
        }
        fill_tier(&candidates, featured_idx, RiskLevel::Conservative, EXTRA_CONSERVATIVE_SLOTS, &mut chosen);
        fill_tier(&candidates, featured_idx, RiskLevel::Moderate, EXTRA_MODERATE_SLOTS, &mut chosen);
        fill_tier(&candidates, featured_idx, RiskLevel::Aggressive, AGGRESSIVE_SLOTS, &mut chosen);
        chosen.truncate(MAX_PICKS_PER_DAY);

        let featured = featured_idx.map(|i| build_featured_analysis(&candidates[i], &mut deck));

        let picks: Vec<DailyPick> = chosen
            .iter()
            .enumerate()
            .map(|(pos, &i)| {
                let c = &candidates[i];
                let (title, thesis) = deck.teaser(c.risk);
                DailyPick {
                    date,
                    fixture_id: c.fixture.id,
                    risk: c.risk,
                    title,
                    thesis,
                    score: c.score,
                    market: c.market,
                    line: c.line,
                    selection: c.selection,
                    odd: c.odd,
                    is_featured: pos == 0 && featured_idx.is_some(),
                }
            })
            .collect();

        self.repo.replace_picks(date, &picks).await?;
        info!(
            %date,
            count = picks.len(),
            featured = featured.is_some(),
            "daily picks persisted"
        );

        Ok(PickRun {
            date,
            count: picks.len(),
            featured,
            picks,
        })
    }
}

fn fill_tier(
    candidates: &[Candidate],
    featured_idx: Option<usize>,
    risk: RiskLevel,
    limit: usize,
    chosen: &mut Vec<usize>,
) {
    let mut taken = 0;
    for (i, c) in candidates.iter().enumerate() {
        if taken == limit {
            break;
        }
        if Some(i) == featured_idx || c.risk != risk {
            continue;
        }
        chosen.push(i);
        taken += 1;
    }
}

fn build_featured_analysis(c: &Candidate, deck: &mut CopyDeck) -> FeaturedAnalysis {
    let kickoff = c
        .fixture
        .kickoff_utc
        .map(|t| t.format("%a %d %b %Y, %H:%M UTC").to_string())
        .unwrap_or_else(|| "kick-off TBD".to_string());

    FeaturedAnalysis {
        competition: c
            .fixture
            .league_name
            .clone()
            .unwrap_or_else(|| "Unknown competition".to_string()),
        match_name: format!("{} vs {}", c.fixture.home_name, c.fixture.away_name),
        kickoff,
        market: market_description(c),
        odd: c.odd,
        model_analysis: format!("{} {}", c.thesis, deck.model_analysis(c.risk)),
        final_reading: deck.final_reading().to_string(),
    }
}

pub fn market_description(c: &Candidate) -> String {
    match c.market {
        PickMarket::MatchWinner => match &c.team {
            Some(team) => format!("Match Winner: {team}"),
            None => "Match Winner".to_string(),
        },
        PickMarket::OverUnder => {
            let side = match c.selection {
                Some(Selection::Over) => "Over",
                _ => "Under",
            };
            match c.line {
                Some(line) => format!("{side} {line} goals"),
                None => format!("{side} goals"),
            }
        }
        PickMarket::Btts => "Both teams to score: Yes".to_string(),
    }
}
