use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub id: i64,
    pub league_id: i64,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub home_name: String,
    pub away_name: String,
    pub league_name: Option<String>,
    pub kickoff_utc: Option<DateTime<Utc>>,
    /// Provider status code: NS, TBD, 1H, FT, ...
    pub status: String,
}

impl Fixture {
    /// True for fixtures that have not started — the only ones the picks job
    /// considers.
    pub fn is_upcoming(&self) -> bool {
        matches!(self.status.as_str(), "NS" | "TBD")
    }
}

// ---------------------------------------------------------------------------
// Payload tri-state
// ---------------------------------------------------------------------------

/// State of a persisted secondary record (lineups/events/stats/odds/predictions).
///
/// "Empty" covers a row whose payload is null, `{}`, or `[]` — the store keeps
/// such rows after failed or dataless fetches, and they must be treated the
/// same as an absent row when deciding whether to hit the remote again.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No row in the store.
    Missing,
    /// Row exists but the payload carries no data.
    Empty,
    Present(Value),
}

impl Payload {
    pub fn from_db(raw: Option<Value>) -> Self {
        match raw {
            None => Payload::Missing,
            Some(v) if value_is_empty(&v) => Payload::Empty,
            Some(v) => Payload::Present(v),
        }
    }

    /// Gates every fetch-or-fill decision in the enrichment path.
    pub fn needs_fetch(&self) -> bool {
        !matches!(self, Payload::Present(_))
    }

    /// Short label for log output.
    pub fn state(&self) -> &'static str {
        match self {
            Payload::Missing => "missing",
            Payload::Empty => "empty",
            Payload::Present(_) => "present",
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Payload::Present(v) => Some(v),
            _ => None,
        }
    }
}

pub fn value_is_empty(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Object(m) => m.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Risk classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskLevel {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "conservative" => Some(RiskLevel::Conservative),
            "moderate" => Some(RiskLevel::Moderate),
            "aggressive" => Some(RiskLevel::Aggressive),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Conservative => "conservative",
            RiskLevel::Moderate => "moderate",
            RiskLevel::Aggressive => "aggressive",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Pick markets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickMarket {
    MatchWinner,
    OverUnder,
    Btts,
}

impl PickMarket {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "match_winner" => Some(PickMarket::MatchWinner),
            "over_under" => Some(PickMarket::OverUnder),
            "btts" => Some(PickMarket::Btts),
            _ => None,
        }
    }
}

impl std::fmt::Display for PickMarket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PickMarket::MatchWinner => "match_winner",
            PickMarket::OverUnder => "over_under",
            PickMarket::Btts => "btts",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    Over,
    Under,
    Yes,
}

impl Selection {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "over" => Some(Selection::Over),
            "under" => Some(Selection::Under),
            "yes" => Some(Selection::Yes),
            _ => None,
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Selection::Over => "over",
            Selection::Under => "under",
            Selection::Yes => "yes",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Candidate pick — scoring engine output
// ---------------------------------------------------------------------------

/// One scored betting proposition for a single fixture. The odd and the win
/// probability are carried as first-class numeric fields; title/thesis are
/// display copy only and are never parsed back.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub fixture: Fixture,
    pub risk: RiskLevel,
    pub market: PickMarket,
    pub line: Option<f64>,
    pub selection: Option<Selection>,
    pub score: f64,
    pub odd: f64,
    /// Predicted win probability, Match Winner only.
    pub win_prob: Option<f64>,
    /// Favored team name, Match Winner only.
    pub team: Option<String>,
    pub title: String,
    pub thesis: String,
}

// ---------------------------------------------------------------------------
// Daily pick — persisted portfolio row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DailyPick {
    pub date: NaiveDate,
    pub fixture_id: i64,
    pub risk: RiskLevel,
    pub title: String,
    pub thesis: String,
    pub score: f64,
    pub market: PickMarket,
    pub line: Option<f64>,
    pub selection: Option<Selection>,
    pub odd: f64,
    pub is_featured: bool,
}

/// Structured presentation record for the featured pick. Read by the chat and
/// notification layers; never persisted with the pick rows.
#[derive(Debug, Clone, Serialize)]
pub struct FeaturedAnalysis {
    pub competition: String,
    pub match_name: String,
    pub kickoff: String,
    pub market: String,
    pub odd: f64,
    pub model_analysis: String,
    pub final_reading: String,
}
