//! Database row types matching the schema in migrations/0001_init.sql.
//! Used by sqlx for typed queries.

use chrono::{DateTime, Utc};

use crate::types::Fixture;

#[derive(Debug, sqlx::FromRow)]
pub struct FixtureRow {
    pub id: i64,
    pub league_id: i64,
    pub home_team_id: i64,
    pub away_team_id: i64,
    pub date_utc: String,
    pub status: String,
    pub home_name: String,
    pub away_name: String,
    pub league_name: Option<String>,
}

impl From<FixtureRow> for Fixture {
    fn from(r: FixtureRow) -> Self {
        // Non-RFC3339 kickoff strings degrade to None rather than failing the read.
        let kickoff_utc = DateTime::parse_from_rfc3339(&r.date_utc)
            .ok()
            .map(|t| t.with_timezone(&Utc));
        Fixture {
            id: r.id,
            league_id: r.league_id,
            home_team_id: r.home_team_id,
            away_team_id: r.away_team_id,
            home_name: r.home_name,
            away_name: r.away_name,
            league_name: r.league_name,
            kickoff_utc,
            status: r.status,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct PayloadRow {
    pub payload: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct LineupRow {
    pub confirmed: i64,
    pub payload: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct DailyPickRow {
    pub id: i64,
    pub date: String,
    pub fixture_id: i64,
    pub risk_level: String,
    pub title: String,
    pub thesis: String,
    pub score: f64,
    pub market: String,
    pub market_line: Option<f64>,
    pub selection: Option<String>,
    pub odd: f64,
    pub is_featured: i64,
}
