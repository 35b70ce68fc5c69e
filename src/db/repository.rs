use chrono::{NaiveDate, Utc};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::db::models::{DailyPickRow, FixtureRow, LineupRow, PayloadRow};
use crate::error::Result;
use crate::types::{DailyPick, Fixture, Payload};

/// Secondary per-fixture record tables. Payloads are opaque JSON, upserted
/// wholesale — last write wins, never versioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Secondary {
    Lineups,
    Events,
    Stats,
    Odds,
    Predictions,
}

impl Secondary {
    fn table(self) -> &'static str {
        match self {
            Secondary::Lineups => "lineups",
            Secondary::Events => "events",
            Secondary::Stats => "stats",
            Secondary::Odds => "odds",
            Secondary::Predictions => "predictions",
        }
    }
}

const FIXTURE_COLUMNS: &str = "f.id, f.league_id, f.home_team_id, f.away_team_id, \
    f.date_utc, f.status, h.name AS home_name, a.name AS away_name, l.name AS league_name";

const FIXTURE_JOINS: &str = "FROM fixtures f \
    JOIN teams h ON h.id = f.home_team_id \
    JOIN teams a ON a.id = f.away_team_id \
    LEFT JOIN leagues l ON l.id = f.league_id";

#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // --- fixtures -----------------------------------------------------------

    pub async fn fixture(&self, fixture_id: i64) -> Result<Option<Fixture>> {
        let sql = format!("SELECT {FIXTURE_COLUMNS} {FIXTURE_JOINS} WHERE f.id = ?");
        let row = sqlx::query_as::<_, FixtureRow>(&sql)
            .bind(fixture_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Fixture::from))
    }

    pub async fn fixtures_for_date(&self, date: NaiveDate) -> Result<Vec<Fixture>> {
        let sql = format!(
            "SELECT {FIXTURE_COLUMNS} {FIXTURE_JOINS} \
             WHERE f.date_utc >= ? AND f.date_utc <= ? ORDER BY f.date_utc"
        );
        let rows = sqlx::query_as::<_, FixtureRow>(&sql)
            .bind(format!("{date}T00:00:00"))
            .bind(format!("{date}T23:59:59"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Fixture::from).collect())
    }

    // --- secondary payloads -------------------------------------------------

    pub async fn secondary(&self, table: Secondary, fixture_id: i64) -> Result<Payload> {
        let sql = format!("SELECT payload FROM {} WHERE fixture_id = ?", table.table());
        let row = sqlx::query_as::<_, PayloadRow>(&sql)
            .bind(fixture_id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            None => Ok(Payload::Missing),
            Some(r) => match r.payload {
                None => Ok(Payload::Empty),
                Some(raw) => Ok(Payload::from_db(Some(serde_json::from_str(&raw)?))),
            },
        }
    }

    pub async fn upsert_secondary(
        &self,
        table: Secondary,
        fixture_id: i64,
        payload: &Value,
    ) -> Result<()> {
        let sql = format!(
            "INSERT INTO {t} (fixture_id, payload, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(fixture_id) DO UPDATE SET \
             payload = excluded.payload, updated_at = excluded.updated_at",
            t = table.table()
        );
        sqlx::query(&sql)
            .bind(fixture_id)
            .bind(payload.to_string())
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn lineups(&self, fixture_id: i64) -> Result<(Payload, bool)> {
        let row = sqlx::query_as::<_, LineupRow>(
            "SELECT confirmed, payload FROM lineups WHERE fixture_id = ?",
        )
        .bind(fixture_id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            None => Ok((Payload::Missing, false)),
            Some(r) => {
                let payload = match r.payload {
                    None => Payload::Empty,
                    Some(raw) => Payload::from_db(Some(serde_json::from_str(&raw)?)),
                };
                Ok((payload, r.confirmed != 0))
            }
        }
    }

    pub async fn upsert_lineups(
        &self,
        fixture_id: i64,
        confirmed: bool,
        payload: &Value,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO lineups (fixture_id, confirmed, payload, updated_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT(fixture_id) DO UPDATE SET confirmed = excluded.confirmed, \
             payload = excluded.payload, updated_at = excluded.updated_at",
        )
        .bind(fixture_id)
        .bind(i64::from(confirmed))
        .bind(payload.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // --- standings ----------------------------------------------------------

    pub async fn standings(&self, league_id: i64, season: i32) -> Result<Option<Value>> {
        let row = sqlx::query_as::<_, PayloadRow>(
            "SELECT payload FROM standings WHERE league_id = ? AND season = ?",
        )
        .bind(league_id)
        .bind(season)
        .fetch_optional(&self.pool)
        .await?;
        match row.and_then(|r| r.payload) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn upsert_standings(
        &self,
        league_id: i64,
        season: i32,
        payload: &Value,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO standings (league_id, season, payload, updated_at) VALUES (?, ?, ?, ?) \
             ON CONFLICT(league_id, season) DO UPDATE SET \
             payload = excluded.payload, updated_at = excluded.updated_at",
        )
        .bind(league_id)
        .bind(season)
        .bind(payload.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // --- daily picks --------------------------------------------------------

    /// Idempotent replace: delete the date's rows and reinsert inside one
    /// transaction. An empty slice leaves the date cleared.
    pub async fn replace_picks(&self, date: NaiveDate, picks: &[DailyPick]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM daily_picks WHERE date = ?")
            .bind(date.to_string())
            .execute(&mut *tx)
            .await?;
        for p in picks {
            sqlx::query(
                "INSERT INTO daily_picks \
                 (date, fixture_id, risk_level, title, thesis, score, market, \
                  market_line, selection, odd, is_featured) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(p.date.to_string())
            .bind(p.fixture_id)
            .bind(p.risk.to_string())
            .bind(&p.title)
            .bind(&p.thesis)
            .bind(p.score)
            .bind(p.market.to_string())
            .bind(p.line)
            .bind(p.selection.map(|s| s.to_string()))
            .bind(p.odd)
            .bind(i64::from(p.is_featured))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn picks_for_date(&self, date: NaiveDate) -> Result<Vec<DailyPickRow>> {
        let rows = sqlx::query_as::<_, DailyPickRow>(
            "SELECT id, date, fixture_id, risk_level, title, thesis, score, market, \
             market_line, selection, odd, is_featured \
             FROM daily_picks WHERE date = ? ORDER BY id",
        )
        .bind(date.to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // --- seed helpers (sync job + tests) ------------------------------------

    pub async fn upsert_league(&self, id: i64, name: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO leagues (id, name) VALUES (?, ?) \
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        )
        .bind(id)
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_team(&self, id: i64, name: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO teams (id, name) VALUES (?, ?) \
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        )
        .bind(id)
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn upsert_fixture(
        &self,
        id: i64,
        league_id: i64,
        home_team_id: i64,
        away_team_id: i64,
        date_utc: &str,
        status: &str,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO fixtures (id, league_id, home_team_id, away_team_id, date_utc, status) \
             VALUES (?, ?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET status = excluded.status, \
             date_utc = excluded.date_utc",
        )
        .bind(id)
        .bind(league_id)
        .bind(home_team_id)
        .bind(away_team_id)
        .bind(date_utc)
        .bind(status)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
