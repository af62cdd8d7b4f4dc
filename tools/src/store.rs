//! SQLite persistence for forecast runs.
//!
//! RULE: Only store.rs talks to the database.

use chrono::Utc;
use matchday_core::{
    engine::FixturePrediction, event::ForecastEvent, history::HistoryStore,
};
use rusqlite::{params, Connection, OpenFlags};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub struct RunStore {
    conn: Connection,
}

impl RunStore {
    pub fn open(path: &str) -> StoreResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> StoreResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, seed: u64, version: &str, mode: &str, trials: u64) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, mode, trials, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![run_id, seed as i64, version, mode, trials as i64, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    // ── Histories ──────────────────────────────────────────────

    pub fn save_histories(&mut self, run_id: &str, store: &HistoryStore) -> StoreResult<usize> {
        let tx = self.conn.transaction()?;
        let mut written = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO team_history
                 (run_id, team_id, home_scored, home_conceded, away_scored, away_conceded)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (team, history) in store.teams() {
                stmt.execute(params![
                    run_id,
                    team,
                    serde_json::to_string(&history.home_scored)?,
                    serde_json::to_string(&history.home_conceded)?,
                    serde_json::to_string(&history.away_scored)?,
                    serde_json::to_string(&history.away_conceded)?,
                ])?;
                written += 1;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    pub fn history_count(&self, run_id: &str) -> StoreResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM team_history WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Predictions ────────────────────────────────────────────

    pub fn save_prediction(&mut self, run_id: &str, prediction: &FixturePrediction) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        let r = &prediction.result;
        tx.execute(
            "INSERT INTO prediction
             (run_id, fixture_index, home_team, away_team, home_win_prob, draw_prob, away_win_prob,
              expected_home_goals, expected_away_goals, fixture_seed, low_confidence)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                run_id,
                prediction.index as i64,
                prediction.fixture.home,
                prediction.fixture.away,
                r.home_win_prob,
                r.draw_prob,
                r.away_win_prob,
                r.expected_home_goals,
                r.expected_away_goals,
                r.seed as i64,
                r.low_confidence as i32,
            ],
        )?;
        for (rank, entry) in prediction.scorelines.entries.iter().enumerate() {
            tx.execute(
                "INSERT INTO scoreline (run_id, fixture_index, rank, home_goals, away_goals, probability)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    run_id,
                    prediction.index as i64,
                    rank as i64 + 1,
                    entry.home_goals,
                    entry.away_goals,
                    entry.probability,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn prediction_count(&self, run_id: &str) -> StoreResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM prediction WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, run_id: &str, event: &ForecastEvent) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (run_id, event_type, payload, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                run_id,
                event.type_name(),
                serde_json::to_string(event)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn event_payloads(&self, run_id: &str) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM event_log WHERE run_id = ?1 ORDER BY id ASC",
        )?;
        let payloads = stmt
            .query_map(params![run_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(payloads)
    }
}
