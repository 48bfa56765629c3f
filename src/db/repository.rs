use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::str::FromStr;

use crate::db::migrations::run_migrations;
use crate::db::{DayLogStore, Result, StoreError};
use crate::models::{date_key, DayLog, PrayerName};

/// SQLite-backed [`DayLogStore`]: one row per completed prayer.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file and bring its schema up to date.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        // WAL lets the CLI read while the dashboard holds the file open
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        debug!("Opened ledger database at {:?}", path);
        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    fn rows_between(&self, start: &str, end: &str) -> Result<Vec<(String, String, String)>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, prayer, completed_at FROM completions
             WHERE date >= ?1 AND date <= ?2
             ORDER BY date",
        )?;

        let rows = stmt.query_map(params![start, end], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(StoreError::from)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| StoreError::Corrupt {
        date: s.to_string(),
        reason: format!("bad date: {}", e),
    })
}

fn parse_entry(
    date: &str,
    prayer: &str,
    completed_at: &str,
) -> Result<(PrayerName, DateTime<Utc>)> {
    let prayer = PrayerName::from_str(prayer).map_err(|e| StoreError::Corrupt {
        date: date.to_string(),
        reason: e.to_string(),
    })?;
    let at = DateTime::parse_from_rfc3339(completed_at)
        .map_err(|e| StoreError::Corrupt {
            date: date.to_string(),
            reason: format!("bad timestamp '{}': {}", completed_at, e),
        })?
        .with_timezone(&Utc);
    Ok((prayer, at))
}

/// Fold ordered `(date, prayer, completed_at)` rows into one log per day.
fn group_rows(rows: Vec<(String, String, String)>) -> Result<Vec<DayLog>> {
    let mut logs: Vec<DayLog> = Vec::new();
    for (date, prayer, completed_at) in rows {
        let day = parse_date(&date)?;
        let (prayer, at) = parse_entry(&date, &prayer, &completed_at)?;
        match logs.last_mut() {
            Some(log) if log.date == day => {
                log.mark(prayer, at);
            }
            _ => {
                let mut log = DayLog::new(day);
                log.mark(prayer, at);
                logs.push(log);
            }
        }
    }
    Ok(logs)
}

impl DayLogStore for SqliteStore {
    fn load(&self, date: NaiveDate) -> Result<Option<DayLog>> {
        let key = date_key(date);
        let rows = self.rows_between(&key, &key)?;
        Ok(group_rows(rows)?.pop())
    }

    fn save(&mut self, log: &DayLog) -> Result<()> {
        let key = log.key();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM completions WHERE date = ?1", params![key])?;
        for (prayer, at) in log.entries() {
            tx.execute(
                "INSERT INTO completions (date, prayer, completed_at) VALUES (?1, ?2, ?3)",
                params![key, prayer.as_str(), at.to_rfc3339()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn earliest_date(&self) -> Result<Option<NaiveDate>> {
        let earliest: Option<String> = self
            .conn
            .query_row("SELECT MIN(date) FROM completions", [], |row| row.get(0))
            .optional()?
            .flatten();
        earliest.as_deref().map(parse_date).transpose()
    }

    fn clear(&mut self) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM completions", [])?;
        debug!("Cleared {} completion rows", removed);
        Ok(())
    }

    fn load_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DayLog>> {
        if start > end {
            return Ok(Vec::new());
        }
        let rows = self.rows_between(&date_key(start), &date_key(end))?;
        group_rows(rows)
    }
}
