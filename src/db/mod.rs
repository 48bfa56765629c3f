pub mod migrations;
pub mod repository;

use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::DayLog;

pub use repository::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Corrupt record for {date}: {reason}")]
    Corrupt { date: String, reason: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Day-keyed persistence for [`DayLog`]s.
pub trait DayLogStore {
    fn load(&self, date: NaiveDate) -> Result<Option<DayLog>>;

    /// Persist the log, replacing whatever was stored for its day. An empty
    /// log leaves nothing behind for that day.
    fn save(&mut self, log: &DayLog) -> Result<()>;

    /// Earliest day with any record, or `None` when the store is empty.
    fn earliest_date(&self) -> Result<Option<NaiveDate>>;

    /// Remove every record.
    fn clear(&mut self) -> Result<()>;

    /// Stored logs for `start..=end`, ascending. Days without a record are
    /// omitted.
    fn load_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DayLog>> {
        let mut logs = Vec::new();
        for date in start.iter_days().take_while(|d| *d <= end) {
            if let Some(log) = self.load(date)? {
                logs.push(log);
            }
        }
        Ok(logs)
    }
}

impl<S: DayLogStore + ?Sized> DayLogStore for Box<S> {
    fn load(&self, date: NaiveDate) -> Result<Option<DayLog>> {
        (**self).load(date)
    }

    fn save(&mut self, log: &DayLog) -> Result<()> {
        (**self).save(log)
    }

    fn earliest_date(&self) -> Result<Option<NaiveDate>> {
        (**self).earliest_date()
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }

    fn load_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DayLog>> {
        (**self).load_range(start, end)
    }
}

/// Non-persistent store, used by tests and by callers that bring their own
/// persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    days: BTreeMap<NaiveDate, DayLog>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DayLogStore for MemoryStore {
    fn load(&self, date: NaiveDate) -> Result<Option<DayLog>> {
        Ok(self.days.get(&date).cloned())
    }

    fn save(&mut self, log: &DayLog) -> Result<()> {
        if log.is_empty() {
            self.days.remove(&log.date);
        } else {
            self.days.insert(log.date, log.clone());
        }
        Ok(())
    }

    fn earliest_date(&self) -> Result<Option<NaiveDate>> {
        Ok(self.days.keys().next().copied())
    }

    fn clear(&mut self) -> Result<()> {
        self.days.clear();
        Ok(())
    }

    fn load_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DayLog>> {
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self.days.range(start..=end).map(|(_, log)| log.clone()).collect())
    }
}
