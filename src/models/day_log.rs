use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::PrayerName;

/// Prayers completed on one calendar day.
///
/// The completed set is the key set of `completed_at`, so a prayer is either
/// present with exactly one timestamp or absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayLog {
    pub date: NaiveDate,
    #[serde(default)]
    completed_at: BTreeMap<PrayerName, DateTime<Utc>>,
}

impl DayLog {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            completed_at: BTreeMap::new(),
        }
    }

    /// Storage key for the day, `YYYY-MM-DD`.
    pub fn key(&self) -> String {
        date_key(self.date)
    }

    /// Mark `prayer` completed at `at`. Returns false if it already was; the
    /// original timestamp is kept in that case.
    pub fn mark(&mut self, prayer: PrayerName, at: DateTime<Utc>) -> bool {
        if self.completed_at.contains_key(&prayer) {
            return false;
        }
        self.completed_at.insert(prayer, at);
        true
    }

    /// Returns false if `prayer` was not completed.
    pub fn unmark(&mut self, prayer: PrayerName) -> bool {
        self.completed_at.remove(&prayer).is_some()
    }

    pub fn is_completed(&self, prayer: PrayerName) -> bool {
        self.completed_at.contains_key(&prayer)
    }

    pub fn completed_at(&self, prayer: PrayerName) -> Option<DateTime<Utc>> {
        self.completed_at.get(&prayer).copied()
    }

    /// Completed prayers in day order.
    pub fn completed(&self) -> impl Iterator<Item = PrayerName> + '_ {
        self.completed_at.keys().copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (PrayerName, DateTime<Utc>)> + '_ {
        self.completed_at.iter().map(|(p, t)| (*p, *t))
    }

    pub fn completed_count(&self) -> usize {
        self.completed_at.len()
    }

    pub fn is_full_day(&self) -> bool {
        self.completed_at.len() == PrayerName::COUNT
    }

    pub fn is_empty(&self) -> bool {
        self.completed_at.is_empty()
    }
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
