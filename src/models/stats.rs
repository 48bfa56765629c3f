use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DayLog, PrayerName};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub prayers_done: u8,
    pub prayers_total: u8,
}

impl DailyStats {
    pub fn from_log(log: &DayLog) -> Self {
        Self {
            date: log.date,
            prayers_done: log.completed_count() as u8,
            prayers_total: PrayerName::COUNT as u8,
        }
    }

    pub fn completion_ratio(&self) -> f64 {
        if self.prayers_total == 0 {
            0.0
        } else {
            self.prayers_done as f64 / self.prayers_total as f64
        }
    }

    pub fn is_full(&self) -> bool {
        self.prayers_total > 0 && self.prayers_done >= self.prayers_total
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub current: u32,
    pub best: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklyGrid {
    pub days: Vec<DailyStats>,
}

impl WeeklyGrid {
    pub fn new(days: Vec<DailyStats>) -> Self {
        Self { days }
    }

    pub fn total_done(&self) -> u32 {
        self.days.iter().map(|d| d.prayers_done as u32).sum()
    }

    pub fn days_with_full_prayers(&self) -> u32 {
        self.days.iter().filter(|d| d.is_full()).count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(day: u32, done: u8) -> DailyStats {
        DailyStats {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            prayers_done: done,
            prayers_total: 5,
        }
    }

    #[test]
    fn test_completion_ratio_guards_zero_total() {
        let empty = DailyStats {
            prayers_total: 0,
            ..stats(1, 0)
        };
        assert_eq!(empty.completion_ratio(), 0.0);
        assert_eq!(stats(1, 5).completion_ratio(), 1.0);
    }

    #[test]
    fn test_weekly_grid_totals() {
        let grid = WeeklyGrid::new(vec![stats(1, 5), stats(2, 3), stats(3, 5), stats(4, 0)]);
        assert_eq!(grid.total_done(), 13);
        assert_eq!(grid.days_with_full_prayers(), 2);
    }
}
