pub mod config;
pub mod db;
pub mod ledger;
pub mod models;
pub mod utils;

pub use db::{DayLogStore, MemoryStore, SqliteStore, StoreError};
pub use ledger::{Clock, FixedClock, PrayerLedger, SystemClock};
pub use models::{DailyStats, DayLog, PrayerName, Streak, WeeklyGrid};
