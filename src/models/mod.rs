pub mod day_log;
pub mod prayer;
pub mod stats;

pub use day_log::{date_key, DayLog};
pub use prayer::PrayerName;
pub use stats::{DailyStats, Streak, WeeklyGrid};
