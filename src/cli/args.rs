use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "prayer-ledger",
    version,
    author,
    about = "Track daily prayers, streaks and completion"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mark a prayer as completed (or undo it)
    Mark {
        /// Prayer name (fajr, zuhr, asr, maghrib, isha)
        prayer: String,
        /// Remove the completion instead
        #[arg(long)]
        undo: bool,
        /// Day to mark (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the checklist for a day
    Status {
        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the full-day streak, or one prayer's streak
    Streak {
        /// Only count this prayer
        #[arg(long)]
        prayer: Option<String>,
        /// Last day of the streak (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show statistics
    Stats {
        /// Show a heat row for the last 7 days
        #[arg(long)]
        week: bool,
    },
    /// Export recent history to stdout
    Export {
        /// Number of days ending today
        #[arg(long, default_value = "7")]
        days: u32,
        /// Emit JSON day logs instead of a text summary
        #[arg(long)]
        json: bool,
    },
    /// Show or update configuration
    Config {
        /// UTC offset used to decide the calendar day (e.g. +5, -3:30)
        #[arg(long, allow_hyphen_values = true)]
        timezone: Option<String>,
        /// Maximum number of days a streak may look back
        #[arg(long)]
        lookback: Option<u32>,
    },
    /// Delete every recorded completion
    Wipe {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
