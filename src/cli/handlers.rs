use anyhow::{anyhow, Context, Result};
use chrono::{Days, NaiveDate};
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use prayer_ledger::config::AppConfig;
use prayer_ledger::utils::format::{
    format_completed_at, format_days, format_percent, format_tz_offset, parse_tz_offset,
    progress_bar,
};
use prayer_ledger::{Clock, DayLogStore, PrayerLedger, PrayerName};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn parse_prayer(s: &str) -> Result<PrayerName> {
    PrayerName::from_str(s)
        .map_err(|_| anyhow!("Unknown prayer '{}'. Use: fajr, zuhr, asr, maghrib, isha", s))
}

fn days_before(date: NaiveDate, n: u32) -> NaiveDate {
    date.checked_sub_days(Days::new(n as u64)).unwrap_or(NaiveDate::MIN)
}

// ─── Mark ────────────────────────────────────────────────────────────────────

pub fn handle_mark<S: DayLogStore, C: Clock>(
    ledger: &mut PrayerLedger<S, C>,
    prayer_str: &str,
    undo: bool,
    date: Option<NaiveDate>,
) -> Result<()> {
    let prayer = parse_prayer(prayer_str)?;
    let date = date.unwrap_or_else(|| ledger.today());

    ledger.set_completed(prayer, !undo, date);

    // Read back so a failed write is visible to the user
    if ledger.is_completed(prayer, date) == !undo {
        if undo {
            println_colored!(DIM, "  ○ {} unmarked for {}", prayer, date);
        } else {
            println_colored!(GREEN, "  ✓ {} marked as done for {}", prayer, date);
        }
    } else {
        println_colored!(RED, "  ✗ Could not record {} for {}", prayer, date);
    }
    Ok(())
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub fn handle_status<S: DayLogStore, C: Clock>(
    ledger: &PrayerLedger<S, C>,
    date: Option<NaiveDate>,
) -> Result<()> {
    let date = date.unwrap_or_else(|| ledger.today());
    let log = ledger.day_log(date);

    println!();
    println_colored!(GOLD, "  Prayers — {}", date.format("%A, %b %d, %Y"));
    println!();
    for prayer in PrayerName::all() {
        match log.completed_at(prayer) {
            Some(at) => println_colored!(
                GREEN,
                "  ●  {:<8}  {}",
                prayer.display_name(),
                format_completed_at(at, ledger.offset())
            ),
            None => println_colored!(DIM, "  ○  {:<8}  --:--", prayer.display_name()),
        }
    }
    println!();
    println_colored!(
        BOLD,
        "  {}/{}  {}",
        log.completed_count(),
        PrayerName::COUNT,
        progress_bar(log.completed_count() as u32, PrayerName::COUNT as u32, 10)
    );
    println!();
    Ok(())
}

// ─── Streak ──────────────────────────────────────────────────────────────────

pub fn handle_streak<S: DayLogStore, C: Clock>(
    ledger: &PrayerLedger<S, C>,
    prayer: Option<&str>,
    date: Option<NaiveDate>,
) -> Result<()> {
    let date = date.unwrap_or_else(|| ledger.today());
    match prayer {
        Some(p) => {
            let prayer = parse_prayer(p)?;
            let streak = ledger.prayer_streak(prayer, date);
            println_colored!(
                GREEN,
                "  {} streak: {} (ending {})",
                prayer,
                format_days(streak),
                date
            );
        }
        None => {
            let streak = ledger.streak(date);
            println_colored!(
                GREEN,
                "  Full-day streak: {} (ending {})  |  best {}",
                format_days(streak.current),
                date,
                format_days(streak.best)
            );
        }
    }
    Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats<S: DayLogStore, C: Clock>(
    ledger: &PrayerLedger<S, C>,
    week: bool,
) -> Result<()> {
    let today = ledger.today();
    let streak = ledger.streak(today);
    let completion = ledger.last_7_days_completion();

    println!();
    println_colored!(GOLD, "  Statistics");
    println!();
    println_colored!(
        BOLD,
        "  Streak:      {} current  |  {} best",
        format_days(streak.current),
        format_days(streak.best)
    );
    let color = if completion >= 0.8 { GREEN } else { AMBER };
    println_colored!(
        color,
        "  Last 7 days: {}  {}",
        format_percent(completion),
        progress_bar((completion * 100.0).round() as u32, 100, 20)
    );

    println!();
    for prayer in PrayerName::all() {
        println!(
            "  {:<8}  {}",
            prayer.display_name(),
            format_days(ledger.prayer_streak(prayer, today))
        );
    }

    if week {
        println!();
        println_colored!(DIM, "  Last 7 days  (● = 5/5, ◕ = 3-4, ◑ = 1-2, ○ = 0/5)");
        println!();
        print!("  ");
        for stat in &ledger.weekly_grid(today).days {
            let icon = match stat.prayers_done {
                5 => format!("{}●\x1b[0m ", GREEN),
                3 | 4 => format!("{}◕\x1b[0m ", AMBER),
                1 | 2 => format!("{}◑\x1b[0m ", AMBER),
                _ => format!("{}○\x1b[0m ", DIM),
            };
            print!("{}", icon);
        }
        println!();
    }

    println!();
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

pub fn handle_export<S: DayLogStore, C: Clock>(
    ledger: &PrayerLedger<S, C>,
    days: u32,
    json: bool,
) -> Result<()> {
    if days == 0 {
        return Err(anyhow!("--days must be at least 1"));
    }
    let today = ledger.today();
    let start = days_before(today, days - 1);

    if json {
        let logs = ledger.history(start, today);
        let out = serde_json::to_string_pretty(&logs).context("Serializing day logs")?;
        println!("{}", out);
        return Ok(());
    }

    let streak = ledger.streak(today);
    println!("# prayer-ledger — Summary");
    println!("# {} to {}", start, today);
    println!();
    println!("## Prayer Completion");
    for stat in ledger.daily_stats(start, today) {
        println!(
            "  {}  {}/{}  {}",
            stat.date,
            stat.prayers_done,
            stat.prayers_total,
            progress_bar(stat.prayers_done as u32, stat.prayers_total as u32, 5)
        );
    }
    println!();
    println!("## Summary");
    println!(
        "  Streak:      {} (best: {})",
        format_days(streak.current),
        format_days(streak.best)
    );
    println!(
        "  Completion:  {}",
        format_percent(ledger.completion_rate(days, today))
    );
    Ok(())
}

// ─── Config ──────────────────────────────────────────────────────────────────

pub fn handle_config(
    config: &mut AppConfig,
    timezone: Option<&str>,
    lookback: Option<u32>,
) -> Result<()> {
    let mut changed = false;
    if let Some(tz) = timezone {
        let minutes = parse_tz_offset(tz)
            .with_context(|| format!("Invalid timezone offset '{}'", tz))?;
        config.ledger.timezone_offset = Some(minutes);
        changed = true;
    }
    if let Some(days) = lookback {
        if days == 0 {
            return Err(anyhow!("--lookback must be at least 1"));
        }
        config.ledger.max_lookback_days = days;
        changed = true;
    }
    if changed {
        config.save()?;
        println_colored!(GREEN, "  ✓ Configuration saved");
    }

    let offset = match config.ledger.timezone_offset {
        Some(minutes) => format!("UTC{}", format_tz_offset(minutes)),
        None => "system local".to_string(),
    };
    println!();
    println_colored!(GOLD, "  Configuration");
    println!();
    println!("  Config file:  {:?}", AppConfig::config_path()?);
    println!("  Database:     {:?}", config.db_path()?);
    println!("  Day boundary: {}", offset);
    println!("  Lookback:     {}", format_days(config.ledger.max_lookback_days));
    println!();
    Ok(())
}

// ─── Wipe ────────────────────────────────────────────────────────────────────

pub fn handle_wipe<S: DayLogStore, C: Clock>(
    ledger: &mut PrayerLedger<S, C>,
    yes: bool,
) -> Result<()> {
    if !yes {
        let answer = prompt("  Delete every recorded prayer? Type 'yes' to confirm: ")?;
        if answer.trim() != "yes" {
            println_colored!(DIM, "  Nothing deleted");
            return Ok(());
        }
    }
    if ledger.wipe() {
        println_colored!(AMBER, "  All records deleted");
    } else {
        println_colored!(RED, "  ✗ Could not delete records");
    }
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim_end_matches('\n').trim_end_matches('\r').to_string())
}
