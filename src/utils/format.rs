use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, Utc};

/// Format a ratio in `[0, 1]` as a whole percentage
pub fn format_percent(ratio: f64) -> String {
    format!("{:.0}%", (ratio.clamp(0.0, 1.0) * 100.0))
}

/// Format a completion instant as local "HH:MM"
pub fn format_completed_at(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%H:%M").to_string()
}

/// Format a streak length as "1 day" / "N days"
pub fn format_days(n: u32) -> String {
    if n == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", n)
    }
}

/// Create a simple ASCII progress bar
pub fn progress_bar(filled: u32, total: u32, width: usize) -> String {
    if total == 0 {
        return "░".repeat(width);
    }
    let ratio = (filled as f64 / total as f64).min(1.0);
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}

/// Parse a UTC offset string into total minutes.
/// Accepts: "5:30", "+5:30", "-5:30", "5", "+5", "5.5"
pub fn parse_tz_offset(s: &str) -> Result<i32> {
    let s = s.trim().trim_start_matches('+');
    let negative = s.starts_with('-');
    let s = s.trim_start_matches('-');
    let sign = if negative { -1 } else { 1 };

    let minutes = if let Some((hours, mins)) = s.split_once(':') {
        let hours = parse_hours(hours.parse()?)?;
        let mins: i32 = mins.parse()?;
        if !(0..60).contains(&mins) {
            return Err(anyhow!("Minutes must be below 60: {}", mins));
        }
        hours * 60 + mins
    } else if s.contains('.') {
        let hours: f64 = s.parse()?;
        if !(0.0..24.0).contains(&hours) {
            return Err(anyhow!("Offset must be under 24 hours: {}", s));
        }
        (hours * 60.0).round() as i32
    } else {
        parse_hours(s.parse()?)? * 60
    };

    if minutes >= 24 * 60 {
        return Err(anyhow!("Offset must be under 24 hours: {}", s));
    }
    Ok(sign * minutes)
}

fn parse_hours(hours: i32) -> Result<i32> {
    if !(0..24).contains(&hours) {
        return Err(anyhow!("Offset must be under 24 hours: {}", hours));
    }
    Ok(hours)
}

/// Format total minutes as "+H:MM" string
pub fn format_tz_offset(minutes: i32) -> String {
    let sign = if minutes < 0 { "-" } else { "+" };
    let abs = minutes.abs();
    let h = abs / 60;
    let m = abs % 60;
    if m == 0 {
        format!("{}{}", sign, h)
    } else {
        format!("{}{}:{:02}", sign, h, m)
    }
}
