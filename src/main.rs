mod cli;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use cli::args::{Cli, Commands};
use cli::handlers;
use prayer_ledger::config::AppConfig;
use prayer_ledger::{PrayerLedger, SqliteStore};

fn open_ledger(config: &AppConfig) -> Result<PrayerLedger<SqliteStore>> {
    let db_path = config.db_path()?;
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;
    let offset = config.ledger.offset()?;
    debug!(
        "Day boundary offset {}, lookback {} days",
        offset, config.ledger.max_lookback_days
    );

    Ok(PrayerLedger::new(store, offset).with_max_lookback(config.ledger.max_lookback_days))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    match cli.command {
        Some(Commands::Mark { prayer, undo, date }) => {
            let mut ledger = open_ledger(&config)?;
            handlers::handle_mark(&mut ledger, &prayer, undo, date)?;
        }
        Some(Commands::Status { date }) => {
            handlers::handle_status(&open_ledger(&config)?, date)?;
        }
        Some(Commands::Streak { prayer, date }) => {
            handlers::handle_streak(&open_ledger(&config)?, prayer.as_deref(), date)?;
        }
        Some(Commands::Stats { week }) => {
            handlers::handle_stats(&open_ledger(&config)?, week)?;
        }
        Some(Commands::Export { days, json }) => {
            handlers::handle_export(&open_ledger(&config)?, days, json)?;
        }
        // Runs without a ledger so an invalid stored offset can still be fixed
        Some(Commands::Config { timezone, lookback }) => {
            handlers::handle_config(&mut config, timezone.as_deref(), lookback)?;
        }
        Some(Commands::Wipe { yes }) => {
            let mut ledger = open_ledger(&config)?;
            handlers::handle_wipe(&mut ledger, yes)?;
        }

        // No subcommand → launch dashboard
        None => {
            tui::app::run(open_ledger(&config)?)?;
        }
    }

    Ok(())
}
