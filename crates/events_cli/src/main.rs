//! Command-line entry point for the events store.
//!
//! # Responsibility
//! - Parse flags/environment into a database path and logging setup.
//! - Dispatch one use-case per invocation and print JSON lines to stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use events_core::db::{open_db, DEFAULT_DB_FILE_NAME};
use events_core::seed::{COLLECTION_NAME, DATABASE_NAME};
use events_core::{
    default_log_level, init_logging, now_epoch_ms, seed_database, Event, EventCategory, EventId,
    EventRepository, EventService, EventStatus, SqliteEventRepository,
};
use log::{info, LevelFilter};
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "events", version, about = "Seed and manage the events collection")]
struct Cli {
    /// SQLite file backing the events database.
    #[arg(long, env = "EVENTS_DB_PATH", default_value = DEFAULT_DB_FILE_NAME, global = true)]
    db: PathBuf,

    /// off|error|warn|info|debug|trace
    #[arg(long, env = "EVENTS_LOG_LEVEL", global = true)]
    log_level: Option<LevelFilter>,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "EVENTS_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert the sample documents into the events collection.
    Seed,
    /// List events, newest first.
    List {
        #[arg(long, value_parser = parse_status)]
        status: Option<EventStatus>,
        /// Reviewed events in this category only.
        #[arg(long, value_parser = parse_category, conflicts_with_all = ["status", "needs_action"])]
        category: Option<EventCategory>,
        /// Reviewed events flagged for follow-up only.
        #[arg(long, conflicts_with = "status")]
        needs_action: bool,
    },
    /// Print one event.
    Show { id: EventId },
    /// Classify a reviewed event from its type.
    Classify { id: EventId },
    /// Assign a category to a reviewed event.
    ManualClassify {
        id: EventId,
        #[arg(value_parser = parse_category)]
        category: EventCategory,
    },
    /// Delete one event.
    Delete { id: EventId },
    /// Print the number of stored events.
    Count,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.unwrap_or_else(default_log_level);
        init_logging(level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open {DATABASE_NAME} at `{}`", cli.db.display()))?;
    let repo = SqliteEventRepository::try_new(&conn)?;
    let service = EventService::new(repo);

    match cli.command {
        Command::Seed => {
            let ids = seed_database(service.repository(), now_epoch_ms())?;
            info!("event=cli_seed module=cli status=ok count={}", ids.len());
            print_json(&json!({
                "database": DATABASE_NAME,
                "collection": COLLECTION_NAME,
                "inserted_ids": ids,
            }))?;
        }
        Command::List {
            status,
            category,
            needs_action,
        } => {
            let events = match (status, category, needs_action) {
                (_, Some(category), _) => service.list_by_category(category)?,
                (_, None, true) => service.list_needing_action()?,
                (Some(status), None, false) => service.list_by_status(status)?,
                (None, None, false) => service.list_events()?,
            };
            print_events(&events)?;
        }
        Command::Show { id } => print_json(&service.get_event(id)?)?,
        Command::Classify { id } => print_json(&service.classify_event(id)?)?,
        Command::ManualClassify { id, category } => {
            print_json(&service.manual_classify_event(id, category)?)?
        }
        Command::Delete { id } => {
            service.delete_event(id)?;
            print_json(&json!({ "deleted": id }))?;
        }
        Command::Count => {
            let count = service.repository().count_events()?;
            print_json(&json!({ "collection": COLLECTION_NAME, "count": count }))?;
        }
    }

    Ok(())
}

fn parse_status(value: &str) -> Result<EventStatus, String> {
    EventStatus::parse(value)
        .ok_or_else(|| format!("expected `Pending review` or `Reviewed`, got `{value}`"))
}

fn parse_category(value: &str) -> Result<EventCategory, String> {
    EventCategory::parse(value)
        .ok_or_else(|| format!("expected `Requires action` or `No action needed`, got `{value}`"))
}

fn print_events(events: &[Event]) -> Result<()> {
    for event in events {
        print_json(event)?;
    }
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
