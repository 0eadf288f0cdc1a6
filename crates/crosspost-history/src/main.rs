use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use shared::{decode_title, Config, PublishRecord, SqliteRecordStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "crosspost-history")]
#[command(about = "List the most recently cross-posted items")]
struct Args {
    /// Number of records to show
    #[arg(short, long, default_value = "20")]
    limit: usize,

    /// Only show records from this origin category
    #[arg(short, long)]
    category: Option<String>,

    /// Record store location (defaults to CROSSPOST_DB_PATH, .env files included)
    #[arg(long)]
    db: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let db_path = match args.db {
        Some(path) => path,
        None => Config::db_path_from_env()?,
    };

    if !db_path.exists() {
        anyhow::bail!(
            "No record store at {}. Nothing has been published yet.",
            db_path.display()
        );
    }

    let store = SqliteRecordStore::open(&db_path)
        .with_context(|| format!("Failed to open record store at {}", db_path.display()))?;
    let records = store.recent(args.limit, args.category.as_deref())?;

    if records.is_empty() {
        println!("No published items found.");
        return Ok(());
    }

    println!(
        "📚 {} most recent of {} published items:\n",
        records.len(),
        store.count()?
    );
    for record in &records {
        println!("{}", format_record(record));
    }

    Ok(())
}

fn format_record(record: &PublishRecord) -> String {
    let when = DateTime::parse_from_rfc3339(&record.published_at)
        .map(|dt| {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|_| record.published_at.clone());

    format!(
        "{}  [{}] {}\n                  {}",
        when,
        record.category,
        decode_title(&record.title),
        record.url
    )
}
