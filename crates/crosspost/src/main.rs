use anyhow::{Context, Result};
use clap::Parser;
use shared::{
    init_logging, Config, Crossposter, FeedClient, RunSettings, SqliteRecordStore,
    TumblrPublisher,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "crosspost")]
#[command(about = "Cross-post the top of an aggregator feed to a Tumblr blog")]
struct Args {
    /// Only consider this many items from the top of the feed
    #[arg(short = 'n', long)]
    top_n: Option<usize>,

    /// Build and log every post but do not publish or record anything
    #[arg(long)]
    dry_run: bool,

    /// Record store location (defaults to CROSSPOST_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut config = Config::from_env()?;

    if let Some(top_n) = args.top_n {
        if top_n == 0 {
            anyhow::bail!("--top-n must be at least 1");
        }
        config.top_n = top_n;
    }
    if let Some(db) = args.db {
        config.db_path = db;
    }

    // Held until main returns so the log file is flushed on every exit path.
    let _logging = init_logging(&config.log_dir)?;

    let store = SqliteRecordStore::open(&config.db_path)
        .with_context(|| format!("Failed to open record store at {}", config.db_path.display()))?;
    let feed = FeedClient::new()?;
    let publisher = TumblrPublisher::new(config.tumblr_token.clone())?;

    let mut settings = RunSettings::from_config(&config);
    settings.dry_run = args.dry_run;

    info!(
        feed = %config.feed_url,
        top_n = config.top_n,
        blog = %config.target_blog,
        dry_run = args.dry_run,
        "Starting run"
    );

    let summary = Crossposter::new(&feed, &store, &publisher, settings)
        .run()
        .await;

    if !summary.fetched {
        println!("Feed unavailable, nothing to do this run.");
        return Ok(());
    }

    info!(
        considered = summary.considered,
        published = summary.published,
        would_publish = summary.would_publish,
        duplicates = summary.duplicates,
        skipped_adult = summary.skipped_adult,
        failed = summary.failed,
        malformed = summary.malformed,
        "Run finished"
    );

    println!("✓ Considered {} items", summary.considered);
    if args.dry_run {
        println!("  Would publish: {}", summary.would_publish);
    } else {
        println!("  Published:     {}", summary.published);
    }
    println!("  Duplicates:    {}", summary.duplicates);
    println!("  Adult skipped: {}", summary.skipped_adult);
    println!("  Failed:        {}", summary.failed);
    if summary.malformed > 0 {
        println!("  Malformed:     {}", summary.malformed);
    }

    Ok(())
}
