use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_FEED_URL: &str = "https://www.reddit.com/r/all.json";
const DEFAULT_TOP_N: usize = 25;
const DEFAULT_FETCH_ATTEMPTS: u32 = 3;
const DEFAULT_FETCH_BACKOFF_MS: u64 = 500;

/// Which fields of an item identify it in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupStrictness {
    /// A URL that was published once is never published again.
    UrlOnly,
    /// The same URL may be published again under a different title or category.
    UrlTitleCategory,
}

impl DedupStrictness {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "url" | "url_only" => Some(Self::UrlOnly),
            "url_title_category" | "strict" => Some(Self::UrlTitleCategory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub top_n: usize,
    pub fetch_attempts: u32,
    pub fetch_backoff: Duration,
    pub publish_adult_content: bool,
    pub default_tags: String,
    pub target_blog: String,
    pub tumblr_token: String,
    pub db_path: PathBuf,
    pub dedup_strictness: DedupStrictness,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, e.g. a map in tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("CROSSPOST_{}", name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let target_blog = get("TARGET_BLOG").context(
            "CROSSPOST_TARGET_BLOG not found.\n\n\
            Set it to the blog identifier to post to, e.g. myblog.tumblr.com",
        )?;

        let tumblr_token = get("TUMBLR_TOKEN").context(
            "CROSSPOST_TUMBLR_TOKEN not found.\n\n\
            To fix this, create ~/.config/crosspost/.env with:\n  \
            CROSSPOST_TUMBLR_TOKEN=your_oauth2_token\n  \
            CROSSPOST_TARGET_BLOG=myblog.tumblr.com",
        )?;

        let top_n = match get("TOP_N") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("CROSSPOST_TOP_N is not a number: {}", raw))?,
            None => DEFAULT_TOP_N,
        };
        if top_n == 0 {
            anyhow::bail!("CROSSPOST_TOP_N must be at least 1");
        }

        let fetch_attempts = match get("FETCH_ATTEMPTS") {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("CROSSPOST_FETCH_ATTEMPTS is not a number: {}", raw))?,
            None => DEFAULT_FETCH_ATTEMPTS,
        };
        if fetch_attempts == 0 {
            anyhow::bail!("CROSSPOST_FETCH_ATTEMPTS must be at least 1");
        }

        let fetch_backoff_ms = match get("FETCH_BACKOFF_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("CROSSPOST_FETCH_BACKOFF_MS is not a number: {}", raw))?,
            None => DEFAULT_FETCH_BACKOFF_MS,
        };

        let publish_adult_content = match get("PUBLISH_ADULT_CONTENT") {
            Some(raw) => parse_bool(&raw).with_context(|| {
                format!("CROSSPOST_PUBLISH_ADULT_CONTENT is not a boolean: {}", raw)
            })?,
            None => false,
        };

        let dedup_strictness = match get("DEDUP_KEY") {
            Some(raw) => DedupStrictness::parse(&raw).with_context(|| {
                format!(
                    "CROSSPOST_DEDUP_KEY must be 'url' or 'url_title_category', got: {}",
                    raw
                )
            })?,
            None => DedupStrictness::UrlOnly,
        };

        let db_path = Self::db_path_from_lookup(&lookup)?;

        Ok(Self {
            feed_url: get("FEED_URL").unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
            top_n,
            fetch_attempts,
            fetch_backoff: Duration::from_millis(fetch_backoff_ms),
            publish_adult_content,
            default_tags: normalize_tag_list(&get("DEFAULT_TAGS").unwrap_or_default()),
            target_blog,
            tumblr_token,
            db_path,
            dedup_strictness,
            log_dir: get("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("log")),
        })
    }

    /// Resolve only the record store location, loading `.env` files the
    /// same way [`Config::from_env`] does. Tools that just read the store use
    /// this so they see the same database the poster writes to.
    pub fn db_path_from_env() -> Result<PathBuf> {
        Self::try_load_dotenv();

        Self::db_path_from_lookup(|key| env::var(key).ok())
    }

    pub fn db_path_from_lookup<F>(lookup: F) -> Result<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("CROSSPOST_DB_PATH")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        {
            Some(raw) => Ok(PathBuf::from(raw)),
            None => default_db_path(),
        }
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/crosspost/.env
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("crosspost").join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }
    }
}

/// Default location of the record store database.
pub fn default_db_path() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .context("Could not determine local data directory")?
        .join("crosspost");

    Ok(data_dir.join("posts.db"))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

// Accepts "a,b", "a, b" or "[a, b]" and produces "a,b".
fn normalize_tag_list(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|tag| tag.trim().trim_matches('"'))
        .collect::<Vec<_>>()
        .join(",")
}
