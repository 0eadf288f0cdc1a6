// Public modules
pub mod config;
pub mod dedup;
pub mod error;
pub mod feed;
pub mod links;
pub mod logging;
pub mod models;
pub mod params;
pub mod pipeline;
pub mod publisher;
pub mod store;

// Re-export commonly used types
pub use config::{Config, DedupStrictness};
pub use dedup::Deduplicator;
pub use error::PublishError;
pub use feed::{candidates_from_listing, try_fetch_json, FeedClient, FeedSource};
pub use links::{classify, to_direct_link};
pub use logging::{init_logging, open_log_file, LoggingGuard};
pub use models::{CandidateItem, PostType, PublishRecord};
pub use params::{build_tags, decode_title, request_for_item, PublishRequest};
pub use pipeline::{Crossposter, ItemOutcome, RunSettings, RunSummary};
pub use publisher::{Publisher, TumblrPublisher};
pub use store::{DedupKey, RecordStore, SqliteRecordStore};
