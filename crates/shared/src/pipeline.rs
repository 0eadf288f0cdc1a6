use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::{Config, DedupStrictness};
use crate::dedup::Deduplicator;
use crate::feed::{candidates_from_listing, try_fetch_json, FeedSource};
use crate::models::{CandidateItem, PublishRecord};
use crate::params::{request_for_item, PublishRequest};
use crate::publisher::Publisher;
use crate::store::RecordStore;

/// The knobs one sweep needs, split out of [`Config`] so tests can build
/// them directly.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub feed_url: String,
    pub top_n: usize,
    pub fetch_attempts: u32,
    pub fetch_backoff: Duration,
    pub publish_adult_content: bool,
    pub default_tags: String,
    pub target_blog: String,
    pub dedup_strictness: DedupStrictness,
    pub dry_run: bool,
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            feed_url: config.feed_url.clone(),
            top_n: config.top_n,
            fetch_attempts: config.fetch_attempts,
            fetch_backoff: config.fetch_backoff,
            publish_adult_content: config.publish_adult_content,
            default_tags: config.default_tags.clone(),
            target_blog: config.target_blog.clone(),
            dedup_strictness: config.dedup_strictness,
            dry_run: false,
        }
    }
}

/// Where a single item ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Published,
    /// Dry run: the request was built but not sent.
    WouldPublish,
    Duplicate,
    SkippedAdult,
    PublishFailed,
    /// The record store could not answer the duplicate check.
    StoreUnavailable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub fetched: bool,
    pub considered: usize,
    pub malformed: usize,
    pub published: usize,
    pub would_publish: usize,
    pub duplicates: usize,
    pub skipped_adult: usize,
    pub failed: usize,
}

impl RunSummary {
    fn tally(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Published => self.published += 1,
            ItemOutcome::WouldPublish => self.would_publish += 1,
            ItemOutcome::Duplicate => self.duplicates += 1,
            ItemOutcome::SkippedAdult => self.skipped_adult += 1,
            ItemOutcome::PublishFailed | ItemOutcome::StoreUnavailable => self.failed += 1,
        }
    }
}

/// One sweep over the top of the feed: fetch, then for each item in order
/// dedup, transform, publish and record.
pub struct Crossposter<'a, F, S, P>
where
    F: FeedSource + ?Sized,
    S: RecordStore + ?Sized,
    P: Publisher + ?Sized,
{
    feed: &'a F,
    store: &'a S,
    publisher: &'a P,
    settings: RunSettings,
}

impl<'a, F, S, P> Crossposter<'a, F, S, P>
where
    F: FeedSource + ?Sized,
    S: RecordStore + ?Sized,
    P: Publisher + ?Sized,
{
    pub fn new(feed: &'a F, store: &'a S, publisher: &'a P, settings: RunSettings) -> Self {
        Self {
            feed,
            store,
            publisher,
            settings,
        }
    }

    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        let Some(document) = try_fetch_json(
            self.feed,
            &self.settings.feed_url,
            self.settings.fetch_attempts,
            self.settings.fetch_backoff,
        )
        .await
        else {
            return summary;
        };
        summary.fetched = true;

        let (candidates, malformed) = candidates_from_listing(document, self.settings.top_n);
        summary.malformed = malformed;
        summary.considered = candidates.len();
        info!(
            candidates = candidates.len(),
            malformed, "Processing top of feed"
        );

        for item in &candidates {
            let outcome = self.process_item(item).await;
            debug!(url = %item.url, ?outcome, "Item done");
            summary.tally(&outcome);
        }

        summary
    }

    pub async fn process_item(&self, item: &CandidateItem) -> ItemOutcome {
        if item.is_adult_content && !self.settings.publish_adult_content {
            return ItemOutcome::SkippedAdult;
        }

        let dedup = Deduplicator::new(self.store, self.settings.dedup_strictness);
        match dedup.is_new(item) {
            Ok(true) => {}
            Ok(false) => return ItemOutcome::Duplicate,
            Err(e) => {
                error!(
                    url = %item.url,
                    error = %format!("{:#}", e),
                    "Duplicate check failed, skipping item"
                );
                return ItemOutcome::StoreUnavailable;
            }
        }

        let request = request_for_item(item, &self.settings.default_tags);
        info!(url = %item.url, params = ?request.params(), "Built publish parameters");

        if self.settings.dry_run {
            info!(url = %item.url, post_type = %request.post_type(), "Dry run, not publishing");
            return ItemOutcome::WouldPublish;
        }

        if !self.publish(item, &request).await {
            return ItemOutcome::PublishFailed;
        }

        if let Err(e) = self.store.insert(&PublishRecord::for_item(item)) {
            // Published but unrecorded: the next run may post it again.
            error!(
                url = %item.url,
                error = %format!("{:#}", e),
                "Published but failed to record post"
            );
        }
        ItemOutcome::Published
    }

    async fn publish(&self, item: &CandidateItem, request: &PublishRequest) -> bool {
        match self
            .publisher
            .publish(request, &self.settings.target_blog)
            .await
        {
            Ok(()) => {
                info!(
                    url = %item.url,
                    post_type = %request.post_type(),
                    category = %item.subreddit,
                    "Published"
                );
                true
            }
            Err(e) => {
                error!(
                    error = %e,
                    url = %request.content_url(),
                    title = %item.title,
                    category = %item.subreddit,
                    "Publish failed"
                );
                false
            }
        }
    }
}
