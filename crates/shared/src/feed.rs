use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::CandidateItem;

/// Anything that can hand back a JSON document for a URL.
#[async_trait]
pub trait FeedSource {
    async fn fetch_json(&self, url: &str) -> Result<Value>;
}

pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("crosspost/0.1 (periodic cross-posting bot)")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send HTTP request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            let excerpt: String = error_text.chars().take(200).collect();
            anyhow::bail!("HTTP error: {} - {}", status, excerpt);
        }

        response
            .json::<Value>()
            .await
            .context("Failed to parse JSON response")
    }
}

/// Fetch `url` up to `max_attempts` times, logging every failed attempt.
///
/// Returns `None` once all attempts are used up; callers treat that as
/// "nothing to do this run". The delay before retry `n` is `backoff * 2^(n-1)`.
pub async fn try_fetch_json<S>(
    source: &S,
    url: &str,
    max_attempts: u32,
    backoff: Duration,
) -> Option<Value>
where
    S: FeedSource + ?Sized,
{
    for attempt in 1..=max_attempts {
        match source.fetch_json(url).await {
            Ok(value) => return Some(value),
            Err(e) => {
                warn!(
                    url,
                    attempt,
                    max_attempts,
                    error = %format!("{:#}", e),
                    "Could not get JSON (attempt {} of {})",
                    attempt,
                    max_attempts
                );
                if attempt < max_attempts && !backoff.is_zero() {
                    let delay = backoff.saturating_mul(2_u32.saturating_pow(attempt - 1));
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    warn!(url, "Could not get JSON, giving up for this run");
    None
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Deserialize)]
struct Child {
    #[serde(default)]
    data: Value,
}

/// Candidates from the first `top_n` children of a listing document.
///
/// Children that do not decode are logged and skipped; the returned
/// `usize` is how many were dropped that way.
pub fn candidates_from_listing(document: Value, top_n: usize) -> (Vec<CandidateItem>, usize) {
    let listing: Listing = match serde_json::from_value(document) {
        Ok(listing) => listing,
        Err(e) => {
            warn!(error = %e, "Listing has no data.children, nothing to process");
            return (Vec::new(), 0);
        }
    };

    let mut candidates = Vec::new();
    let mut malformed = 0;

    for (index, child) in listing.data.children.into_iter().take(top_n).enumerate() {
        match serde_json::from_value::<CandidateItem>(child.data) {
            Ok(item) => candidates.push(item),
            Err(e) => {
                malformed += 1;
                warn!(index, error = %e, "Skipping malformed listing entry");
            }
        }
    }

    debug!(count = candidates.len(), malformed, "Decoded listing");
    (candidates, malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn child(url: &str) -> Value {
        json!({
            "kind": "t3",
            "data": {
                "url": url,
                "title": "title",
                "subreddit": "pics",
                "permalink": "/r/pics/1",
                "over_18": false
            }
        })
    }

    #[test]
    fn test_listing_respects_top_n() {
        let doc = json!({
            "data": { "children": [child("http://a"), child("http://b"), child("http://c")] }
        });
        let (items, malformed) = candidates_from_listing(doc, 2);
        assert_eq!(malformed, 0);
        let urls: Vec<_> = items.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, vec!["http://a", "http://b"]);
    }

    #[test]
    fn test_listing_skips_malformed_entries() {
        let doc = json!({
            "data": {
                "children": [
                    child("http://a"),
                    { "data": { "title": "no url" } },
                    child("http://c")
                ]
            }
        });
        let (items, malformed) = candidates_from_listing(doc, 10);
        assert_eq!(malformed, 1);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].url, "http://c");
    }

    #[test]
    fn test_listing_malformed_entry_counts_against_top_n() {
        let doc = json!({
            "data": { "children": [{ "kind": "more" }, child("http://b"), child("http://c")] }
        });
        let (items, malformed) = candidates_from_listing(doc, 2);
        assert_eq!(malformed, 1);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].url, "http://b");
    }

    #[test]
    fn test_listing_wrong_shape() {
        let (items, malformed) = candidates_from_listing(json!({ "error": 429 }), 10);
        assert!(items.is_empty());
        assert_eq!(malformed, 0);
    }
}
