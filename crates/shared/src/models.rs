use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of the aggregator listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub url: String,
    pub title: String,
    pub subreddit: String,
    pub permalink: String,
    #[serde(rename = "over_18")]
    pub is_adult_content: bool,
}

impl CandidateItem {
    /// Link back to the item's discussion page, as shown on photo posts.
    pub fn context_link(&self) -> String {
        format!("reddit.com{}", self.permalink)
    }
}

/// A row of the record store: an item that was published successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRecord {
    pub url: String,
    pub title: String,
    pub category: String,
    pub published_at: String,
}

impl PublishRecord {
    pub fn for_item(item: &CandidateItem) -> Self {
        Self {
            url: item.url.clone(),
            title: item.title.clone(),
            category: item.subreddit.clone(),
            published_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostType {
    Photo,
    Video,
    Link,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Photo => "photo",
            PostType::Video => "video",
            PostType::Link => "link",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_from_listing_json() {
        let json = r#"{
            "url": "http://imgur.com/abc123",
            "title": "Cats &amp; dogs",
            "subreddit": "pics",
            "permalink": "/r/pics/comments/1/cats/",
            "over_18": true,
            "score": 1234
        }"#;
        let item: CandidateItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.url, "http://imgur.com/abc123");
        assert_eq!(item.title, "Cats &amp; dogs");
        assert!(item.is_adult_content);
        assert_eq!(item.context_link(), "reddit.com/r/pics/comments/1/cats/");
    }

    #[test]
    fn test_candidate_missing_field_rejected() {
        let json = r#"{"url": "http://x", "title": "t", "subreddit": "s"}"#;
        assert!(serde_json::from_str::<CandidateItem>(json).is_err());
    }

    #[test]
    fn test_record_keeps_raw_fields() {
        let item = CandidateItem {
            url: "http://x/y.png".to_string(),
            title: "A &amp; B".to_string(),
            subreddit: "pics".to_string(),
            permalink: "/r/pics/1".to_string(),
            is_adult_content: false,
        };
        let record = PublishRecord::for_item(&item);
        assert_eq!(record.url, item.url);
        assert_eq!(record.title, "A &amp; B");
        assert_eq!(record.category, "pics");
    }
}
