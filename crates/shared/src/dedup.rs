use anyhow::Result;

use crate::config::DedupStrictness;
use crate::models::CandidateItem;
use crate::store::{DedupKey, RecordStore};

/// Decides whether an item has been published in an earlier run.
pub struct Deduplicator<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    strictness: DedupStrictness,
}

impl<'a, S: RecordStore + ?Sized> Deduplicator<'a, S> {
    pub fn new(store: &'a S, strictness: DedupStrictness) -> Self {
        Self { store, strictness }
    }

    pub fn key_for(&self, item: &CandidateItem) -> DedupKey {
        match self.strictness {
            DedupStrictness::UrlOnly => DedupKey::Url(item.url.clone()),
            DedupStrictness::UrlTitleCategory => DedupKey::UrlTitleCategory {
                url: item.url.clone(),
                title: item.title.clone(),
                category: item.subreddit.clone(),
            },
        }
    }

    /// True iff no record matches the item's key. Read-only.
    pub fn is_new(&self, item: &CandidateItem) -> Result<bool> {
        Ok(!self.store.contains(&self.key_for(item))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PublishRecord;
    use crate::store::SqliteRecordStore;

    fn item(url: &str, title: &str, subreddit: &str) -> CandidateItem {
        CandidateItem {
            url: url.to_string(),
            title: title.to_string(),
            subreddit: subreddit.to_string(),
            permalink: "/r/x/1".to_string(),
            is_adult_content: false,
        }
    }

    #[test]
    fn test_new_until_recorded() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        let dedup = Deduplicator::new(&store, DedupStrictness::UrlOnly);
        let post = item("http://a", "t", "pics");

        assert!(dedup.is_new(&post).unwrap());
        store.insert(&PublishRecord::for_item(&post)).unwrap();
        assert!(!dedup.is_new(&post).unwrap());
    }

    #[test]
    fn test_url_only_ignores_title_and_category() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        store
            .insert(&PublishRecord::for_item(&item("http://a", "t", "pics")))
            .unwrap();

        let dedup = Deduplicator::new(&store, DedupStrictness::UrlOnly);
        assert!(!dedup.is_new(&item("http://a", "other", "funny")).unwrap());
    }

    #[test]
    fn test_strict_key_allows_repost_elsewhere() {
        let store = SqliteRecordStore::open_in_memory().unwrap();
        store
            .insert(&PublishRecord::for_item(&item("http://a", "t", "pics")))
            .unwrap();

        let dedup = Deduplicator::new(&store, DedupStrictness::UrlTitleCategory);
        assert!(!dedup.is_new(&item("http://a", "t", "pics")).unwrap());
        assert!(dedup.is_new(&item("http://a", "t", "funny")).unwrap());
        assert!(dedup.is_new(&item("http://a", "other", "pics")).unwrap());
    }
}
