use crate::models::{CandidateItem, PostType};

const ADULT_TAG: &str = "nsfw";

/// A ready-to-submit post. Each variant carries exactly the fields its
/// post type needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishRequest {
    Photo {
        tags: String,
        caption: String,
        source: String,
        link: String,
    },
    Video {
        tags: String,
        caption: String,
        embed: String,
    },
    Link {
        tags: String,
        title: String,
        url: String,
    },
}

impl PublishRequest {
    pub fn build(post_type: PostType, tags: &str, url: &str, title: &str, permalink: &str) -> Self {
        let tags = tags.to_string();
        match post_type {
            PostType::Photo => PublishRequest::Photo {
                tags,
                caption: title.to_string(),
                source: url.to_string(),
                link: permalink.to_string(),
            },
            PostType::Video => PublishRequest::Video {
                tags,
                caption: title.to_string(),
                embed: url.to_string(),
            },
            PostType::Link => PublishRequest::Link {
                tags,
                title: title.to_string(),
                url: url.to_string(),
            },
        }
    }

    pub fn post_type(&self) -> PostType {
        match self {
            PublishRequest::Photo { .. } => PostType::Photo,
            PublishRequest::Video { .. } => PostType::Video,
            PublishRequest::Link { .. } => PostType::Link,
        }
    }

    pub fn tags(&self) -> &str {
        match self {
            PublishRequest::Photo { tags, .. }
            | PublishRequest::Video { tags, .. }
            | PublishRequest::Link { tags, .. } => tags,
        }
    }

    /// The URL the post points at after normalization.
    pub fn content_url(&self) -> &str {
        match self {
            PublishRequest::Photo { source, .. } => source,
            PublishRequest::Video { embed, .. } => embed,
            PublishRequest::Link { url, .. } => url,
        }
    }

    /// The flat key/value form sent over the wire.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("state", "published".to_string()),
            ("tags", self.tags().to_string()),
            ("type", self.post_type().as_str().to_string()),
        ];

        match self {
            PublishRequest::Photo {
                caption,
                source,
                link,
                ..
            } => {
                params.push(("caption", caption.clone()));
                params.push(("source", source.clone()));
                params.push(("link", link.clone()));
            }
            PublishRequest::Video { caption, embed, .. } => {
                params.push(("caption", caption.clone()));
                params.push(("embed", embed.clone()));
            }
            PublishRequest::Link { title, url, .. } => {
                params.push(("title", title.clone()));
                params.push(("url", url.clone()));
            }
        }

        params
    }
}

/// `default_tags,category,nsfw` with the last segment empty for
/// non-adult items. Empty and repeated segments are kept as they are.
pub fn build_tags(default_tags: &str, category: &str, is_adult_content: bool) -> String {
    let adult = if is_adult_content { ADULT_TAG } else { "" };
    [default_tags, category, adult].join(",")
}

/// Decode HTML entities in aggregator titles (`&amp;` -> `&`).
pub fn decode_title(raw: &str) -> String {
    html_escape::decode_html_entities(raw).into_owned()
}

/// Everything between a candidate item and its publish request: title
/// decoding, link normalization, classification and tag assembly.
pub fn request_for_item(item: &CandidateItem, default_tags: &str) -> PublishRequest {
    let title = decode_title(&item.title);
    let url = crate::links::to_direct_link(&item.url);
    let post_type = crate::links::classify(&url);
    let tags = build_tags(default_tags, &item.subreddit, item.is_adult_content);

    PublishRequest::build(post_type, &tags, &url, &title, &item.context_link())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_map(request: &PublishRequest) -> Vec<(String, String)> {
        request
            .params()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
        expected
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ==================== Parameter Tests ====================

    #[test]
    fn test_photo_params() {
        let request =
            PublishRequest::build(PostType::Photo, "a,b", "http://x/y.png", "T", "reddit.com/p1");
        assert_eq!(
            as_map(&request),
            pairs(&[
                ("state", "published"),
                ("tags", "a,b"),
                ("type", "photo"),
                ("caption", "T"),
                ("source", "http://x/y.png"),
                ("link", "reddit.com/p1"),
            ])
        );
    }

    #[test]
    fn test_video_params() {
        let request = PublishRequest::build(
            PostType::Video,
            "a",
            "https://youtu.be/abc",
            "Clip",
            "reddit.com/p2",
        );
        assert_eq!(
            as_map(&request),
            pairs(&[
                ("state", "published"),
                ("tags", "a"),
                ("type", "video"),
                ("caption", "Clip"),
                ("embed", "https://youtu.be/abc"),
            ])
        );
    }

    #[test]
    fn test_link_params() {
        let request = PublishRequest::build(
            PostType::Link,
            "",
            "http://example.com/story",
            "Story",
            "reddit.com/p3",
        );
        assert_eq!(
            as_map(&request),
            pairs(&[
                ("state", "published"),
                ("tags", ""),
                ("type", "link"),
                ("title", "Story"),
                ("url", "http://example.com/story"),
            ])
        );
    }

    // ==================== Tag Tests ====================

    #[test]
    fn test_tags_with_adult_flag() {
        assert_eq!(build_tags("reddit,bot", "pics", true), "reddit,bot,pics,nsfw");
    }

    #[test]
    fn test_tags_keep_empty_segments() {
        assert_eq!(build_tags("reddit", "pics", false), "reddit,pics,");
        assert_eq!(build_tags("", "pics", false), ",pics,");
    }

    #[test]
    fn test_tags_allow_duplicates() {
        assert_eq!(build_tags("pics", "pics", false), "pics,pics,");
    }

    // ==================== Title Tests ====================

    #[test]
    fn test_decode_title_entities() {
        assert_eq!(decode_title("Cats &amp; dogs"), "Cats & dogs");
        assert_eq!(decode_title("&lt;3 &quot;hi&quot; &#39;x&#39;"), "<3 \"hi\" 'x'");
        assert_eq!(decode_title("plain"), "plain");
    }

    // ==================== Item Tests ====================

    #[test]
    fn test_request_for_imgur_item() {
        let item = CandidateItem {
            url: "http://imgur.com/abc123".to_string(),
            title: "Tom &amp; Jerry".to_string(),
            subreddit: "gifs".to_string(),
            permalink: "/r/gifs/comments/9/tom/".to_string(),
            is_adult_content: false,
        };
        let request = request_for_item(&item, "reddit");
        assert_eq!(
            request,
            PublishRequest::Photo {
                tags: "reddit,gifs,".to_string(),
                caption: "Tom & Jerry".to_string(),
                source: "http://i.imgur.com/abc123.gif".to_string(),
                link: "reddit.com/r/gifs/comments/9/tom/".to_string(),
            }
        );
    }

    #[test]
    fn test_request_for_adult_link_item() {
        let item = CandidateItem {
            url: "http://example.com/article".to_string(),
            title: "Headline".to_string(),
            subreddit: "news".to_string(),
            permalink: "/r/news/1".to_string(),
            is_adult_content: true,
        };
        let request = request_for_item(&item, "reddit");
        assert_eq!(request.post_type(), PostType::Link);
        assert_eq!(request.tags(), "reddit,news,nsfw");
    }
}
