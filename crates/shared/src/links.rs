//! URL rewriting and post-type detection.

use url::Url;

use crate::models::PostType;

const PHOTO_EXTENSIONS: [&str; 4] = ["gif", "jpeg", "jpg", "png"];
const SHORT_VIDEO_HOST: &str = "youtu.be";
const IMGUR_HOST: &str = "imgur.com";

/// Turn imgur viewer pages into direct image links.
///
/// `.gifv` links are passed through untouched: the publishing side cannot
/// ingest the rewritten `.gif` form reliably. Gallery and album pages are
/// left alone, as is anything whose authority is not exactly `imgur.com`
/// (userinfo, a port, other casing, or an `i.imgur.com` link that was
/// already rewritten). The path is carried over as written, without
/// re-encoding.
pub fn to_direct_link(url: &str) -> String {
    if Url::parse(url).is_err() {
        return url.to_string();
    }
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };

    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    let path_end = tail.find(['?', '#']).unwrap_or(tail.len());
    let path = &tail[..path_end];

    if path.contains(".gifv") {
        return url.to_string();
    }

    if authority == IMGUR_HOST && !path.contains("gallery") && !path.contains("a/") {
        return format!("{}://i.imgur.com{}.gif", scheme, path);
    }

    url.to_string()
}

/// Pick the post type for an (already normalized) URL.
///
/// The extension check is case-sensitive on the text after the last `.`
/// anywhere in the URL, so `pic.PNG` is classified as a link.
pub fn classify(url: &str) -> PostType {
    let extension = match url.rfind('.') {
        Some(idx) => &url[idx + 1..],
        None => url,
    };
    if PHOTO_EXTENSIONS.contains(&extension) {
        return PostType::Photo;
    }

    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string));
    match host {
        Some(host) if host.contains("youtube") || host == SHORT_VIDEO_HOST => PostType::Video,
        _ => PostType::Link,
    }
}
