// Field extraction — ordered fallback chains over untyped JSON payloads.
//
// Upstream feed payloads come in several shapes depending on which relay
// produced them. Every canonical field has a fixed list of JSON pointers,
// tried in order until one yields a non-empty value. Nothing in here panics
// or errors on a missing or mistyped field; it just moves on to the next probe.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::model::{Media, MediaKind};

/// Author handle, most specific shape first.
pub const HANDLE: &[&str] = &[
    "/author/username",
    "/author/screen_name",
    "/author/handle",
    "/user/screen_name",
    "/user/username",
    "/user/handle",
    "/username",
    "/screen_name",
    "/handle",
];

pub const DISPLAY_NAME: &[&str] = &[
    "/author/name",
    "/author/display_name",
    "/author/displayName",
    "/user/name",
    "/user/display_name",
    "/name",
    "/display_name",
];

pub const AVATAR: &[&str] = &[
    "/author/profile_image_url_https",
    "/author/profile_image_url",
    "/author/avatar",
    "/author/avatar_url",
    "/user/profile_image_url_https",
    "/user/profile_image_url",
    "/user/avatar",
    "/avatar",
    "/profile_image",
];

pub const VERIFIED: &[&str] = &[
    "/author/verified",
    "/author/is_blue_verified",
    "/user/verified",
    "/user/is_blue_verified",
    "/verified",
    "/is_blue_verified",
];

pub const TEXT: &[&str] = &["/full_text", "/text", "/content", "/body"];

/// Text inside the wrapper objects some relays put around nested posts.
const WRAPPED_TEXT: &[&str] = &[
    "/tweet/full_text",
    "/tweet/text",
    "/status/full_text",
    "/status/text",
    "/data/full_text",
    "/data/text",
];

pub const STATUS_ID: &[&str] = &["/id_str", "/tweet_id", "/status_id", "/id"];

pub const CREATED_AT: &[&str] = &["/created_at", "/createdAt", "/timestamp"];

pub const RETWEETED: &[&str] = &["/retweeted_status", "/retweetedTweet", "/retweet"];

pub const QUOTED: &[&str] = &["/quoted_status", "/quotedTweet", "/quote"];

/// Replied-to objects carrying full content. Probed before bare references.
pub const REPLY_CONTENT: &[&str] = &[
    "/in_reply_to_status",
    "/replied_to_tweet",
    "/reply_to_tweet",
    "/repliedTweet",
];

/// Replied-to objects that are usually just `{id, handle}`.
pub const REPLY_REFERENCE: &[&str] = &["/reply_to", "/in_reply_to"];

pub const REPLY_HANDLE: &[&str] = &["/in_reply_to_screen_name", "/in_reply_to_username"];

/// Media locations, every one of them is collected.
const MEDIA_SOURCES: &[(&str, Option<MediaKind>)] = &[
    ("/media/images", Some(MediaKind::Image)),
    ("/media/videos", Some(MediaKind::Video)),
    ("/media/gifs", Some(MediaKind::Gif)),
    ("/media", None),
    ("/images", Some(MediaKind::Image)),
    ("/videos", Some(MediaKind::Video)),
    ("/entities/media", None),
    ("/extended_entities/media", None),
];

/// URL fields on a media object. `url` is last because timeline entities
/// use it for the shortened link, not the asset.
const MEDIA_URL: &[&str] = &["/media_url_https", "/media_url", "/url", "/src"];

/// Read a non-empty string (or a number, stringified) at `pointer`.
pub fn string_at(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First non-empty string along the chain.
pub fn first_string(value: &Value, chain: &[&str]) -> Option<String> {
    chain.iter().find_map(|pointer| string_at(value, pointer))
}

/// Read a boolean-ish value at `pointer`. Accepts `true`, `"true"` and `1`.
pub fn bool_at(value: &Value, pointer: &str) -> Option<bool> {
    match value.pointer(pointer)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

/// First boolean-ish value along the chain, `false` if none.
pub fn first_bool(value: &Value, chain: &[&str]) -> bool {
    chain
        .iter()
        .find_map(|pointer| bool_at(value, pointer))
        .unwrap_or(false)
}

/// First non-empty JSON object along the chain.
pub fn first_object<'a>(value: &'a Value, chain: &[&str]) -> Option<&'a Value> {
    chain.iter().find_map(|pointer| {
        value
            .pointer(pointer)
            .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
    })
}

/// Handle with any leading `@` removed.
pub fn handle(value: &Value) -> Option<String> {
    first_string(value, HANDLE).map(|h| h.trim_start_matches('@').to_string())
}

/// Text of a nested post: direct fields first, then wrapper objects.
pub fn nested_text(value: &Value) -> String {
    first_string(value, TEXT)
        .or_else(|| first_string(value, WRAPPED_TEXT))
        .unwrap_or_default()
}

/// Parse the upstream creation timestamp, if any shape we know matches.
pub fn created_at(value: &Value) -> Option<DateTime<Utc>> {
    CREATED_AT
        .iter()
        .find_map(|pointer| value.pointer(pointer).and_then(parse_timestamp))
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(from_epoch),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            // Classic timeline format: "Wed Oct 10 20:19:24 +0000 2018"
            if let Ok(dt) = DateTime::parse_from_str(s, "%a %b %d %H:%M:%S %z %Y") {
                return Some(dt.with_timezone(&Utc));
            }
            s.parse::<i64>().ok().and_then(from_epoch)
        }
        _ => None,
    }
}

/// Values past ~2001-09 in milliseconds are treated as millis, smaller as seconds.
fn from_epoch(n: i64) -> Option<DateTime<Utc>> {
    if n.unsigned_abs() >= 1_000_000_000_000 {
        DateTime::from_timestamp_millis(n)
    } else {
        DateTime::from_timestamp(n, 0)
    }
}

/// Collect every media attachment from every known location, in probe order.
/// Exact duplicates (same kind and URL) are dropped; timeline payloads repeat
/// `entities.media` inside `extended_entities.media`.
pub fn media(value: &Value) -> Vec<Media> {
    let mut found: Vec<Media> = Vec::new();

    for (pointer, hint) in MEDIA_SOURCES {
        let Some(items) = value.pointer(pointer).and_then(Value::as_array) else {
            continue;
        };
        for item in items {
            if let Some(m) = media_item(item, *hint) {
                if !found.contains(&m) {
                    found.push(m);
                }
            }
        }
    }

    found
}

fn media_item(item: &Value, hint: Option<MediaKind>) -> Option<Media> {
    match item {
        Value::String(s) => {
            let url = s.trim();
            if url.is_empty() {
                return None;
            }
            Some(Media {
                kind: hint.unwrap_or_else(|| kind_from_url(url)),
                url: url.to_string(),
            })
        }
        Value::Object(_) => {
            let declared = item
                .get("type")
                .and_then(Value::as_str)
                .and_then(kind_from_type);
            let kind = declared.or(hint);

            let url = match kind {
                Some(MediaKind::Video) | Some(MediaKind::Gif) => {
                    mp4_variant(item).or_else(|| first_string(item, MEDIA_URL))
                }
                _ => first_string(item, MEDIA_URL),
            }?;

            Some(Media {
                kind: kind.unwrap_or_else(|| kind_from_url(&url)),
                url,
            })
        }
        _ => None,
    }
}

fn kind_from_type(t: &str) -> Option<MediaKind> {
    match t.to_ascii_lowercase().as_str() {
        "photo" | "image" => Some(MediaKind::Image),
        "video" => Some(MediaKind::Video),
        "animated_gif" | "gif" => Some(MediaKind::Gif),
        _ => None,
    }
}

fn kind_from_url(url: &str) -> MediaKind {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    if path.ends_with(".mp4") || path.ends_with(".m3u8") || path.ends_with(".webm") {
        MediaKind::Video
    } else if path.ends_with(".gif") {
        MediaKind::Gif
    } else {
        MediaKind::Image
    }
}

fn mp4_variant(item: &Value) -> Option<String> {
    item.pointer("/video_info/variants")?
        .as_array()?
        .iter()
        .find(|v| v.get("content_type").and_then(Value::as_str) == Some("video/mp4"))
        .and_then(|v| string_at(v, "/url"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_string_skips_empty_and_mistyped() {
        let v = json!({"author": {"username": "", "screen_name": 7}, "handle": "x"});
        // Numbers are accepted (stringified); ids often arrive as numbers.
        assert_eq!(first_string(&v, HANDLE).as_deref(), Some("7"));

        let v = json!({"author": {"username": "  "}, "user": {"screen_name": ["bad"]}, "handle": "x"});
        assert_eq!(first_string(&v, HANDLE).as_deref(), Some("x"));
    }

    #[test]
    fn test_bool_at_accepts_strings() {
        let v = json!({"verified": "true"});
        assert!(first_bool(&v, VERIFIED));
        let v = json!({"verified": "nope"});
        assert!(!first_bool(&v, VERIFIED));
    }

    #[test]
    fn test_nested_text_probes_wrappers() {
        let v = json!({"data": {"text": "wrapped"}});
        assert_eq!(nested_text(&v), "wrapped");
        let v = json!({"text": "direct", "tweet": {"text": "wrapped"}});
        assert_eq!(nested_text(&v), "direct");
        assert_eq!(nested_text(&json!({"id": "1"})), "");
    }

    #[test]
    fn test_created_at_formats() {
        let v = json!({"created_at": "Wed Oct 10 20:19:24 +0000 2018"});
        assert_eq!(created_at(&v).unwrap().to_rfc3339(), "2018-10-10T20:19:24+00:00");

        let v = json!({"createdAt": "2024-01-02T03:04:05Z"});
        assert_eq!(created_at(&v).unwrap().to_rfc3339(), "2024-01-02T03:04:05+00:00");

        let v = json!({"timestamp": 1_700_000_000_000i64});
        assert_eq!(created_at(&v).unwrap().timestamp(), 1_700_000_000);

        let v = json!({"timestamp": 1_700_000_000});
        assert_eq!(created_at(&v).unwrap().timestamp(), 1_700_000_000);

        assert!(created_at(&json!({"created_at": "yesterday"})).is_none());
    }

    #[test]
    fn test_created_at_out_of_range_epoch_is_none() {
        assert!(created_at(&json!({"timestamp": i64::MIN})).is_none());
        assert!(created_at(&json!({"created_at": "-9223372036854775808"})).is_none());
        assert!(created_at(&json!({"timestamp": i64::MAX})).is_none());
        let v = json!({"timestamp": -1_700_000_000_000i64});
        assert_eq!(created_at(&v).unwrap().timestamp(), -1_700_000_000);
    }

    #[test]
    fn test_media_collects_all_sources_in_order() {
        let v = json!({
            "media": {"images": ["https://a/1.jpg"], "videos": [{"url": "https://a/2.mp4"}]},
            "images": ["https://a/3.png"],
            "entities": {"media": [{"type": "photo", "media_url_https": "https://a/4.jpg", "url": "https://t.co/x"}]},
            "extended_entities": {"media": [
                {"type": "photo", "media_url_https": "https://a/4.jpg"},
                {"type": "animated_gif", "media_url_https": "https://a/thumb.jpg",
                 "video_info": {"variants": [{"content_type": "video/mp4", "url": "https://a/5.mp4"}]}}
            ]}
        });
        let m = media(&v);
        let urls: Vec<&str> = m.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://a/1.jpg", "https://a/2.mp4", "https://a/3.png", "https://a/4.jpg", "https://a/5.mp4"]
        );
        assert_eq!(m[1].kind, MediaKind::Video);
        assert_eq!(m[4].kind, MediaKind::Gif);
    }

    #[test]
    fn test_media_tolerates_garbage() {
        let v = json!({"media": "oops", "images": [null, 3, {"nothing": true}], "entities": {"media": {}}});
        assert!(media(&v).is_empty());
    }

    #[test]
    fn test_flat_media_array_infers_kind() {
        let v = json!({"media": ["https://a/clip.mp4?tag=1", "https://a/x.gif", "https://a/y"]});
        let kinds: Vec<MediaKind> = media(&v).iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MediaKind::Video, MediaKind::Gif, MediaKind::Image]);
    }
}
