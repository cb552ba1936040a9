// Feed normalizer — upstream payloads of unknown shape → canonical Post.
//
// Pure functions: no I/O, no shared state. The notification rules come in as
// a parameter. Every field goes through an ordered fallback chain (see
// extract.rs), so a malformed event degrades to defaults instead of failing.
//
// The one subtle rule: for a retweet the header shows the *reposter* while
// the body and media come from the *original*, nested as `embedded_post`.

use chrono::Utc;
use rand::Rng;
use serde_json::Value;

use super::extract;
use super::model::{Classification, Media, NotificationKind, Post};
use super::rules::NotificationRules;

pub const FOLLOW_COLOR: &str = "#22c55e";
pub const UNFOLLOW_COLOR: &str = "#ef4444";
pub const DEACTIVATION_COLOR: &str = "#6b7280";
pub const DEACTIVATION_TEXT: &str = "Account has been deactivated";

const FOLLOW_TARGET: &[&str] = &[
    "/target/username",
    "/target/screen_name",
    "/target/handle",
    "/target",
    "/followed/username",
    "/followed/screen_name",
    "/followed",
    "/following/username",
    "/following/screen_name",
    "/following",
    "/target_username",
];

/// Wrapper objects some relays put around nested posts.
const WRAPPERS: &[&str] = &["/tweet", "/status", "/data"];

/// Whether a post being built may carry its own nested posts.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Depth {
    Top,
    Nested,
}

/// Normalize a single new-post payload. Never fails.
pub fn normalize_post(payload: &Value, rules: &NotificationRules) -> Post {
    build_post(payload, rules, Depth::Top)
}

/// Normalize an initial batch. Items are independent; order is preserved.
/// A payload that is not an array yields an empty batch.
pub fn normalize_batch(payload: &Value, rules: &NotificationRules) -> Vec<Post> {
    payload
        .as_array()
        .map(|items| items.iter().map(|item| normalize_post(item, rules)).collect())
        .unwrap_or_default()
}

/// Identifier carried by a delete event, if any.
pub fn delete_target(payload: &Value) -> Option<String> {
    match payload {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Object(_) => extract::first_string(payload, extract::STATUS_ID),
        _ => None,
    }
}

/// "Started following @X" notification.
pub fn follow_notification(payload: &Value) -> Post {
    let target = follow_target(payload);
    notification_post(
        payload,
        NotificationKind::Follow,
        format!("Started following @{target}"),
        FOLLOW_COLOR,
    )
}

/// Unfollow notification. The body text is fixed and matches what the feed
/// has always displayed, spelling included.
pub fn unfollow_notification(payload: &Value) -> Post {
    let target = follow_target(payload);
    notification_post(
        payload,
        NotificationKind::Unfollow,
        format!("Unfolllowed @{target}"),
        UNFOLLOW_COLOR,
    )
}

/// Deactivation notification. The payload is the deactivated handle or an
/// object carrying it; the notification is attributed to that account.
pub fn deactivation_notification(payload: &Value) -> Post {
    notification_post(
        payload,
        NotificationKind::Deactivation,
        DEACTIVATION_TEXT.to_string(),
        DEACTIVATION_COLOR,
    )
}

fn follow_target(payload: &Value) -> String {
    if let Value::String(s) = payload {
        return s.trim().trim_start_matches('@').to_string();
    }
    extract::first_string(payload, FOLLOW_TARGET)
        .map(|h| h.trim_start_matches('@').to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn notification_post(payload: &Value, kind: NotificationKind, body: String, color: &str) -> Post {
    let author_handle = match (payload, kind) {
        (Value::String(s), NotificationKind::Deactivation) => {
            s.trim().trim_start_matches('@').to_string()
        }
        _ => extract::handle(payload).unwrap_or_default(),
    };
    let author_display_name =
        extract::first_string(payload, extract::DISPLAY_NAME).unwrap_or_else(|| author_handle.clone());

    Post {
        id: generate_id(None),
        external_status_id: None,
        author_display_name,
        author_avatar_url: extract::first_string(payload, extract::AVATAR).unwrap_or_default(),
        author_verified: extract::first_bool(payload, extract::VERIFIED),
        author_handle,
        body_text: body,
        media: Vec::new(),
        created_at: Utc::now(),
        classification: Classification::default(),
        embedded_post: None,
        replied_to_post: None,
        reply_to_handle: None,
        highlight_color: Some(color.to_string()),
        notification: Some(kind),
    }
}

fn build_post(payload: &Value, rules: &NotificationRules, depth: Depth) -> Post {
    let author_handle = extract::handle(payload).unwrap_or_default();
    let author_display_name = extract::first_string(payload, extract::DISPLAY_NAME)
        .unwrap_or_else(|| author_handle.clone());
    let external_status_id = extract::first_string(payload, extract::STATUS_ID);

    let retweeted = extract::first_object(payload, extract::RETWEETED);
    let quoted = extract::first_object(payload, extract::QUOTED);
    let post_type = extract::string_at(payload, "/type")
        .map(|t| t.to_ascii_lowercase())
        .unwrap_or_default();

    let classification = Classification {
        is_retweet: retweeted.is_some()
            || extract::first_bool(payload, &["/is_retweet", "/isRetweet"])
            || post_type == "retweet",
        is_quote: quoted.is_some()
            || extract::first_bool(payload, &["/is_quote", "/isQuote", "/is_quote_status"])
            || post_type == "quote",
        is_reply: extract::first_bool(payload, &["/is_reply", "/isReply"]) || post_type == "reply",
    };

    // Retweets carry no content of their own; it belongs to the original.
    let (body_text, media) = if retweeted.is_some() {
        (String::new(), Vec::new())
    } else if depth == Depth::Nested {
        (extract::nested_text(payload), nested_media(payload))
    } else {
        (
            extract::first_string(payload, extract::TEXT).unwrap_or_default(),
            extract::media(payload),
        )
    };

    let mut post = Post {
        id: generate_id(external_status_id.as_deref()),
        external_status_id,
        author_avatar_url: extract::first_string(payload, extract::AVATAR).unwrap_or_default(),
        author_verified: extract::first_bool(payload, extract::VERIFIED),
        highlight_color: rules.color_for(&author_handle),
        author_handle,
        author_display_name,
        body_text,
        media,
        created_at: extract::created_at(payload).unwrap_or_else(Utc::now),
        classification,
        embedded_post: None,
        replied_to_post: None,
        reply_to_handle: None,
        notification: None,
    };

    if depth == Depth::Nested {
        return post;
    }

    post.embedded_post = retweeted
        .or(quoted)
        .map(|original| Box::new(build_post(original, rules, Depth::Nested)));

    if let Some((handle, replied)) = resolve_reply(payload, rules) {
        post.classification.is_reply = true;
        post.reply_to_handle = handle;
        post.replied_to_post = replied;
    }

    post
}

type ReplyParts = (Option<String>, Option<Box<Post>>);

/// Replied-to handle and, only when it has text or media, the replied-to post.
/// Full-content objects win over bare references.
fn resolve_reply(payload: &Value, rules: &NotificationRules) -> Option<ReplyParts> {
    let candidates: Vec<&Value> = extract::REPLY_CONTENT
        .iter()
        .chain(extract::REPLY_REFERENCE)
        .filter_map(|pointer| payload.pointer(pointer))
        .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
        .collect();

    let handle = extract::first_string(payload, extract::REPLY_HANDLE)
        .map(|h| h.trim_start_matches('@').to_string())
        .or_else(|| candidates.iter().find_map(|c| extract::handle(c)))
        .or_else(|| {
            // Some relays send the reference as a bare handle string.
            extract::REPLY_REFERENCE
                .iter()
                .find_map(|pointer| extract::string_at(payload, pointer))
                .map(|h| h.trim_start_matches('@').to_string())
        });

    let replied = candidates
        .iter()
        .map(|c| build_post(c, rules, Depth::Nested))
        .find(Post::has_content)
        .map(Box::new);

    if handle.is_none() && replied.is_none() {
        return None;
    }

    let handle = handle.or_else(|| {
        replied
            .as_ref()
            .map(|p| p.author_handle.clone())
            .filter(|h| !h.is_empty())
    });
    Some((handle, replied))
}

fn nested_media(payload: &Value) -> Vec<Media> {
    let direct = extract::media(payload);
    if !direct.is_empty() {
        return direct;
    }
    WRAPPERS
        .iter()
        .filter_map(|pointer| payload.pointer(pointer))
        .map(extract::media)
        .find(|m| !m.is_empty())
        .unwrap_or_default()
}

/// `{status_id}-{millis}-{random}` when the upstream id is known, else
/// `{millis}-{random}`. Always fresh, even for identical payloads.
pub fn generate_id(status_id: Option<&str>) -> String {
    let millis = Utc::now().timestamp_millis();
    let nonce: u32 = rand::rng().random();
    match status_id {
        Some(id) => format!("{id}-{millis}-{nonce:08x}"),
        None => format!("{millis}-{nonce:08x}"),
    }
}
