// Feed events — named transport messages and their normalized form.
//
// The transport delivers `{"event": name, "data": payload}` envelopes. This
// module maps the event name to a kind and runs the payload through the
// normalizer. Parsing never fails on the payload itself, only on frames
// that aren't JSON envelopes at all.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use super::model::Post;
use super::normalize;
use super::rules::NotificationRules;

/// A normalized feed event, ready to be applied to a post collection.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// `tweet`
    Post(Post),
    /// `initialTweets`, in the order delivered.
    InitialBatch(Vec<Post>),
    /// `tweet_delete`, carrying the upstream identifier.
    Delete(String),
    /// `follow` / `unfollow`
    Follow(Post),
    Unfollow(Post),
    /// `deactivation`: the notification post and the handle to purge.
    Deactivation { notice: Post, handle: String },
    /// Anything else; kept so callers can log it.
    Unknown(String),
}

impl FeedEvent {
    /// Transport name of this event kind.
    pub fn name(&self) -> &str {
        match self {
            FeedEvent::Post(_) => "tweet",
            FeedEvent::InitialBatch(_) => "initialTweets",
            FeedEvent::Delete(_) => "tweet_delete",
            FeedEvent::Follow(_) => "follow",
            FeedEvent::Unfollow(_) => "unfollow",
            FeedEvent::Deactivation { .. } => "deactivation",
            FeedEvent::Unknown(name) => name.as_str(),
        }
    }
}

/// Wire envelope. `type`/`payload` are accepted as aliases.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(alias = "type")]
    pub event: String,
    #[serde(default, alias = "payload")]
    pub data: Value,
}

/// Normalize one named event. Never fails; unusable payloads degrade.
pub fn from_named(name: &str, payload: &Value, rules: &NotificationRules) -> FeedEvent {
    match name {
        "tweet" => FeedEvent::Post(normalize::normalize_post(payload, rules)),
        "initialTweets" => FeedEvent::InitialBatch(normalize::normalize_batch(payload, rules)),
        "tweet_delete" => match normalize::delete_target(payload) {
            Some(id) => FeedEvent::Delete(id),
            None => FeedEvent::Unknown(name.to_string()),
        },
        "follow" => FeedEvent::Follow(normalize::follow_notification(payload)),
        "unfollow" => FeedEvent::Unfollow(normalize::unfollow_notification(payload)),
        "deactivation" => {
            let notice = normalize::deactivation_notification(payload);
            let handle = notice.author_handle.clone();
            FeedEvent::Deactivation { notice, handle }
        }
        other => FeedEvent::Unknown(other.to_string()),
    }
}

/// Parse a raw transport frame into an event.
pub fn parse_frame(frame: &str, rules: &NotificationRules) -> Result<FeedEvent> {
    let envelope: Envelope =
        serde_json::from_str(frame).context("Feed frame is not an event envelope")?;
    Ok(from_named(&envelope.event, &envelope.data, rules))
}
