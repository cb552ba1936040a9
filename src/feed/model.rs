// Canonical post model — the shape every upstream payload is normalized into.
//
// These are the types that flow from the normalizer into the post collection
// and out to the terminal. They carry no knowledge of upstream field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of a media attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Gif,
}

/// A single media attachment, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub kind: MediaKind,
    pub url: String,
}

/// How the post relates to other posts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub is_retweet: bool,
    pub is_reply: bool,
    pub is_quote: bool,
}

/// Synthesized notification posts (not real upstream posts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Follow,
    Unfollow,
    Deactivation,
}

/// A normalized social-media post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Generated at normalization time; embeds the upstream status id when known.
    pub id: String,
    pub external_status_id: Option<String>,
    /// Handle without a leading `@`.
    pub author_handle: String,
    pub author_display_name: String,
    pub author_avatar_url: String,
    pub author_verified: bool,
    /// Empty for pure retweets, whose content lives in `embedded_post`.
    pub body_text: String,
    pub media: Vec<Media>,
    pub created_at: DateTime<Utc>,
    pub classification: Classification,
    /// Quoted or retweeted content. Never nests further.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedded_post: Option<Box<Post>>,
    /// Only present when the replied-to payload carried text or media.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replied_to_post: Option<Box<Post>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationKind>,
}

impl Post {
    /// Canonical external link, when the upstream status id is known.
    pub fn external_url(&self) -> Option<String> {
        let status_id = self.external_status_id.as_deref()?;
        let handle = if self.author_handle.is_empty() {
            "i"
        } else {
            self.author_handle.as_str()
        };
        Some(format!("https://x.com/{handle}/status/{status_id}"))
    }

    /// True if this post has anything worth rendering as a nested block.
    pub fn has_content(&self) -> bool {
        !self.body_text.is_empty() || !self.media.is_empty()
    }

    /// Case-insensitive author comparison. A leading `@` on `handle` is ignored.
    pub fn is_authored_by(&self, handle: &str) -> bool {
        self.author_handle
            .eq_ignore_ascii_case(handle.trim().trim_start_matches('@'))
    }

    /// The first image-like media URL, falling back to the author avatar.
    /// Used as the default deploy image.
    pub fn preferred_image(&self) -> Option<&str> {
        let own = self
            .media
            .iter()
            .chain(self.embedded_post.iter().flat_map(|p| p.media.iter()))
            .find(|m| m.kind != MediaKind::Video)
            .map(|m| m.url.as_str());
        own.or_else(|| {
            (!self.author_avatar_url.is_empty()).then_some(self.author_avatar_url.as_str())
        })
    }
}
