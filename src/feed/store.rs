// Post collection — the caller-owned feed state that events are applied to.
//
// Events are applied in arrival order, newest posts at the front. The only
// asynchronous piece is the deactivation purge: after a grace delay every
// post by the deactivated account is removed, except the deactivation notice
// itself. Pending purges are aborted on shutdown or drop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::events::FeedEvent;
use super::model::Post;

/// Default grace delay before a deactivated account's posts are purged.
pub const DEFAULT_PURGE_DELAY: Duration = Duration::from_millis(1500);

/// Ordered, newest-first collection of normalized posts.
pub struct PostCollection {
    posts: Arc<Mutex<Vec<Post>>>,
    purge_delay: Duration,
    pending_purges: Vec<JoinHandle<()>>,
}

impl Default for PostCollection {
    fn default() -> Self {
        Self::new(DEFAULT_PURGE_DELAY)
    }
}

impl PostCollection {
    pub fn new(purge_delay: Duration) -> Self {
        Self {
            posts: Arc::new(Mutex::new(Vec::new())),
            purge_delay,
            pending_purges: Vec::new(),
        }
    }

    /// Apply one event. Must be called in arrival order.
    pub async fn apply(&mut self, event: FeedEvent) {
        self.pending_purges.retain(|h| !h.is_finished());

        match event {
            FeedEvent::Post(post) | FeedEvent::Follow(post) | FeedEvent::Unfollow(post) => {
                self.posts.lock().await.insert(0, post);
            }
            FeedEvent::InitialBatch(batch) => {
                let count = batch.len();
                let mut posts = self.posts.lock().await;
                posts.splice(0..0, batch);
                debug!(count, total = posts.len(), "Applied initial batch");
            }
            FeedEvent::Delete(identifier) => {
                let removed = remove_by_identifier(&mut *self.posts.lock().await, &identifier);
                debug!(identifier = %identifier, removed, "Applied delete");
            }
            FeedEvent::Deactivation { notice, handle } => {
                let notice_id = notice.id.clone();
                self.posts.lock().await.insert(0, notice);
                self.schedule_purge(handle, notice_id);
            }
            FeedEvent::Unknown(name) => {
                debug!(event = %name, "Ignoring unknown feed event");
            }
        }
    }

    /// Spawn the deferred purge for a deactivated account.
    fn schedule_purge(&mut self, handle: String, keep_id: String) {
        let posts = Arc::clone(&self.posts);
        let delay = self.purge_delay;

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let removed = purge_author(&mut *posts.lock().await, &handle, &keep_id);
            info!(handle = %handle, removed, "Purged posts from deactivated account");
        });

        self.pending_purges.push(task);
    }

    /// Cancel any purge that hasn't run yet.
    pub fn shutdown(&mut self) {
        let pending = self.pending_purges.len();
        for task in self.pending_purges.drain(..) {
            task.abort();
        }
        if pending > 0 {
            debug!(pending, "Cancelled pending purges");
        }
    }

    /// Number of purges scheduled and not yet finished.
    pub fn pending_purges(&self) -> usize {
        self.pending_purges.iter().filter(|h| !h.is_finished()).count()
    }

    /// Copy of the current posts, newest first.
    pub async fn snapshot(&self) -> Vec<Post> {
        self.posts.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.posts.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.lock().await.is_empty()
    }
}

impl Drop for PostCollection {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Remove every post whose id contains `identifier`, or whose upstream
/// status id equals it. Returns how many were removed.
pub fn remove_by_identifier(posts: &mut Vec<Post>, identifier: &str) -> usize {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return 0;
    }
    let before = posts.len();
    posts.retain(|p| {
        !(p.id.contains(identifier) || p.external_status_id.as_deref() == Some(identifier))
    });
    before - posts.len()
}

/// Remove every post by `handle` (case-insensitive) except the one with `keep_id`.
pub fn purge_author(posts: &mut Vec<Post>, handle: &str, keep_id: &str) -> usize {
    if handle.trim().is_empty() {
        return 0;
    }
    let before = posts.len();
    posts.retain(|p| p.id == keep_id || !p.is_authored_by(handle));
    before - posts.len()
}
