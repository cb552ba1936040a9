// Post collection tests — applying events in order, deletes, and the
// deferred deactivation purge (including cancellation on shutdown).

use std::time::Duration;

use serde_json::json;

use launchdeck::feed::events::{from_named, FeedEvent};
use launchdeck::feed::model::Post;
use launchdeck::feed::normalize::normalize_post;
use launchdeck::feed::rules::NotificationRules;
use launchdeck::feed::store::{purge_author, remove_by_identifier, PostCollection};

const SHORT_DELAY: Duration = Duration::from_millis(50);

fn post(handle: &str, status_id: &str, text: &str) -> Post {
    normalize_post(
        &json!({"id": status_id, "text": text, "author": {"username": handle}}),
        &NotificationRules::default(),
    )
}

fn event(name: &str, payload: serde_json::Value) -> FeedEvent {
    from_named(name, &payload, &NotificationRules::default())
}

// ============================================================
// Pure helpers
// ============================================================

#[test]
fn delete_removes_every_matching_post_only() {
    let mut posts = vec![
        post("a", "12345", "one"),
        post("b", "99999", "two"),
        post("c", "12345", "dupe"),
        post("d", "", "no id"),
    ];
    let removed = remove_by_identifier(&mut posts, "12345");
    assert_eq!(removed, 2);
    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|p| !p.id.contains("12345")));
    assert_eq!(posts[0].body_text, "two");
    assert_eq!(posts[1].body_text, "no id");
}

#[test]
fn delete_by_full_status_id_spares_generated_ids() {
    let mut posts = vec![
        post("a", "1790000000000000001", "target"),
        post("b", "1790000000000000002", "neighbour"),
        post("c", "", "no status id"),
    ];
    let removed = remove_by_identifier(&mut posts, "1790000000000000001");
    assert_eq!(removed, 1);
    let left: Vec<&str> = posts.iter().map(|p| p.body_text.as_str()).collect();
    assert_eq!(left, ["neighbour", "no status id"]);
}

#[test]
fn delete_with_blank_identifier_removes_nothing() {
    let mut posts = vec![post("a", "1", "x")];
    assert_eq!(remove_by_identifier(&mut posts, "  "), 0);
    assert_eq!(posts.len(), 1);
}

#[test]
fn purge_keeps_notice_and_other_authors() {
    let mut posts = vec![
        post("Mallory", "1", "a"),
        post("alice", "2", "b"),
        post("mallory", "3", "c"),
    ];
    let keep = post("MALLORY", "", "notice");
    let keep_id = keep.id.clone();
    posts.insert(0, keep);

    let removed = purge_author(&mut posts, "mallory", &keep_id);
    assert_eq!(removed, 2);
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, keep_id);
    assert_eq!(posts[1].author_handle, "alice");
}

// ============================================================
// Applying events
// ============================================================

#[tokio::test]
async fn new_posts_go_to_the_front() {
    let mut collection = PostCollection::new(SHORT_DELAY);
    collection.apply(FeedEvent::Post(post("a", "1", "first"))).await;
    collection.apply(FeedEvent::Post(post("b", "2", "second"))).await;

    let posts = collection.snapshot().await;
    assert_eq!(posts[0].body_text, "second");
    assert_eq!(posts[1].body_text, "first");
}

#[tokio::test]
async fn initial_batch_is_prepended_in_order() {
    let mut collection = PostCollection::new(SHORT_DELAY);
    collection.apply(FeedEvent::Post(post("z", "9", "existing"))).await;
    collection
        .apply(event(
            "initialTweets",
            json!([{"text": "b1", "username": "x"}, {"text": "b2", "username": "y"}]),
        ))
        .await;

    let texts: Vec<String> = collection
        .snapshot()
        .await
        .into_iter()
        .map(|p| p.body_text)
        .collect();
    assert_eq!(texts, vec!["b1", "b2", "existing"]);
}

#[tokio::test]
async fn delete_event_applies_to_collection() {
    let mut collection = PostCollection::new(SHORT_DELAY);
    collection.apply(FeedEvent::Post(post("a", "12345", "gone"))).await;
    collection.apply(FeedEvent::Post(post("b", "67890", "kept"))).await;
    collection.apply(event("tweet_delete", json!("12345"))).await;

    let posts = collection.snapshot().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].body_text, "kept");
}

#[tokio::test]
async fn unknown_events_change_nothing() {
    let mut collection = PostCollection::new(SHORT_DELAY);
    collection.apply(FeedEvent::Post(post("a", "1", "x"))).await;
    collection.apply(event("heartbeat", json!({}))).await;
    assert_eq!(collection.len().await, 1);
}

// ============================================================
// Deferred deactivation purge
// ============================================================

#[tokio::test]
async fn deactivation_purges_after_grace_delay() {
    let mut collection = PostCollection::new(SHORT_DELAY);
    collection.apply(FeedEvent::Post(post("Mallory", "1", "old"))).await;
    collection.apply(FeedEvent::Post(post("alice", "2", "keep"))).await;
    collection.apply(FeedEvent::Post(post("mallory", "3", "older"))).await;

    collection.apply(event("deactivation", json!("MALLORY"))).await;

    // Nothing is purged before the grace delay; the notice is already in.
    let posts = collection.snapshot().await;
    assert_eq!(posts.len(), 4);
    assert_eq!(posts[0].body_text, "Account has been deactivated");
    assert_eq!(collection.pending_purges(), 1);

    tokio::time::sleep(SHORT_DELAY * 4).await;

    let posts = collection.snapshot().await;
    assert_eq!(posts.len(), 2, "only the notice and alice's post remain");
    assert_eq!(posts[0].body_text, "Account has been deactivated");
    assert_eq!(posts[1].author_handle, "alice");
    assert_eq!(collection.pending_purges(), 0);
}

#[tokio::test]
async fn shutdown_cancels_pending_purge() {
    let mut collection = PostCollection::new(SHORT_DELAY);
    collection.apply(FeedEvent::Post(post("mallory", "1", "old"))).await;
    collection.apply(event("deactivation", json!("mallory"))).await;

    collection.shutdown();
    tokio::time::sleep(SHORT_DELAY * 4).await;

    assert_eq!(collection.len().await, 2);
    assert_eq!(collection.pending_purges(), 0);
}

#[tokio::test]
async fn follow_notices_are_kept_as_posts() {
    let mut collection = PostCollection::new(SHORT_DELAY);
    collection
        .apply(event("follow", json!({"username": "alice", "target": "bob"})))
        .await;
    collection
        .apply(event("unfollow", json!({"username": "alice", "target": "bob"})))
        .await;

    let posts = collection.snapshot().await;
    assert_eq!(posts[0].body_text, "Unfolllowed @bob");
    assert_eq!(posts[1].body_text, "Started following @bob");
}
