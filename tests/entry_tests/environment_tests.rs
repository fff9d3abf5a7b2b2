//! Tests for request environment capture
//!
//! These tests verify:
//! - Only allow-listed variables survive scrubbing, in allow-list order
//! - Snapshots are memoized per context identity
//! - Released contexts are scrubbed again on next use

use std::sync::Arc;

use backlog::entry::{EnvironmentCache, RequestContext, ALLOWED_ENV};

fn request(id: u64) -> RequestContext {
    RequestContext::new(id)
        .var("HTTP_HOST", "example.com")
        .var("REQUEST_URI", "/orders/7")
        .var("REQUEST_METHOD", "POST")
        .var("HTTP_USER_AGENT", "curl/8.0")
        .var("HTTP_COOKIE", "session=secret")
        .var("HTTP_AUTHORIZATION", "Bearer token")
}

#[test]
fn test_scrub_keeps_only_allowed() {
    let env = request(1).scrub();

    assert_eq!(env.len(), ALLOWED_ENV.len());
    assert_eq!(env.get("REQUEST_URI").map(String::as_str), Some("/orders/7"));
    assert!(!env.contains_key("HTTP_COOKIE"));
    assert!(!env.contains_key("HTTP_AUTHORIZATION"));
}

#[test]
fn test_scrub_follows_allow_list_order() {
    let env = request(1).scrub();

    let names: Vec<&str> = env.keys().map(String::as_str).collect();
    assert_eq!(names, ALLOWED_ENV);
}

#[test]
fn test_scrub_skips_missing_variables() {
    let env = RequestContext::new(2).var("HTTP_HOST", "h").scrub();

    assert_eq!(env.len(), 1);
    assert_eq!(env.get("HTTP_HOST").map(String::as_str), Some("h"));
}

#[test]
fn test_snapshot_is_memoized_per_context() {
    let cache = EnvironmentCache::new();
    let context = request(7);

    let first = cache.snapshot(&context);
    let second = cache.snapshot(&context);

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_snapshot_ignores_later_changes_to_same_context() {
    let cache = EnvironmentCache::new();

    cache.snapshot(&request(7));
    let changed = request(7).var("HTTP_HOST", "other.example.com");
    let snapshot = cache.snapshot(&changed);

    assert_eq!(snapshot.get("HTTP_HOST").map(String::as_str), Some("example.com"));
}

#[test]
fn test_distinct_contexts_get_distinct_snapshots() {
    let cache = EnvironmentCache::new();

    cache.snapshot(&request(1));
    cache.snapshot(&RequestContext::new(2).var("HTTP_HOST", "b"));

    assert_eq!(cache.len(), 2);
}

#[test]
fn test_release_forgets_context() {
    let cache = EnvironmentCache::new();
    cache.snapshot(&request(3));

    assert!(cache.release(3));
    assert!(!cache.release(3));
    assert!(cache.is_empty());

    let fresh = cache.snapshot(&RequestContext::new(3).var("HTTP_HOST", "new"));
    assert_eq!(fresh.get("HTTP_HOST").map(String::as_str), Some("new"));
}
