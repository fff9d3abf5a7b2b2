//! Tests for Store write-side behaviour
//!
//! These tests verify:
//! - Report gating (empty, minimum severity, ignore patterns, duplicates)
//! - Bounded FIFO retention and both trim strategies
//! - Backtrace and request environment capture
//! - Count/clear, journaled persistence, concurrent reporting

use std::sync::Arc;
use std::thread;

use backlog::config::TrimStrategy;
use backlog::entry::{encode, EnvironmentCache, LogEntry, RequestContext};
use backlog::list::{FileList, MemoryList};
use backlog::{Config, ListBackend, PageQuery, ReportOptions, Severity, Store};
use regex::Regex;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn quiet_config() -> backlog::config::ConfigBuilder {
    Config::builder().capture_backtrace(false)
}

fn store_with(max: u64) -> Store<MemoryList> {
    Store::in_memory(quiet_config().max_backlog(max).build())
}

fn report(store: &Store<impl ListBackend>, severity: Severity, message: &str) -> Option<String> {
    store
        .report(severity, "test", message, ReportOptions::new())
        .unwrap()
}

fn messages(store: &Store<impl ListBackend>) -> Vec<String> {
    store
        .latest(&PageQuery::new().limit(1000))
        .unwrap()
        .into_iter()
        .map(|e| e.message)
        .collect()
}

fn encoded(message: &str) -> String {
    encode(&LogEntry::new(Severity::Info, "seed", message)).unwrap()
}

// =============================================================================
// Gating Tests
// =============================================================================

#[test]
fn test_report_returns_key() {
    let store = store_with(10);

    let key = report(&store, Severity::Info, "hello").unwrap();

    let page = store.latest(&PageQuery::new()).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].key, key);
    assert_eq!(page[0].progname, "test");
}

#[test]
fn test_empty_message_is_dropped() {
    let store = store_with(10);

    assert_eq!(report(&store, Severity::Error, ""), None);
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_empty_message_kept_when_not_skipping() {
    let store = Store::in_memory(quiet_config().skip_empty(false).build());

    assert!(report(&store, Severity::Info, "").is_some());
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_below_min_severity_is_dropped() {
    let store = Store::in_memory(quiet_config().min_severity(Severity::Warn).build());

    assert_eq!(report(&store, Severity::Info, "chatty"), None);
    assert!(report(&store, Severity::Warn, "careful").is_some());
    assert!(report(&store, Severity::Fatal, "boom").is_some());

    assert_eq!(messages(&store), vec!["careful", "boom"]);
}

#[test]
fn test_ignore_patterns_drop_matches() {
    let config = quiet_config()
        .ignore_pattern(Regex::new(r"^healthcheck").unwrap())
        .ignore_pattern(Regex::new(r"favicon\.ico").unwrap())
        .build();
    let store = Store::in_memory(config);

    report(&store, Severity::Info, "healthcheck ok");
    report(&store, Severity::Info, "GET /favicon.ico 404");
    report(&store, Severity::Info, "GET /orders 200");

    assert_eq!(messages(&store), vec!["GET /orders 200"]);
}

#[test]
fn test_dedup_drops_repeat_of_newest() {
    let store = Store::in_memory(quiet_config().dedup(true).build());

    assert!(report(&store, Severity::Error, "disk full").is_some());
    assert_eq!(report(&store, Severity::Error, "disk full"), None);

    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_dedup_allows_non_consecutive_repeat() {
    let store = Store::in_memory(quiet_config().dedup(true).build());

    report(&store, Severity::Error, "disk full");
    report(&store, Severity::Info, "cleanup ran");
    report(&store, Severity::Error, "disk full");

    assert_eq!(messages(&store), vec!["disk full", "cleanup ran", "disk full"]);
}

#[test]
fn test_dedup_compares_severity() {
    let store = Store::in_memory(quiet_config().dedup(true).build());

    report(&store, Severity::Warn, "slow query");
    report(&store, Severity::Error, "slow query");

    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn test_duplicates_kept_without_dedup() {
    let store = store_with(10);

    report(&store, Severity::Info, "same");
    report(&store, Severity::Info, "same");

    assert_eq!(store.count().unwrap(), 2);
}

// =============================================================================
// Retention Tests
// =============================================================================

#[test]
fn test_bounded_fifo() {
    let store = store_with(3);

    for m in ["m1", "m2", "m3", "m4", "m5"] {
        report(&store, Severity::Info, m);
    }

    assert_eq!(store.count().unwrap(), 3);
    assert_eq!(messages(&store), vec!["m3", "m4", "m5"]);
}

#[test]
fn test_single_pop_evicts_one_per_report() {
    let backend = MemoryList::from_records((0..5).map(|i| encoded(&format!("old{}", i))));
    let config = quiet_config()
        .max_backlog(2)
        .trim_strategy(TrimStrategy::SinglePop)
        .build();
    let store = Store::new(config, backend);

    report(&store, Severity::Info, "new");

    assert_eq!(store.count().unwrap(), 5);
}

#[test]
fn test_to_capacity_restores_bound() {
    let backend = MemoryList::from_records((0..5).map(|i| encoded(&format!("old{}", i))));
    let config = quiet_config()
        .max_backlog(2)
        .trim_strategy(TrimStrategy::ToCapacity)
        .build();
    let store = Store::new(config, backend);

    report(&store, Severity::Info, "new");

    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(messages(&store), vec!["old4", "new"]);
}

#[test]
fn test_push_entry_bypasses_gating() {
    let store = Store::in_memory(quiet_config().min_severity(Severity::Fatal).build());
    let entry = LogEntry::new(Severity::Debug, "import", "");

    store.push_entry(&entry).unwrap();

    let page = store.latest(&PageQuery::new()).unwrap();
    assert_eq!(page, vec![entry]);
}

#[test]
fn test_clear_removes_everything() {
    let store = store_with(10);
    for m in ["a", "b", "c"] {
        report(&store, Severity::Info, m);
    }

    store.clear().unwrap();

    assert_eq!(store.count().unwrap(), 0);
    assert!(store.latest(&PageQuery::new()).unwrap().is_empty());
}

// =============================================================================
// Backtrace / Environment Tests
// =============================================================================

#[test]
fn test_explicit_backtrace_is_stored() {
    let store = store_with(10);

    store
        .report(
            Severity::Error,
            "web",
            "oops",
            ReportOptions::new().backtrace("handler.rs:12\nmain.rs:4"),
        )
        .unwrap();

    let page = store.latest(&PageQuery::new()).unwrap();
    assert_eq!(page[0].backtrace.as_deref(), Some("handler.rs:12\nmain.rs:4"));
}

#[test]
fn test_backtrace_absent_when_capture_disabled() {
    let store = store_with(10);

    report(&store, Severity::Error, "oops");

    assert_eq!(store.latest(&PageQuery::new()).unwrap()[0].backtrace, None);
}

#[test]
fn test_backtrace_captured_when_enabled() {
    let store = Store::in_memory(Config::builder().capture_backtrace(true).build());

    report(&store, Severity::Error, "oops");

    let page = store.latest(&PageQuery::new()).unwrap();
    assert!(page[0].backtrace.is_some());
}

#[test]
fn test_environment_attached_from_context() {
    let store = store_with(10);
    let context = RequestContext::new(99)
        .var("REQUEST_URI", "/checkout")
        .var("HTTP_COOKIE", "secret");

    store
        .report(Severity::Warn, "web", "slow", ReportOptions::new().context(&context))
        .unwrap();
    store
        .report(Severity::Warn, "web", "slower", ReportOptions::new().context(&context))
        .unwrap();

    let page = store.latest(&PageQuery::new()).unwrap();
    for entry in &page {
        let env = entry.environment.as_ref().unwrap();
        assert_eq!(env.get("REQUEST_URI").map(String::as_str), Some("/checkout"));
        assert!(!env.contains_key("HTTP_COOKIE"));
    }
    assert_eq!(store.environments().len(), 1);

    assert!(store.environments().release(99));
}

#[test]
fn test_stores_share_environment_cache() {
    let cache = Arc::new(EnvironmentCache::new());
    let web = Store::with_environments(quiet_config().build(), MemoryList::new(), Arc::clone(&cache));
    let jobs = Store::with_environments(quiet_config().build(), MemoryList::new(), Arc::clone(&cache));
    let context = RequestContext::new(5).var("HTTP_HOST", "example.com");

    web.report(Severity::Info, "web", "a", ReportOptions::new().context(&context))
        .unwrap();
    jobs.report(Severity::Info, "jobs", "b", ReportOptions::new().context(&context))
        .unwrap();

    assert_eq!(cache.len(), 1);
    assert!(Arc::ptr_eq(web.environments(), jobs.environments()));
}

#[test]
fn test_environment_absent_without_context() {
    let store = store_with(10);

    report(&store, Severity::Info, "background job");

    assert_eq!(store.latest(&PageQuery::new()).unwrap()[0].environment, None);
}

// =============================================================================
// Backend Tests
// =============================================================================

#[test]
fn test_journaled_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let config = || {
        quiet_config()
            .data_dir(dir.path())
            .max_backlog(2)
            .compaction_threshold(1)
            .build()
    };

    {
        let store = Store::<FileList>::open(config()).unwrap();
        for m in ["a", "b", "c"] {
            report(&store, Severity::Info, m);
        }
    }

    let store = Store::<FileList>::open(config()).unwrap();
    assert_eq!(messages(&store), vec!["b", "c"]);
}

#[test]
fn test_store_over_shared_backend() {
    let backend = Arc::new(MemoryList::new());
    let store = Store::new(quiet_config().build(), Arc::clone(&backend));

    report(&store, Severity::Info, "shared");

    assert_eq!(backend.length().unwrap(), 1);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_reports_respect_capacity() {
    let store = Arc::new(store_with(50));
    let mut handles = vec![];

    for t in 0..4 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                store
                    .report(Severity::Info, "worker", &format!("t{} m{}", t, i), ReportOptions::new())
                    .unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // Racing trims can each pop once for the same overflow
    let count = store.count().unwrap();
    assert!(count <= 50, "count {} over capacity", count);
    assert!(count >= 46, "count {} evicted too much", count);
}

#[test]
fn test_concurrent_reports_all_retained_under_capacity() {
    let store = Arc::new(store_with(1000));
    let mut handles = vec![];

    for t in 0..4 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..25 {
                store
                    .report(Severity::Info, "worker", &format!("t{} m{}", t, i), ReportOptions::new())
                    .unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.count().unwrap(), 100);
}
