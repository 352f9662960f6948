use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::MonitorService;
use dedup_store::DedupStore;
use notifier::Notifier;
use reddit_client::FeedFetch;
use redwatch_core::{
    FetchError, Item, ItemKind, MonitorConfig, NotifyError, StoreConfig, StoreError,
};

fn test_config(keywords: &[&str]) -> MonitorConfig {
    MonitorConfig {
        subreddits: vec!["test".to_string()],
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        smtp_host: "smtp.example.com".to_string(),
        smtp_user: "monitor@example.com".to_string(),
        smtp_password: "secret".to_string(),
        recipient: "alerts@example.com".to_string(),
        store: StoreConfig::File {
            path: PathBuf::from("unused.json"),
        },
        poll_interval: Duration::from_secs(300),
        user_agent: "redwatch-test/1.0".to_string(),
    }
}

fn post(identifier: &str, text: &str) -> Item {
    Item {
        identifier: identifier.to_string(),
        text: text.to_string(),
        subreddit: "test".to_string(),
        created_utc: 1640995200.0,
        kind: ItemKind::Post,
    }
}

fn comment(identifier: &str, text: &str) -> Item {
    Item {
        identifier: identifier.to_string(),
        text: text.to_string(),
        subreddit: "test".to_string(),
        created_utc: 1640995300.0,
        kind: ItemKind::Comment,
    }
}

/// Scripted feed: `None` for a kind simulates a fetch failure.
struct ScriptedFeed {
    posts: Option<Vec<Item>>,
    comments: Option<Vec<Item>>,
}

impl FeedFetch for &ScriptedFeed {
    async fn fetch(&self, kind: ItemKind) -> Result<Vec<Item>, FetchError> {
        let window = match kind {
            ItemKind::Post => &self.posts,
            ItemKind::Comment => &self.comments,
        };
        match window {
            Some(items) => Ok(items.clone()),
            None => Err(FetchError::UnexpectedStatus {
                status_code: 503,
                endpoint: format!("/{}s", kind.label()),
            }),
        }
    }
}

#[derive(Default)]
struct MemoryStore {
    seen: Mutex<HashSet<String>>,
    fail_contains: AtomicBool,
    fail_record: AtomicBool,
}

impl MemoryStore {
    fn with_seen(identifiers: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut seen = store.seen.lock().unwrap();
            for id in identifiers {
                seen.insert(id.to_string());
            }
        }
        store
    }

    fn recorded(&self, identifier: &str) -> bool {
        self.seen.lock().unwrap().contains(identifier)
    }
}

impl DedupStore for &MemoryStore {
    async fn contains(&self, identifier: &str) -> Result<bool, StoreError> {
        if self.fail_contains.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionFailed {
                reason: "backend unavailable".to_string(),
            });
        }
        Ok(self.seen.lock().unwrap().contains(identifier))
    }

    async fn record(&self, identifier: &str) -> Result<(), StoreError> {
        if self.fail_record.load(Ordering::SeqCst) {
            return Err(StoreError::ConnectionFailed {
                reason: "backend unavailable".to_string(),
            });
        }
        self.seen.lock().unwrap().insert(identifier.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct MockNotifier {
    sent: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl MockNotifier {
    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for &MockNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::InvalidAddress {
                address: "transport down".to_string(),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

#[tokio::test]
async fn test_end_to_end_first_match_notifies_once() {
    let feed = ScriptedFeed {
        posts: Some(vec![post("/r/test/1", "Hiring a VA ")]),
        comments: Some(vec![]),
    };
    let store = MemoryStore::default();
    let notifier = MockNotifier::default();
    let service = MonitorService::new(&feed, &store, &notifier, test_config(&["VA", "leads"]));

    service.run_cycle().await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    let (subject, body) = &sent[0];
    assert_eq!(subject, "Reddit Keyword Alert: Post in r/test");
    assert!(body.contains("VA"));
    assert!(body.contains("https://www.reddit.com/r/test/1"));
    assert!(store.recorded("/r/test/1"));

    // The same window is fetched again next cycle; no second notification.
    service.run_cycle().await;
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_previously_recorded_identifier_not_renotified() {
    // Store pre-seeded as if a previous process run had already notified.
    let feed = ScriptedFeed {
        posts: Some(vec![post("/r/test/1", "Hiring a VA ")]),
        comments: Some(vec![]),
    };
    let store = MemoryStore::with_seen(&["/r/test/1"]);
    let notifier = MockNotifier::default();
    let service = MonitorService::new(&feed, &store, &notifier, test_config(&["VA"]));

    service.run_cycle().await;

    assert!(notifier.sent().is_empty());
}

#[tokio::test]
async fn test_store_error_skips_item_conservatively() {
    let feed = ScriptedFeed {
        posts: Some(vec![post("/r/test/1", "Hiring a VA ")]),
        comments: Some(vec![]),
    };
    let store = MemoryStore::default();
    store.fail_contains.store(true, Ordering::SeqCst);
    let notifier = MockNotifier::default();
    let service = MonitorService::new(&feed, &store, &notifier, test_config(&["VA"]));

    service.run_cycle().await;

    // A failed dedup check must not be treated as "unseen".
    assert!(notifier.sent().is_empty());
    assert!(!store.recorded("/r/test/1"));
}

#[tokio::test]
async fn test_notify_failure_leaves_item_unrecorded() {
    let feed = ScriptedFeed {
        posts: Some(vec![post("/r/test/1", "Hiring a VA ")]),
        comments: Some(vec![]),
    };
    let store = MemoryStore::default();
    let notifier = MockNotifier::default();
    notifier.fail.store(true, Ordering::SeqCst);
    let service = MonitorService::new(&feed, &store, &notifier, test_config(&["VA"]));

    service.run_cycle().await;
    assert!(notifier.sent().is_empty());
    assert!(!store.recorded("/r/test/1"));

    // Transport recovers; the alert goes out on the next cycle.
    notifier.fail.store(false, Ordering::SeqCst);
    service.run_cycle().await;
    assert_eq!(notifier.sent().len(), 1);
    assert!(store.recorded("/r/test/1"));
}

#[tokio::test]
async fn test_fetch_failure_isolated_per_kind() {
    let feed = ScriptedFeed {
        posts: None,
        comments: Some(vec![comment("/r/test/c1", "fresh leads here")]),
    };
    let store = MemoryStore::default();
    let notifier = MockNotifier::default();
    let service = MonitorService::new(&feed, &store, &notifier, test_config(&["leads"]));

    service.run_cycle().await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "Reddit Keyword Alert: Comment in r/test");
    assert!(store.recorded("/r/test/c1"));
}

#[tokio::test]
async fn test_non_matching_items_never_recorded() {
    let feed = ScriptedFeed {
        posts: Some(vec![post("/r/test/1", "hello world ")]),
        comments: Some(vec![]),
    };
    let store = MemoryStore::default();
    let notifier = MockNotifier::default();
    let service = MonitorService::new(&feed, &store, &notifier, test_config(&["VA", "leads"]));

    service.run_cycle().await;
    service.run_cycle().await;

    assert!(notifier.sent().is_empty());
    assert!(!store.recorded("/r/test/1"));
}

#[tokio::test]
async fn test_record_failure_does_not_stop_the_cycle() {
    let feed = ScriptedFeed {
        posts: Some(vec![
            post("/r/test/1", "Hiring a VA "),
            post("/r/test/2", "buying leads "),
        ]),
        comments: Some(vec![]),
    };
    let store = MemoryStore::default();
    store.fail_record.store(true, Ordering::SeqCst);
    let notifier = MockNotifier::default();
    let service = MonitorService::new(&feed, &store, &notifier, test_config(&["VA", "leads"]));

    service.run_cycle().await;

    // Both notifications were sent even though neither marker stuck; this
    // is the accepted duplicate-risk gap, not a loop-terminating error.
    assert_eq!(notifier.sent().len(), 2);
    assert!(!store.recorded("/r/test/1"));
    assert!(!store.recorded("/r/test/2"));
}

#[tokio::test]
async fn test_items_processed_in_fetched_order() {
    let feed = ScriptedFeed {
        posts: Some(vec![
            post("/r/test/1", "Hiring a VA "),
            post("/r/test/2", "need a VA too "),
        ]),
        comments: Some(vec![]),
    };
    let store = MemoryStore::default();
    let notifier = MockNotifier::default();
    let service = MonitorService::new(&feed, &store, &notifier, test_config(&["VA"]));

    service.run_cycle().await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].1.contains("/r/test/1"));
    assert!(sent[1].1.contains("/r/test/2"));
}
