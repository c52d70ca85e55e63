// Tests for the recursive fuzz engine against an in-memory fetcher

use delve_core::engine::FuzzEngine;
use delve_core::filter::FilterChain;
use delve_core::notify::{Notification, Notifier};
use delve_core::passive::PassiveMiner;
use delve_core::rate::RateGate;
use delve_core::target::Target;
use delve_core::FuzzOptions;
use delve_scanner::error::Result as ScanResult;
use delve_scanner::{FetchedPage, PageFetcher, ScanError};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::Instant;

#[derive(Clone, Copy)]
enum Reply {
    Page(u16, &'static str),
    Html(&'static str),
    Missing,
    Fail,
}

struct ScriptedFetcher {
    replies: HashMap<String, Reply>,
    fallback: Reply,
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedFetcher {
    fn new() -> Self {
        Self {
            replies: HashMap::new(),
            fallback: Reply::Page(404, "not found"),
            log: Arc::default(),
        }
    }

    fn reply(mut self, url: &str, reply: Reply) -> Self {
        self.replies.insert(url.to_string(), reply);
        self
    }

    fn fallback(mut self, reply: Reply) -> Self {
        self.fallback = reply;
        self
    }

    fn log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.log)
    }
}

impl PageFetcher for ScriptedFetcher {
    async fn goto(&self, url: &str, _timeout: Duration) -> ScanResult<Option<FetchedPage>> {
        self.log.lock().unwrap().push(url.to_string());
        match *self.replies.get(url).unwrap_or(&self.fallback) {
            Reply::Page(status, body) => Ok(Some(FetchedPage::new(url, status, body))),
            Reply::Html(body) => {
                Ok(Some(FetchedPage::new(url, 200, body).with_content_type("text/html")))
            }
            Reply::Missing => Ok(None),
            Reply::Fail => Err(ScanError::Timeout(Duration::from_secs(1))),
        }
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier(Arc<Mutex<Vec<Notification>>>);

impl RecordingNotifier {
    fn sent(&self) -> Vec<Notification> {
        self.0.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) {
        self.0.lock().unwrap().push(notification.clone());
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn options(target: &str, list: &[&str]) -> FuzzOptions {
    FuzzOptions::new(Target::parse(target).unwrap(), words(list))
}

#[tokio::test(start_paused = true)]
async fn test_template_fetches_in_wordlist_order() {
    let fetcher = ScriptedFetcher::new()
        .reply("https://x/admin", Reply::Page(200, "admin"))
        .reply("https://x/login", Reply::Page(200, "login"));
    let log = fetcher.log();

    let outcome = FuzzEngine::new(
        options("https://x/FUZZ", &["admin", "login"]),
        fetcher,
        RecordingNotifier::default(),
    )
    .run()
    .await;

    assert_eq!(
        *log.lock().unwrap(),
        vec!["https://x/admin".to_string(), "https://x/login".to_string()]
    );
    assert_eq!(outcome.visited.len(), 1);
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.counters.requests, 2);
}

#[tokio::test(start_paused = true)]
async fn test_include_status_suppresses_without_notifying() {
    let body: &'static str = Box::leak("a".repeat(500).into_boxed_str());
    let fetcher = ScriptedFetcher::new().reply("https://x/admin", Reply::Page(200, body));
    let notifier = RecordingNotifier::default();
    let filters = FilterChain::from_specs(Some("200"), None, None, None).unwrap();

    let outcome = FuzzEngine::new(
        options("https://x/FUZZ", &["admin", "missing"]).with_filters(filters),
        fetcher,
        notifier.clone(),
    )
    .run()
    .await;

    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].word, "admin");
    assert_eq!(outcome.results[0].record.size_bytes, 500);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].endpoint, "admin");
    assert_eq!(sent[0].size, 500);
    assert!(sent[0].keyword.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_redirect_expands_one_level() {
    let fetcher = ScriptedFetcher::new().reply("https://x/admin", Reply::Page(301, ""));
    let log = fetcher.log();

    let outcome = FuzzEngine::new(
        options("https://x", &["admin", "old"]).with_recursion(2),
        fetcher,
        RecordingNotifier::default(),
    )
    .run()
    .await;

    let visited: Vec<(&str, usize)> = outcome
        .visited
        .iter()
        .map(|e| (e.url.as_str(), e.depth))
        .collect();
    assert_eq!(visited, vec![("https://x", 1), ("https://x/admin", 2)]);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "https://x/admin".to_string(),
            "https://x/old".to_string(),
            "https://x/admin/admin".to_string(),
            "https://x/admin/old".to_string(),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_repeat_hit_is_not_requeued() {
    let fetcher = ScriptedFetcher::new()
        .reply("https://x/admin", Reply::Page(301, ""))
        .reply("https://x/admin/", Reply::Page(200, "index"));

    let outcome = FuzzEngine::new(
        options("https://x", &["admin", "admin/"]).with_recursion(3),
        fetcher,
        RecordingNotifier::default(),
    )
    .run()
    .await;

    let urls: Vec<&str> = outcome.visited.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(urls, vec!["https://x", "https://x/admin"]);
    assert_eq!(outcome.discovered, 2);
}

#[tokio::test(start_paused = true)]
async fn test_breadth_first_bounded_by_max_depth() {
    let fetcher = ScriptedFetcher::new().fallback(Reply::Page(200, "ok"));

    let outcome = FuzzEngine::new(
        options("https://x", &["a", "b"]).with_recursion(3),
        fetcher,
        RecordingNotifier::default(),
    )
    .run()
    .await;

    let depths: Vec<usize> = outcome.visited.iter().map(|e| e.depth).collect();
    assert_eq!(depths, vec![1, 2, 2, 3, 3, 3, 3]);
    assert!(depths.windows(2).all(|pair| pair[0] <= pair[1]));

    let unique: HashSet<&str> = outcome.visited.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(unique.len(), outcome.visited.len());
    assert_eq!(outcome.counters.requests, 14);
}

#[tokio::test(start_paused = true)]
async fn test_no_recursion_when_disabled() {
    let fetcher = ScriptedFetcher::new().fallback(Reply::Page(200, "ok"));

    let outcome = FuzzEngine::new(
        options("https://x", &["a", "b"]),
        fetcher,
        RecordingNotifier::default(),
    )
    .run()
    .await;

    assert_eq!(outcome.visited.len(), 1);
    assert_eq!(outcome.discovered, 1);
}

#[tokio::test(start_paused = true)]
async fn test_keyword_hit_notifies_once_even_when_filtered() {
    let fetcher = ScriptedFetcher::new()
        .reply("https://x/notes", Reply::Page(404, "the secret and the flag"))
        .reply("https://x/home", Reply::Page(200, "nothing to see"));
    let notifier = RecordingNotifier::default();
    let filters = FilterChain::from_specs(Some("200"), None, None, None).unwrap();

    let outcome = FuzzEngine::new(
        options("https://x/FUZZ", &["notes", "home"])
            .with_filters(filters)
            .with_keywords(words(&["flag", "secret"])),
        fetcher,
        notifier.clone(),
    )
    .run()
    .await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].endpoint, "notes");
    assert_eq!(sent[0].keyword.as_deref(), Some("flag"));

    // accepted, but keywords are configured so it does not notify
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].word, "home");
}

#[tokio::test(start_paused = true)]
async fn test_notification_reports_recursion_state() {
    let fetcher = ScriptedFetcher::new().reply("https://x/api", Reply::Page(200, "{}"));
    let notifier = RecordingNotifier::default();

    FuzzEngine::new(
        options("https://x", &["api"]).with_recursion(2),
        fetcher,
        notifier.clone(),
    )
    .run()
    .await;

    let sent = notifier.sent();
    assert_eq!(sent[0].target, "https://x");
    assert!(sent[0].recursion_active);
    // the depth-2 hit on /api/api is a 404 and is still accepted with no filters
    assert_eq!(sent[1].target, "https://x/api");
    assert!(!sent[1].recursion_active);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_errors_are_counted_and_skipped() {
    let fetcher = ScriptedFetcher::new()
        .reply("https://x/down", Reply::Fail)
        .reply("https://x/up", Reply::Page(200, "up"));
    let log = fetcher.log();

    let outcome = FuzzEngine::new(
        options("https://x/FUZZ", &["down", "up"]),
        fetcher,
        RecordingNotifier::default(),
    )
    .run()
    .await;

    assert_eq!(outcome.counters.requests, 2);
    assert_eq!(outcome.counters.errors, 1);
    assert_eq!(log.lock().unwrap().len(), 2);
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].word, "up");
}

#[tokio::test(start_paused = true)]
async fn test_missing_response_is_status_zero() {
    let fetcher = ScriptedFetcher::new().reply("https://x/void", Reply::Missing);

    let outcome = FuzzEngine::new(
        options("https://x/FUZZ", &["void"]),
        fetcher,
        RecordingNotifier::default(),
    )
    .run()
    .await;

    assert_eq!(outcome.counters.errors, 0);
    assert_eq!(outcome.results[0].record.status, 0);
    assert_eq!(outcome.results[0].record.size_bytes, 0);
}

#[tokio::test(start_paused = true)]
async fn test_passive_tokens_written_once() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("passive.txt");
    let page = r#"<html><body><a href="/account/settings">Settings</a><script>load("/api/v2")</script></body></html>"#;
    let fetcher = ScriptedFetcher::new().fallback(Reply::Html(page));
    let miner = PassiveMiner::open(&output, false).unwrap();

    let outcome = FuzzEngine::new(
        options("https://x/FUZZ", &["one", "two"]).with_passive(miner),
        fetcher,
        RecordingNotifier::default(),
    )
    .run()
    .await;

    let written = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines, vec!["/account/settings", "/api/v2", "Settings", "load"]);
    assert_eq!(outcome.passive_tokens, 4);
}

#[tokio::test(start_paused = true)]
async fn test_rate_gate_paces_requests() {
    let fetcher = ScriptedFetcher::new();
    let start = Instant::now();

    let outcome = FuzzEngine::new(
        options("https://x/FUZZ", &["a", "b", "c", "d"]).with_rate(RateGate::per_second(2.0).unwrap()),
        fetcher,
        RecordingNotifier::default(),
    )
    .run()
    .await;

    assert!(start.elapsed() >= Duration::from_secs(2));
    assert!(outcome.counters.elapsed >= Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_rate_gate_paces_failed_requests() {
    let fetcher = ScriptedFetcher::new().fallback(Reply::Fail);
    let log = fetcher.log();
    let rate = RateGate::per_second(2.0).unwrap();
    let start = Instant::now();

    let outcome = FuzzEngine::new(
        options("https://x/FUZZ", &["a", "b", "c"]).with_rate(rate),
        fetcher,
        RecordingNotifier::default(),
    )
    .run()
    .await;

    assert!(start.elapsed() >= rate.delay() * 3);
    assert_eq!(outcome.counters.errors, 3);
    assert_eq!(outcome.counters.requests, 3);
    assert_eq!(log.lock().unwrap().len(), 3);
    assert!(outcome.results.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_progress_bar_only_when_requested() {
    let quiet = FuzzEngine::new(
        options("https://x/FUZZ", &["a"]),
        ScriptedFetcher::new(),
        RecordingNotifier::default(),
    );
    assert!(quiet.progress_bar().is_none());

    let mut shown = options("https://x/FUZZ", &["a"]);
    shown.show_progress_bars = true;
    let engine = FuzzEngine::new(shown, ScriptedFetcher::new(), RecordingNotifier::default());
    assert!(engine.progress_bar().is_some());
}
