// Breadth-first fuzz controller

use crate::config::FuzzOptions;
use crate::dispatch::{Dispatched, RequestDispatcher, ResponseRecord};
use crate::filter::Verdict;
use crate::frontier::{DiscoveredSet, Frontier, FrontierEntry, normalize_url};
use crate::notify::{Notification, Notifier};
use crate::report::{
    ProgressReporter, ProgressSnapshot, RunCounters, format_depth_banner, format_error_line,
    format_keyword_line, format_result_line,
};
use delve_scanner::{PageFetcher, PageSnapshot};
use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Statuses that mark a path as a directory worth expanding.
const RECURSE_STATUSES: [u16; 3] = [200, 301, 302];

/// A response that passed the filter chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuzzResult {
    pub url: String,
    pub word: String,
    pub depth: usize,
    pub record: ResponseRecord,
}

/// Mutable traversal state for one run.
#[derive(Debug)]
pub struct RunContext {
    pub frontier: Frontier,
    pub discovered: DiscoveredSet,
    pub counters: RunCounters,
    results: Vec<FuzzResult>,
    visited: Vec<FrontierEntry>,
    passive_tokens: usize,
}

impl RunContext {
    pub fn new(start_url: &str) -> Self {
        let mut discovered = DiscoveredSet::default();
        discovered.insert(start_url);
        Self {
            frontier: Frontier::with_root(normalize_url(start_url)),
            discovered,
            counters: RunCounters::start(),
            results: Vec::new(),
            visited: Vec::new(),
            passive_tokens: 0,
        }
    }
}

#[derive(Debug)]
pub struct FuzzOutcome {
    pub results: Vec<FuzzResult>,
    /// Frontier entries in the order they were dequeued.
    pub visited: Vec<FrontierEntry>,
    pub counters: ProgressSnapshot,
    pub discovered: usize,
    pub passive_tokens: usize,
}

pub struct FuzzEngine<F, N> {
    options: FuzzOptions,
    dispatcher: RequestDispatcher<F>,
    notifier: N,
    reporter: ProgressReporter,
    estimate: u64,
}

impl<F: PageFetcher, N: Notifier> FuzzEngine<F, N> {
    pub fn new(options: FuzzOptions, fetcher: F, notifier: N) -> Self {
        let reporter = ProgressReporter::new(options.show_progress_bars);
        let estimate = options.request_estimate();
        Self {
            dispatcher: RequestDispatcher::new(fetcher, options.timeout),
            options,
            notifier,
            reporter,
            estimate,
        }
    }

    pub fn progress_bar(&self) -> Option<ProgressBar> {
        self.reporter.bar()
    }

    /// Drain the frontier. Per-request failures are counted, never returned.
    pub async fn run(mut self) -> FuzzOutcome {
        let wordlist = std::mem::take(&mut self.options.wordlist);
        let mut ctx = RunContext::new(self.options.target.start_url());

        info!(
            "Fuzzing {} with {} words (recursive: {}, max depth: {})",
            self.options.target.start_url(),
            wordlist.len(),
            self.options.recursive,
            self.options.max_depth
        );

        while let Some(entry) = ctx.frontier.pop() {
            debug!("Dequeued {} at depth {}", entry.url, entry.depth);
            self.reporter.println(format_depth_banner(&entry));

            for word in &wordlist {
                self.attempt(&mut ctx, &entry, word).await;
            }
            ctx.visited.push(entry);
        }

        let counters = ctx.counters.snapshot();
        self.reporter.finish(&counters, self.estimate);
        info!(
            "Fuzz complete: {} requests, {} errors, {} findings",
            counters.requests,
            counters.errors,
            ctx.results.len()
        );

        FuzzOutcome {
            results: ctx.results,
            visited: ctx.visited,
            counters,
            discovered: ctx.discovered.len(),
            passive_tokens: ctx.passive_tokens,
        }
    }

    async fn attempt(&mut self, ctx: &mut RunContext, entry: &FrontierEntry, word: &str) {
        let url = self.options.target.build_url(entry, word);
        self.options.rate.wait().await;

        match self.dispatcher.fetch(&url).await {
            Ok(dispatched) => {
                ctx.counters.record_success();
                self.handle_response(ctx, entry, word, url, dispatched).await;
            }
            Err(e) => {
                ctx.counters.record_error();
                debug!("Request to {} failed: {}", e.url, e);
                self.reporter.println(format_error_line(word, &e));
            }
        }

        self.reporter.update(&ctx.counters.snapshot(), self.estimate);
    }

    async fn handle_response(
        &mut self,
        ctx: &mut RunContext,
        entry: &FrontierEntry,
        word: &str,
        url: String,
        dispatched: Dispatched,
    ) {
        let record = dispatched.record;
        let recursion_active = self.options.recursion_active(entry.depth);

        if let Some(miner) = self.options.passive.as_mut() {
            let snapshot = if dispatched.page.is_html() {
                PageSnapshot::from_html(&dispatched.page.content)
            } else {
                PageSnapshot::from_text(&dispatched.page.content)
            };
            match miner.mine(&snapshot) {
                Ok(tokens) => {
                    if !tokens.is_empty() {
                        debug!("Mined {} new tokens from {}", tokens.len(), url);
                    }
                    ctx.passive_tokens += tokens.len();
                }
                Err(e) => warn!("Passive extraction failed for {}: {}", url, e),
            }
        }

        let notification = |keyword: Option<String>| Notification {
            target: entry.url.clone(),
            endpoint: word.to_string(),
            size: record.size_bytes,
            recursion_active,
            keyword,
        };

        if let Some(keyword) = self
            .options
            .keywords
            .iter()
            .find(|keyword| dispatched.page.content.contains(keyword.as_str()))
            .cloned()
        {
            self.reporter
                .println(format_keyword_line(word, &keyword, &record));
            self.notifier.notify(&notification(Some(keyword))).await;
        }

        match self.options.filters.evaluate(record.status, record.size_bytes) {
            Verdict::Accepted => {
                self.reporter.println(format_result_line(word, &record));
                if self.options.keywords.is_empty() {
                    self.notifier.notify(&notification(None)).await;
                }
                ctx.results.push(FuzzResult {
                    url: url.clone(),
                    word: word.to_string(),
                    depth: entry.depth,
                    record,
                });
            }
            Verdict::Rejected(stage) => {
                debug!("{} rejected by {} filter", url, stage.as_str());
            }
        }

        if recursion_active
            && RECURSE_STATUSES.contains(&record.status)
            && ctx.discovered.insert(&url)
        {
            let next = FrontierEntry::new(normalize_url(&url), entry.depth + 1);
            debug!("Queued {} at depth {}", next.url, next.depth);
            ctx.frontier.push(next);
        }
    }
}
