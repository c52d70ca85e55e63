// One navigation per token, with response metrics

use delve_scanner::{FetchedPage, PageFetcher, ScanError};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

/// Per-request measurements, used for filtering and printing then dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResponseRecord {
    pub status: u16,
    pub size_bytes: u64,
    pub word_count: usize,
    pub line_count: usize,
    pub duration_ms: u64,
}

impl ResponseRecord {
    pub fn from_content(status: u16, content: &str, duration: Duration) -> Self {
        Self {
            status,
            size_bytes: content.len() as u64,
            word_count: content.split_whitespace().count(),
            line_count: content.matches('\n').count(),
            duration_ms: duration.as_millis() as u64,
        }
    }
}

/// A completed request: its metrics and the page it returned.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub record: ResponseRecord,
    pub page: FetchedPage,
}

#[derive(Error, Debug)]
#[error("{source}")]
pub struct FetchError {
    pub url: String,
    #[source]
    pub source: ScanError,
}

pub struct RequestDispatcher<F> {
    fetcher: F,
    timeout: Duration,
}

impl<F: PageFetcher> RequestDispatcher<F> {
    pub fn new(fetcher: F, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    /// Issue exactly one navigation. A navigation with no response is status `0`.
    pub async fn fetch(&self, url: &str) -> Result<Dispatched, FetchError> {
        let start = Instant::now();
        let page = self
            .fetcher
            .goto(url, self.timeout)
            .await
            .map_err(|source| FetchError {
                url: url.to_string(),
                source,
            })?;
        let duration = start.elapsed();

        let page = page.unwrap_or_else(|| FetchedPage::new(url, 0, ""));
        let dispatched = Dispatched {
            record: ResponseRecord::from_content(page.status, &page.content, duration),
            page,
        };

        debug!(
            "{} -> {} ({} bytes, {}ms)",
            url, dispatched.record.status, dispatched.record.size_bytes, dispatched.record.duration_ms
        );
        Ok(dispatched)
    }
}
