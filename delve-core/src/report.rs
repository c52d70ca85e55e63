// Run counters, live progress line and the end-of-run report

use crate::dispatch::ResponseRecord;
use crate::engine::FuzzResult;
use crate::frontier::FrontierEntry;
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

/// Process-lifetime counters for one run.
#[derive(Debug, Clone, Copy)]
pub struct RunCounters {
    pub total_requests: u64,
    pub total_errors: u64,
    pub start_time: Instant,
}

impl RunCounters {
    pub fn start() -> Self {
        Self {
            total_requests: 0,
            total_errors: 0,
            start_time: Instant::now(),
        }
    }

    pub fn record_success(&mut self) {
        self.total_requests += 1;
    }

    pub fn record_error(&mut self) {
        self.total_requests += 1;
        self.total_errors += 1;
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let elapsed = self.start_time.elapsed();
        let secs = elapsed.as_secs_f64();
        ProgressSnapshot {
            requests: self.total_requests,
            errors: self.total_errors,
            elapsed,
            rate: if secs > 0.0 {
                self.total_requests as f64 / secs
            } else {
                0.0
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub requests: u64,
    pub errors: u64,
    pub elapsed: Duration,
    pub rate: f64,
}

/// `H:MM:SS`, whole seconds.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

pub fn format_progress(snapshot: &ProgressSnapshot, estimate: u64) -> String {
    format!(
        ":: Progress: [{}/{}] :: Job [1/1] :: {} req/sec :: Duration: [{}] :: Errors: {} ::",
        snapshot.requests,
        estimate,
        snapshot.rate as u64,
        format_elapsed(snapshot.elapsed),
        snapshot.errors
    )
}

pub fn colorize_status(status: u16) -> ColoredString {
    let text = status.to_string();
    match status {
        200..=299 => text.green(),
        300..=399 => text.cyan(),
        400..=499 => text.yellow(),
        500..=599 => text.red(),
        _ => text.magenta(),
    }
}

pub fn format_result_line(word: &str, record: &ResponseRecord) -> String {
    format!(
        "{:<24} [Status: {}, Size: {}, Words: {}, Lines: {}, Duration: {}ms]",
        word,
        colorize_status(record.status),
        record.size_bytes,
        record.word_count,
        record.line_count,
        record.duration_ms
    )
}

pub fn format_error_line(word: &str, cause: &dyn std::fmt::Display) -> String {
    format!("{:<24} [Error: {}]", word, cause)
}

pub fn format_keyword_line(word: &str, keyword: &str, record: &ResponseRecord) -> String {
    format!(
        "{:<24} [Keyword: {}, Status: {}, Size: {}]",
        word,
        keyword.magenta().bold(),
        colorize_status(record.status),
        record.size_bytes
    )
}

pub fn format_depth_banner(entry: &FrontierEntry) -> String {
    format!("\nStarting fuzz at depth {}: {}", entry.depth, entry.url)
        .cyan()
        .bold()
        .to_string()
}

/// Result lines go above the progress spinner when one is shown, otherwise to stdout.
pub struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new(show_progress_bar: bool) -> Self {
        let bar = show_progress_bar.then(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message("Starting fuzz...");
            pb
        });
        Self { bar }
    }

    /// Handle to the live spinner, for writers that must draw around it.
    pub fn bar(&self) -> Option<ProgressBar> {
        self.bar.clone()
    }

    pub fn println(&self, line: impl AsRef<str>) {
        match &self.bar {
            Some(pb) => pb.println(line.as_ref()),
            None => println!("{}", line.as_ref()),
        }
    }

    pub fn update(&self, snapshot: &ProgressSnapshot, estimate: u64) {
        if let Some(pb) = &self.bar {
            pb.set_message(format_progress(snapshot, estimate));
            pb.tick();
        }
    }

    pub fn finish(&self, snapshot: &ProgressSnapshot, estimate: u64) {
        if let Some(pb) = &self.bar {
            pb.finish_with_message(format_progress(snapshot, estimate));
        }
    }
}

/// Generate the end-of-run report, grouping accepted results by status code.
pub fn generate_fuzz_report(results: &[FuzzResult], summary: &ProgressSnapshot) -> String {
    let mut report = String::new();

    let mut by_status: BTreeMap<u16, Vec<&FuzzResult>> = BTreeMap::new();
    for result in results {
        by_status.entry(result.record.status).or_default().push(result);
    }

    report.push_str("\n═══════════════════════════════════════════════════════════════════════════════\n");
    report.push_str("                            FUZZ RESULTS\n");
    report.push_str("═══════════════════════════════════════════════════════════════════════════════\n\n");

    report.push_str(&format!("Total findings: {}\n", results.len()));
    report.push_str(&format!("Requests: {}\n", summary.requests));
    report.push_str(&format!("Errors: {}\n", summary.errors));
    report.push_str(&format!("Duration: {}\n\n", format_elapsed(summary.elapsed)));

    for (status_code, status_results) in by_status {
        let status_label = match status_code {
            200..=299 => format!("[{}] Success", status_code),
            300..=399 => format!("[{}] Redirect", status_code),
            400..=499 => format!("[{}] Client Error", status_code),
            500..=599 => format!("[{}] Server Error", status_code),
            _ => format!("[{}]", status_code),
        };

        report.push_str(&format!("{} ({} findings)\n", status_label, status_results.len()));
        report.push_str("───────────────────────────────────────────────────────────────────────────────\n");

        for result in status_results {
            report.push_str(&format!(
                "  {} ({} bytes, depth {})\n",
                result.url, result.record.size_bytes, result.depth
            ));
        }
        report.push('\n');
    }

    report.push_str("═══════════════════════════════════════════════════════════════════════════════\n");
    report.push_str("                            End of Report\n");
    report.push_str("═══════════════════════════════════════════════════════════════════════════════\n");

    report
}
