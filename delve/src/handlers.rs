use clap::ArgMatches;
use colored::Colorize;
use delve_core::config::PassiveConfig;
use delve_core::report::generate_fuzz_report;
use delve_core::{FuzzConfig, FuzzEngine, WebhookNotifier};
use delve_scanner::{FetcherOptions, HttpFetcher};
use indicatif::ProgressBar;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

pub const BURP_PROXY: &str = "http://127.0.0.1:8080";

/// Log directives for the `-q` / `-v` flags.
pub fn log_filter(quiet: bool, verbosity: u8) -> &'static str {
    if quiet {
        // Only show errors
        return "error";
    }
    match verbosity {
        0 => "delve=info,warn",
        1 => "delve=debug,info",
        2 => "delve=trace,debug",
        _ => "trace",
    }
}

/// Stderr log sink that hides the attached spinner while a line is written.
#[derive(Clone, Default)]
pub struct LogWriter {
    bar: Arc<Mutex<Option<ProgressBar>>>,
}

impl LogWriter {
    pub fn attach(&self, bar: Option<ProgressBar>) {
        if let Ok(mut slot) = self.bar.lock() {
            *slot = bar;
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let bar = self.bar.lock().ok().and_then(|slot| slot.clone());
        match bar {
            Some(pb) => pb.suspend(|| io::stderr().write_all(buf))?,
            None => io::stderr().write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for LogWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub fn setup_logging(quiet: bool, verbosity: u8) -> LogWriter {
    let writer = LogWriter::default();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_filter(quiet, verbosity)))
        .with_writer(writer.clone())
        .with_target(false)
        .init();
    writer
}

pub fn print_banner() {
    println!(
        "{}",
        r#"
     _      _
  __| | ___| |_   _____
 / _` |/ _ \ \ \ / / _ \
| (_| |  __/ |\ V /  __/
 \__,_|\___|_| \_/ \___|
"#
        .bright_cyan()
        .bold()
    );
    println!(
        "  {} {}\n",
        "recursive content discovery".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

/// Collect the `fuzz` subcommand arguments. Nothing is validated here; that
/// happens once in [`FuzzConfig::into_options`].
pub fn fuzz_config_from_matches(sub_matches: &ArgMatches, show_progress_bars: bool) -> FuzzConfig {
    let target = sub_matches
        .get_one::<String>("url")
        .cloned()
        .unwrap_or_default();
    let wordlist = sub_matches
        .get_one::<String>("wordlist")
        .map(|w| expand_path(w))
        .unwrap_or_default();

    let mut config = FuzzConfig::new(target, wordlist);
    if let Some(rps) = sub_matches.get_one::<f64>("rps") {
        config.requests_per_second = *rps;
    }
    if let Some(timeout) = sub_matches.get_one::<u64>("timeout") {
        config.timeout = Duration::from_secs(*timeout);
    }
    if let Some(max_depth) = sub_matches.get_one::<usize>("max-depth") {
        config.max_depth = *max_depth;
    }
    config.recursive = sub_matches.get_flag("recursive");
    config.add_slash = sub_matches.get_flag("add-slash");
    config.show_progress_bars = show_progress_bars;

    config.include_status = sub_matches.get_one::<String>("filter-status").cloned();
    config.include_size = sub_matches.get_one::<String>("filter-size").cloned();
    config.exclude_status = sub_matches.get_one::<String>("exclude-status").cloned();
    config.exclude_size = sub_matches.get_one::<String>("exclude-size").cloned();
    config.keywords = sub_matches.get_one::<String>("keywords").cloned();

    if sub_matches.get_flag("passive") {
        let output = sub_matches
            .get_one::<String>("passive-output")
            .map(|p| expand_path(p))
            .unwrap_or_else(|| PathBuf::from("passive_wordlist.txt"));
        config.passive = Some(PassiveConfig {
            output,
            preload: sub_matches.get_flag("passive-preload"),
        });
    }

    config
}

pub fn fetcher_options_from_matches(sub_matches: &ArgMatches) -> FetcherOptions {
    let proxy = if sub_matches.get_flag("burp") {
        Some(BURP_PROXY.to_string())
    } else {
        sub_matches.get_one::<String>("proxy").cloned()
    };

    FetcherOptions {
        bearer_token: sub_matches.get_one::<String>("token").cloned(),
        proxy,
        follow_redirects: sub_matches.get_flag("follow-redirects"),
        user_agent: None,
    }
}

fn or_label(value: Option<&str>, label: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(label)
        .to_string()
}

/// The `:: Key : value` block echoed before a run.
pub fn format_run_config(config: &FuzzConfig, proxy: Option<&str>) -> String {
    let mut lines = vec![
        " :: Method           : GET".to_string(),
        format!(" :: URL              : {}", config.target),
        format!(" :: Wordlist         : {}", config.wordlist_path.display()),
        format!(" :: Timeout          : {}", config.timeout.as_secs()),
        format!(" :: Threads(RPS)     : {}", config.requests_per_second),
        format!(
            " :: Include Status   : {}",
            or_label(config.include_status.as_deref(), "All")
        ),
        format!(
            " :: Exclude Status   : {}",
            or_label(config.exclude_status.as_deref(), "None")
        ),
        format!(
            " :: Include Size     : {}",
            or_label(config.include_size.as_deref(), "All")
        ),
        format!(
            " :: Exclude Size     : {}",
            or_label(config.exclude_size.as_deref(), "None")
        ),
        format!(" :: Recursive        : {}", config.recursive),
        format!(" :: Max Depth        : {}", config.max_depth),
    ];
    if let Some(keywords) = &config.keywords {
        lines.push(format!(" :: Keywords         : {}", keywords));
    }
    if let Some(passive) = &config.passive {
        lines.push(format!(
            " :: Passive Output   : {}",
            passive.output.display()
        ));
    }
    if let Some(proxy) = proxy {
        lines.push(format!(" :: Proxy            : {}", proxy));
    }

    format!("{}\n", lines.join("\n"))
}

pub async fn handle_fuzz(sub_matches: &ArgMatches, quiet: bool, log_writer: &LogWriter) {
    let config = fuzz_config_from_matches(sub_matches, !quiet);
    let fetcher_options = fetcher_options_from_matches(sub_matches);

    if !quiet {
        println!(
            "{}",
            format_run_config(&config, fetcher_options.proxy.as_deref())
                .cyan()
                .bold()
        );
    }

    let options = match config.into_options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    };

    let fetcher = match HttpFetcher::new(&fetcher_options) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("✗ Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let notifier = match sub_matches.get_one::<String>("webhook") {
        Some(url) => match WebhookNotifier::new(url.as_str()) {
            Ok(notifier) => Some(notifier),
            Err(e) => {
                eprintln!("✗ Failed to build webhook client: {}", e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    if let Some(proxy) = &fetcher_options.proxy {
        info!("Routing requests through proxy at {}", proxy);
    }

    let engine = FuzzEngine::new(options, fetcher, notifier);
    log_writer.attach(engine.progress_bar());
    let outcome = engine.run().await;
    log_writer.attach(None);

    println!("\n{} Fuzz complete!", "✓".green().bold());
    if outcome.passive_tokens > 0 {
        println!(
            "{} {} new tokens mined",
            "✓".green().bold(),
            outcome.passive_tokens.to_string().cyan()
        );
    }

    print!("{}", generate_fuzz_report(&outcome.results, &outcome.counters));
}
