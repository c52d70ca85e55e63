// Run parameters: raw configuration and the validated options the engine consumes

use crate::error::{FuzzError, Result};
use crate::filter::FilterChain;
use crate::passive::PassiveMiner;
use crate::rate::RateGate;
use crate::target::Target;
use crate::wordlist::load_wordlist;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_REQUESTS_PER_SECOND: f64 = 10.0;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct PassiveConfig {
    pub output: PathBuf,
    /// Seed the seen set from the output file so a rerun does not append duplicates.
    pub preload: bool,
}

/// Raw run parameters, as collected by the command line layer.
#[derive(Debug, Clone)]
pub struct FuzzConfig {
    pub target: String,
    pub wordlist_path: PathBuf,
    pub requests_per_second: f64,
    pub timeout: Duration,
    pub recursive: bool,
    pub max_depth: usize,
    pub passive: Option<PassiveConfig>,
    pub include_status: Option<String>,
    pub include_size: Option<String>,
    pub exclude_status: Option<String>,
    pub exclude_size: Option<String>,
    pub keywords: Option<String>,
    pub add_slash: bool,
    pub show_progress_bars: bool,
}

impl FuzzConfig {
    pub fn new(target: impl Into<String>, wordlist_path: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            wordlist_path: wordlist_path.into(),
            requests_per_second: DEFAULT_REQUESTS_PER_SECOND,
            timeout: DEFAULT_TIMEOUT,
            recursive: false,
            max_depth: 1,
            passive: None,
            include_status: None,
            include_size: None,
            exclude_status: None,
            exclude_size: None,
            keywords: None,
            add_slash: false,
            show_progress_bars: false,
        }
    }

    /// Check every parameter that does not need I/O.
    pub fn validate(&self) -> Result<()> {
        self.filters()?;
        Target::parse(&self.target)?;
        RateGate::per_second(self.requests_per_second)?;

        if self.max_depth == 0 {
            return Err(FuzzError::InvalidConfig(
                "max depth must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(FuzzError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    fn filters(&self) -> Result<FilterChain> {
        FilterChain::from_specs(
            self.include_status.as_deref(),
            self.include_size.as_deref(),
            self.exclude_status.as_deref(),
            self.exclude_size.as_deref(),
        )
    }

    /// Validate, then load the wordlist and open the passive output. Every startup
    /// failure surfaces here, before any request is issued.
    pub fn into_options(self) -> Result<FuzzOptions> {
        self.validate()?;
        let filters = self.filters()?;
        let target = Target::parse(&self.target)?.with_add_slash(self.add_slash);
        let rate = RateGate::per_second(self.requests_per_second)?;

        let wordlist = load_wordlist(&self.wordlist_path)?;
        info!(
            "Loaded {} words from {}",
            wordlist.len(),
            self.wordlist_path.display()
        );

        let passive = match &self.passive {
            Some(passive) => Some(PassiveMiner::open(&passive.output, passive.preload)?),
            None => None,
        };

        Ok(FuzzOptions {
            target,
            wordlist,
            rate,
            timeout: self.timeout,
            filters,
            keywords: self.keywords.as_deref().map(parse_keywords).unwrap_or_default(),
            recursive: self.recursive,
            max_depth: self.max_depth,
            passive,
            show_progress_bars: self.show_progress_bars,
        })
    }
}

/// Comma-separated literal substrings; blank entries are dropped.
pub fn parse_keywords(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Validated options for configuring a fuzz run
pub struct FuzzOptions {
    pub target: Target,
    pub wordlist: Vec<String>,
    pub rate: RateGate,
    pub timeout: Duration,
    pub filters: FilterChain,
    pub keywords: Vec<String>,
    pub recursive: bool,
    pub max_depth: usize,
    pub passive: Option<PassiveMiner>,
    pub show_progress_bars: bool,
}

impl FuzzOptions {
    /// Options with no filters, no recursion and the default rate.
    pub fn new(target: Target, wordlist: Vec<String>) -> Self {
        Self {
            target,
            wordlist,
            rate: RateGate::default(),
            timeout: DEFAULT_TIMEOUT,
            filters: FilterChain::default(),
            keywords: Vec::new(),
            recursive: false,
            max_depth: 1,
            passive: None,
            show_progress_bars: false,
        }
    }

    pub fn with_filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_recursion(mut self, max_depth: usize) -> Self {
        self.recursive = true;
        self.max_depth = max_depth;
        self
    }

    pub fn with_rate(mut self, rate: RateGate) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_passive(mut self, miner: PassiveMiner) -> Self {
        self.passive = Some(miner);
        self
    }

    /// Upper bound shown in the progress line.
    pub fn request_estimate(&self) -> u64 {
        (self.wordlist.len() * self.max_depth) as u64
    }

    /// Whether results at `depth` can still expand into a deeper level.
    pub fn recursion_active(&self, depth: usize) -> bool {
        self.recursive && depth < self.max_depth
    }
}
