pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod filter;
pub mod frontier;
pub mod notify;
pub mod passive;
pub mod rate;
pub mod report;
pub mod target;
pub mod wordlist;

pub use config::{FuzzConfig, FuzzOptions, PassiveConfig};
pub use engine::{FuzzEngine, FuzzOutcome, FuzzResult};
pub use error::{FuzzError, Result};
pub use filter::{FilterChain, FilterSpec, FilterStage, Verdict};
pub use notify::{Notification, Notifier, WebhookNotifier};
