use delve_scanner::ScanError;
use thiserror::Error;

/// Startup failures. Anything in here aborts the run before the first request.
#[derive(Error, Debug)]
pub enum FuzzError {
    #[error("Malformed filter spec '{spec}': {reason}")]
    MalformedFilterSpec { spec: String, reason: String },

    #[error("Invalid target URL '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Wordlist error: {0}")]
    Wordlist(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Client(#[from] ScanError),
}

pub type Result<T> = std::result::Result<T, FuzzError>;
