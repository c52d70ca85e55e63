pub mod commands;
pub mod handlers;

pub use commands::{CLAP_STYLING, command_argument_builder};
pub use handlers::{fetcher_options_from_matches, fuzz_config_from_matches, log_filter};
