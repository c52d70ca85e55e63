use clap::{arg, command};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("delve")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("delve")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner, progress and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Increase log verbosity (-v debug, -vv trace)")
                .required(false)
                .action(clap::ArgAction::Count)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("fuzz")
                .about(
                    "Fuzz a target URL with a wordlist, optionally recursing into discovered \
                directories and mining pages for new tokens.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("Target URL. Use FUZZ to mark the injection point, otherwise words are appended as a path segment"),
                )
                .arg(
                    arg!(-w --"wordlist" <PATH>)
                        .required(true)
                        .help("Path to a newline-delimited wordlist"),
                )
                .arg(
                    arg!(--"rps" <RATE>)
                        .required(false)
                        .help("Requests per second")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(-r --"recursive")
                        .required(false)
                        .help("Recurse into paths answering 200, 301 or 302")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"max-depth" <DEPTH>)
                        .required(false)
                        .help("Maximum recursion depth (the target itself is depth 1)")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    arg!(--"filter-status" <SPEC>)
                        .required(false)
                        .help("Include only these status codes, e.g. 200,301-302"),
                )
                .arg(
                    arg!(--"filter-size" <SPEC>)
                        .required(false)
                        .help("Include only these body sizes, e.g. 0-1024"),
                )
                .arg(
                    arg!(--"exclude-status" <SPEC>)
                        .required(false)
                        .help("Exclude these status codes, e.g. 404,500-599"),
                )
                .arg(
                    arg!(--"exclude-size" <SPEC>)
                        .required(false)
                        .help("Exclude these body sizes"),
                )
                .arg(
                    arg!(-k --"keywords" <LIST>)
                        .required(false)
                        .help("Comma-separated keywords; a body containing one triggers a notification"),
                )
                .arg(
                    arg!(--"passive")
                        .required(false)
                        .help("Mine fetched pages for new tokens and append them to the passive wordlist")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"passive-output" <PATH>)
                        .required(false)
                        .help("Where mined tokens are appended")
                        .default_value("passive_wordlist.txt"),
                )
                .arg(
                    arg!(--"passive-preload")
                        .required(false)
                        .help("Skip tokens already present in the passive wordlist")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"token" <TOKEN>)
                        .required(false)
                        .help("Bearer token sent in the Authorization header"),
                )
                .arg(
                    arg!(--"burp")
                        .required(false)
                        .help("Route requests through Burp at http://127.0.0.1:8080")
                        .action(clap::ArgAction::SetTrue)
                        .conflicts_with("proxy"),
                )
                .arg(
                    arg!(--"proxy" <URL>)
                        .required(false)
                        .help("Route requests through an upstream HTTP proxy")
                        .conflicts_with("burp"),
                )
                .arg(
                    arg!(--"webhook" <URL>)
                        .required(false)
                        .visible_alias("discord-webhook")
                        .help("Discord-compatible webhook notified on matches"),
                )
                .arg(
                    arg!(--"add-slash")
                        .required(false)
                        .help("Append a trailing slash to every path-append URL")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"follow-redirects")
                        .required(false)
                        .help("Follow redirects instead of reporting 301/302 responses")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
}
