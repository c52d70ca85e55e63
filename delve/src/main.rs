use delve::command_argument_builder;
use delve::handlers::{handle_fuzz, print_banner, setup_logging};

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let log_writer = setup_logging(quiet, chosen_command.get_count("verbose"));

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("fuzz", primary_command)) => handle_fuzz(primary_command, quiet, &log_writer).await,
        // No subcommand provided, just show the banner
        None => {}
        _ => unreachable!("clap should ensure we don't get here"),
    }
}
