mod classifier;
mod cli;
mod error;
mod export;
mod fmt;
mod models;
mod report;
mod settings;
mod stripe;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

const LOG_FILTER_VAR: &str = "PAYOUT_REPORT_LOG";

fn main() {
    let cli = Cli::parse();

    // .env may carry the API key and the log filter
    dotenvy::dotenv().ok();
    init_logging(cli.verbose);

    if let Err(e) = cli::run::run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_FILTER_VAR)
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,payout_report={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
