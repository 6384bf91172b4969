pub mod poll;
pub mod run;
pub mod summary;

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser};

#[derive(Parser, Debug)]
#[command(
    name = "payout-report",
    version,
    about = "Build reports of Stripe payouts as JSON or spreadsheets."
)]
#[command(group(ArgGroup::new("source").required(true).args(["poll", "payout", "json"])))]
pub struct Cli {
    /// Fetch the latest N payouts and choose one to report on
    #[arg(short = 's', long = "poll", value_name = "N")]
    pub poll: Option<usize>,
    /// Payout ID to report on
    #[arg(short, long, value_name = "ID")]
    pub payout: Option<String>,
    /// Load report data from a saved JSON file instead of calling Stripe
    #[arg(short, long, value_name = "PATH")]
    pub json: Option<PathBuf>,
    /// Print the report as JSON to stdout
    #[arg(short = 'c', long = "print-json")]
    pub print_json: bool,
    /// Write the report to a spreadsheet
    #[arg(short = 'x', long = "excel")]
    pub excel: bool,
    /// Spreadsheet file name (default: Report_{PayoutId}.xlsx)
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub print_json: bool,
    pub excel: bool,
    pub name: Option<String>,
}

impl OutputOptions {
    /// Neither output flag given: show the terminal summary instead.
    pub fn summary_only(&self) -> bool {
        !self.print_json && !self.excel
    }
}

impl From<&Cli> for OutputOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            print_json: cli.print_json,
            excel: cli.excel,
            name: cli.name.clone(),
        }
    }
}
