use anyhow::Context;
use colored::Colorize;

use super::{poll, summary, Cli, OutputOptions};
use crate::export::{self, json, xlsx};
use crate::report::Report;
use crate::settings::{load_settings, ApiKey};
use crate::stripe::{self, PayoutSelector, StripeClient};

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let output = OutputOptions::from(&cli);

    if let Some(path) = &cli.json {
        let report = json::load(path)
            .with_context(|| format!("failed to load report data from {}", path.display()))?;
        return emit(&report, &output);
    }

    let selector = match cli.payout {
        Some(id) => PayoutSelector::Id(id),
        None => PayoutSelector::Latest(cli.poll.unwrap_or(1)),
    };

    let settings = load_settings()?;
    let api_key = ApiKey::from_env(&settings)?;
    let client = StripeClient::new(api_key, &settings.api_base)?;

    let mut payouts = selector.resolve(&client)?;
    let payout = if payouts.len() == 1 {
        payouts.pop()
    } else {
        poll::choose_payout(payouts)?
    };
    let Some(payout) = payout else {
        return Ok(());
    };

    let id = payout.id.clone();
    let report = stripe::fetch_report(&client, payout, &settings.topup_label)
        .with_context(|| format!("failed to build report for payout {id}"))?;
    emit(&report, &output)
}

fn emit(report: &Report, output: &OutputOptions) -> anyhow::Result<()> {
    let discrepancy = report.discrepancy();
    if discrepancy != 0 {
        tracing::warn!(
            payout = %report.payout.id,
            discrepancy,
            "payout total does not match the sum of transaction nets"
        );
    }

    if output.summary_only() {
        summary::print(report);
        return Ok(());
    }

    // the workbook goes first: a failed write must not leave JSON on stdout
    if output.excel {
        let path = export::output_path(output.name.as_deref(), &report.payout.id);
        xlsx::save(report, &path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!("{} {}", "Wrote".green(), path.display());
    }

    if output.print_json {
        json::print(report)?;
    }
    Ok(())
}
