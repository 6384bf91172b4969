pub mod client;
pub mod wire;

use std::collections::BTreeMap;

use crate::classifier;
use crate::error::{ReportError, Result};
use crate::models::Payout;
use crate::report::Report;

pub use client::StripeClient;

/// Read-only view of the payments provider used to assemble a report.
pub trait PaymentsApi {
    /// Newest payouts first.
    fn list_payouts(&self, limit: usize) -> Result<Vec<wire::Payout>>;

    fn retrieve_payout(&self, id: &str) -> Result<wire::Payout>;

    /// Every balance transaction settled by the payout, across all pages.
    fn payout_balance_transactions(&self, payout_id: &str) -> Result<Vec<wire::BalanceTransaction>>;

    /// Checkout sessions that produced a payment intent, each with its
    /// complete list of line items.
    fn checkout_sessions(&self, payment_intent: &str) -> Result<Vec<wire::CheckoutSession>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayoutSelector {
    Id(String),
    Latest(usize),
}

impl PayoutSelector {
    pub fn resolve<A: PaymentsApi + ?Sized>(&self, api: &A) -> Result<Vec<Payout>> {
        let payouts = match self {
            Self::Id(id) => vec![api.retrieve_payout(id)?],
            Self::Latest(0) => Vec::new(),
            Self::Latest(n) => api.list_payouts(*n)?,
        };
        if payouts.is_empty() {
            return Err(ReportError::NotFound("no payouts found".to_string()));
        }
        Ok(payouts.into_iter().map(Payout::from).collect())
    }
}

/// Fetch the payout's transactions, resolve checkout sessions and build the
/// report. Costs one request per distinct payment intent, which makes payouts
/// with many transactions slow.
pub fn fetch_report<A: PaymentsApi + ?Sized>(
    api: &A,
    payout: Payout,
    topup_label: &str,
) -> Result<Report> {
    let balance: Vec<wire::BalanceTransaction> = api
        .payout_balance_transactions(&payout.id)?
        .into_iter()
        .filter(|t| t.balance_type != "payout")
        .collect();
    tracing::info!(payout = %payout.id, transactions = balance.len(), "fetched balance transactions");

    let mut sessions: BTreeMap<String, Vec<wire::CheckoutSession>> = BTreeMap::new();
    for intent in balance.iter().filter_map(|t| t.payment_intent()) {
        if !sessions.contains_key(intent) {
            tracing::debug!(intent, "resolving checkout sessions");
            sessions.insert(intent.to_string(), api.checkout_sessions(intent)?);
        }
    }

    let transactions = balance
        .iter()
        .map(|txn| {
            let found = txn
                .payment_intent()
                .and_then(|intent| sessions.get(intent))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            classifier::annotate(txn, found, topup_label)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Report::build(payout, transactions))
}
