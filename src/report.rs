use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{LineItem, Payout, Transaction, TransactionKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub count: usize,
    pub amount: i64,
    pub fee: i64,
    pub net: i64,
}

impl Totals {
    fn add(&mut self, txn: &Transaction) {
        self.count += 1;
        self.amount += txn.amount;
        self.fee += txn.fee;
        self.net += txn.net;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindSubtotal {
    pub kind: TransactionKind,
    #[serde(flatten)]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSubtotal {
    pub product: String,
    #[serde(flatten)]
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatLineItem {
    pub transaction_id: String,
    #[serde(flatten)]
    pub item: LineItem,
}

/// Read-only view over one payout. Only `payout` and `transactions` are read
/// back from a snapshot; everything else is derived from them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Snapshot")]
pub struct Report {
    pub payout: Payout,
    pub transactions: Vec<Transaction>,
    pub totals: Totals,
    pub by_kind: Vec<KindSubtotal>,
    pub by_product: Vec<ProductSubtotal>,
    pub line_items: Vec<FlatLineItem>,
}

#[derive(Deserialize)]
struct Snapshot {
    payout: Payout,
    transactions: Vec<Transaction>,
}

impl From<Snapshot> for Report {
    fn from(s: Snapshot) -> Self {
        Report::build(s.payout, s.transactions)
    }
}

impl Report {
    pub fn build(payout: Payout, transactions: Vec<Transaction>) -> Self {
        let mut totals = Totals::default();
        let mut kinds: BTreeMap<TransactionKind, Totals> = BTreeMap::new();
        let mut products: BTreeMap<String, Totals> = BTreeMap::new();
        let mut line_items = Vec::new();

        for txn in &transactions {
            totals.add(txn);
            kinds.entry(txn.kind).or_default().add(txn);
            products.entry(product_label(txn)).or_default().add(txn);
            line_items.extend(txn.line_items.iter().map(|item| FlatLineItem {
                transaction_id: txn.id.clone(),
                item: item.clone(),
            }));
        }

        Report {
            payout,
            transactions,
            totals,
            by_kind: kinds
                .into_iter()
                .map(|(kind, totals)| KindSubtotal { kind, totals })
                .collect(),
            by_product: products
                .into_iter()
                .map(|(product, totals)| ProductSubtotal { product, totals })
                .collect(),
            line_items,
        }
    }

    /// Payout total minus the summed transaction nets. Zero when the payout
    /// is fully accounted for.
    pub fn discrepancy(&self) -> i64 {
        self.payout.amount - self.totals.net
    }

    /// Rows the spreadsheet emits: one per line item, or one for a
    /// transaction without any.
    pub fn sheet_row_count(&self) -> usize {
        self.transactions
            .iter()
            .map(|t| t.line_items.len().max(1))
            .sum()
    }
}

fn product_label(txn: &Transaction) -> String {
    txn.product
        .clone()
        .unwrap_or_else(|| txn.kind.label().to_string())
}
