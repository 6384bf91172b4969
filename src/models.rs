//! Report data model. Amounts are integers in the currency's minor unit,
//! timestamps are Unix seconds.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub id: String,
    pub created: i64,
    pub arrival_date: i64,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    TopUp,
    ProductSale,
    Other,
}

impl TransactionKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TopUp => "Top-up",
            Self::ProductSale => "Product sale",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: String,
    pub quantity: u64,
    pub unit_amount: i64,
    pub amount_total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub created: i64,
    /// Provider balance type: charge, payment, refund, adjustment, ...
    #[serde(rename = "type")]
    pub balance_type: String,
    pub amount: i64,
    pub fee: i64,
    pub net: i64,
    pub currency: String,
    pub kind: TransactionKind,
    pub product: Option<String>,
    #[serde(default)]
    pub customer: Customer,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}
