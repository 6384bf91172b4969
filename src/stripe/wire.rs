//! Stripe response shapes, limited to the fields the report reads.

use serde::Deserialize;

use crate::models;

#[derive(Debug, Clone, Deserialize)]
pub struct List<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

/// List entries whose id can be passed back as `starting_after`.
pub trait Cursor {
    fn cursor(&self) -> &str;
}

#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Payout {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub created: i64,
    pub arrival_date: i64,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<Payout> for models::Payout {
    fn from(p: Payout) -> Self {
        models::Payout {
            id: p.id,
            created: p.created,
            arrival_date: p.arrival_date,
            amount: p.amount,
            currency: p.currency,
            status: p.status,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceTransaction {
    pub id: String,
    pub amount: i64,
    pub fee: i64,
    pub net: i64,
    pub currency: String,
    pub created: i64,
    #[serde(rename = "type")]
    pub balance_type: String,
    #[serde(default)]
    pub source: Option<Source>,
}

impl BalanceTransaction {
    /// Payment intent behind this transaction, when the source was expanded
    /// and carries one.
    pub fn payment_intent(&self) -> Option<&str> {
        match &self.source {
            Some(Source::Expanded(obj)) => obj.payment_intent.as_deref(),
            _ => None,
        }
    }
}

impl Cursor for BalanceTransaction {
    fn cursor(&self) -> &str {
        &self.id
    }
}

/// `source` is a bare id unless the request asked for it to be expanded.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Expanded(SourceObject),
    Id(#[allow(dead_code)] String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceObject {
    #[serde(default)]
    pub payment_intent: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub payment_link: Option<String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub line_items: Option<List<CheckoutLineItem>>,
}

impl CheckoutSession {
    pub fn items(&self) -> &[CheckoutLineItem] {
        self.line_items.as_ref().map(|l| l.data.as_slice()).unwrap_or(&[])
    }

    /// Expanded line items stop at the first page; the rest must be listed
    /// separately.
    pub fn has_more_items(&self) -> bool {
        self.line_items.as_ref().is_some_and(|l| l.has_more)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutLineItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<u64>,
    #[serde(default)]
    pub amount_subtotal: i64,
    #[serde(default)]
    pub amount_total: i64,
    #[serde(default)]
    pub price: Option<Price>,
}

impl Cursor for CheckoutLineItem {
    fn cursor(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    #[serde(default)]
    pub unit_amount: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_transaction_with_expanded_charge() {
        let json = r#"{
            "id": "txn_1",
            "object": "balance_transaction",
            "amount": 1000,
            "fee": 54,
            "net": 946,
            "currency": "eur",
            "created": 1700000000,
            "type": "charge",
            "source": {"id": "ch_1", "object": "charge", "payment_intent": "pi_1"}
        }"#;
        let txn: BalanceTransaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.balance_type, "charge");
        assert_eq!(txn.payment_intent(), Some("pi_1"));
    }

    #[test]
    fn test_balance_transaction_with_bare_source() {
        let json = r#"{
            "id": "txn_2", "amount": -1000, "fee": 0, "net": -1000,
            "currency": "eur", "created": 1700000000, "type": "payout",
            "source": "po_1"
        }"#;
        let txn: BalanceTransaction = serde_json::from_str(json).unwrap();
        assert!(matches!(txn.source, Some(Source::Id(_))));
        assert_eq!(txn.payment_intent(), None);
    }

    #[test]
    fn test_checkout_session_list_with_line_items() {
        let json = r#"{
            "object": "list",
            "has_more": false,
            "data": [{
                "id": "cs_1",
                "payment_link": "plink_1",
                "customer_details": {"name": "Ada", "email": "ada@example.com"},
                "line_items": {"object": "list", "has_more": false, "data": [
                    {"description": "Membership", "quantity": 2, "amount_subtotal": 3000,
                     "amount_total": 3000, "price": {"unit_amount": 1500}}
                ]}
            }]
        }"#;
        let list: List<CheckoutSession> = serde_json::from_str(json).unwrap();
        let session = &list.data[0];
        assert_eq!(session.payment_link.as_deref(), Some("plink_1"));
        assert_eq!(session.items().len(), 1);
        assert_eq!(session.items()[0].quantity, Some(2));
    }

    #[test]
    fn test_session_without_line_items() {
        let session: CheckoutSession = serde_json::from_str(r#"{"id": "cs_2"}"#).unwrap();
        assert!(session.items().is_empty());
        assert!(session.customer_details.is_none());
        assert!(!session.has_more_items());
    }

    #[test]
    fn test_truncated_line_items_are_flagged() {
        let json = r#"{
            "id": "cs_3",
            "line_items": {"object": "list", "has_more": true, "data": [
                {"id": "li_1", "description": "Membership", "quantity": 1,
                 "amount_subtotal": 1000, "amount_total": 1000}
            ]}
        }"#;
        let session: CheckoutSession = serde_json::from_str(json).unwrap();
        assert!(session.has_more_items());
        assert_eq!(session.items()[0].cursor(), "li_1");
    }
}
