use crate::error::{ReportError, Result};
use crate::models::{Customer, LineItem, Transaction, TransactionKind};
use crate::stripe::wire::{BalanceTransaction, CheckoutLineItem, CheckoutSession};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: TransactionKind,
    pub product: Option<String>,
    pub customer: Customer,
    pub line_items: Vec<LineItem>,
}

/// Decide what a payment was for from the checkout sessions behind its
/// payment intent.
///
/// - no purchasable line items: top-up
/// - a payment link session with items: product sale, items resolved
/// - anything else: other
pub fn classify(payment_intent: Option<&str>, sessions: &[CheckoutSession]) -> Result<Classification> {
    if sessions.len() > 1 {
        return Err(ReportError::AmbiguousSession(
            payment_intent.unwrap_or("(unknown)").to_string(),
        ));
    }

    let Some(session) = sessions.first() else {
        return Ok(top_up(Customer::default()));
    };
    tracing::debug!(session = %session.id, payment_link = ?session.payment_link, "classifying");
    if session.has_more_items() {
        return Err(ReportError::IncompleteLineItems(session.id.clone()));
    }

    let customer = session
        .customer_details
        .as_ref()
        .map(|c| Customer {
            name: c.name.clone(),
            email: c.email.clone(),
        })
        .unwrap_or_default();

    let items: Vec<&CheckoutLineItem> = session
        .items()
        .iter()
        .filter(|item| item.quantity.unwrap_or(1) > 0)
        .collect();
    let Some(first) = items.first() else {
        return Ok(top_up(customer));
    };
    let product = first.description.clone();

    if session.payment_link.is_some() {
        Ok(Classification {
            kind: TransactionKind::ProductSale,
            product,
            customer,
            line_items: items.into_iter().map(line_item).collect(),
        })
    } else {
        Ok(Classification {
            kind: TransactionKind::Other,
            product,
            customer,
            line_items: Vec::new(),
        })
    }
}

fn top_up(customer: Customer) -> Classification {
    Classification {
        kind: TransactionKind::TopUp,
        product: None,
        customer,
        line_items: Vec::new(),
    }
}

fn line_item(item: &CheckoutLineItem) -> LineItem {
    let quantity = item.quantity.unwrap_or(1);
    let unit_amount = item
        .price
        .as_ref()
        .and_then(|p| p.unit_amount)
        .unwrap_or_else(|| item.amount_subtotal / quantity.max(1) as i64);
    LineItem {
        product: item
            .description
            .clone()
            .unwrap_or_else(|| "Unnamed product".to_string()),
        quantity,
        unit_amount,
        amount_total: item.amount_total,
    }
}

/// Classify a balance transaction and turn it into a report row.
///
/// Refunds and other negative entries share the sale's payment intent, so
/// they keep its kind and label but not its line items: the items were
/// already listed on the sale.
pub fn annotate(
    txn: &BalanceTransaction,
    sessions: &[CheckoutSession],
    topup_label: &str,
) -> Result<Transaction> {
    let c = classify(txn.payment_intent(), sessions)?;
    let product = match c.kind {
        TransactionKind::TopUp => Some(topup_label.to_string()),
        _ => c.product,
    };
    let line_items = if txn.amount < 0 { Vec::new() } else { c.line_items };

    Ok(Transaction {
        id: txn.id.clone(),
        created: txn.created,
        balance_type: txn.balance_type.clone(),
        amount: txn.amount,
        fee: txn.fee,
        net: txn.net,
        currency: txn.currency.clone(),
        kind: c.kind,
        product,
        customer: c.customer,
        line_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stripe::tests::{balance_txn, session};
    use crate::stripe::wire;

    #[test]
    fn test_no_session_is_top_up() {
        let c = classify(Some("pi_1"), &[]).unwrap();
        assert_eq!(c.kind, TransactionKind::TopUp);
        assert!(c.line_items.is_empty());
        assert_eq!(c.customer, Customer::default());
    }

    #[test]
    fn test_session_without_items_is_top_up() {
        let s = session(Some("plink_1"), &[]);
        let c = classify(Some("pi_1"), &[s]).unwrap();
        assert_eq!(c.kind, TransactionKind::TopUp);
        assert_eq!(c.customer.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_zero_quantity_items_are_not_purchasable() {
        let s = session(Some("plink_1"), &[("Ghost", 0, 500)]);
        let c = classify(Some("pi_1"), &[s]).unwrap();
        assert_eq!(c.kind, TransactionKind::TopUp);
    }

    #[test]
    fn test_payment_link_preserves_quantities_and_prices() {
        let s = session(Some("plink_1"), &[("Membership", 3, 1250), ("Sticker", 1, 99)]);
        let c = classify(Some("pi_1"), &[s]).unwrap();
        assert_eq!(c.kind, TransactionKind::ProductSale);
        assert_eq!(c.product.as_deref(), Some("Membership"));
        assert_eq!(
            c.line_items,
            vec![
                LineItem { product: "Membership".into(), quantity: 3, unit_amount: 1250, amount_total: 3750 },
                LineItem { product: "Sticker".into(), quantity: 1, unit_amount: 99, amount_total: 99 },
            ]
        );
    }

    #[test]
    fn test_unit_price_falls_back_to_subtotal() {
        let mut s = session(Some("plink_1"), &[("Bundle", 4, 300)]);
        if let Some(list) = s.line_items.as_mut() {
            list.data[0].price = None;
        }
        let c = classify(Some("pi_1"), &[s]).unwrap();
        assert_eq!(c.line_items[0].unit_amount, 300);
    }

    #[test]
    fn test_items_without_payment_link_are_other() {
        let s = session(None, &[("Custom invoice", 1, 4000)]);
        let c = classify(Some("pi_1"), &[s]).unwrap();
        assert_eq!(c.kind, TransactionKind::Other);
        assert_eq!(c.product.as_deref(), Some("Custom invoice"));
        assert!(c.line_items.is_empty());
    }

    #[test]
    fn test_multiple_sessions_rejected() {
        let sessions = vec![session(None, &[]), session(None, &[])];
        let err = classify(Some("pi_dup"), &sessions).unwrap_err();
        assert!(matches!(err, ReportError::AmbiguousSession(ref pi) if pi == "pi_dup"));
    }

    #[test]
    fn test_truncated_line_items_rejected() {
        let mut s = session(Some("plink_1"), &[("Membership", 1, 1000)]);
        if let Some(list) = s.line_items.as_mut() {
            list.has_more = true;
        }
        let err = classify(Some("pi_1"), &[s]).unwrap_err();
        assert!(matches!(err, ReportError::IncompleteLineItems(ref id) if id == "cs_test"));
    }

    #[test]
    fn test_refund_keeps_kind_but_not_items() {
        let s = session(Some("plink_1"), &[("Membership", 2, 1000)]);
        let sale = annotate(&balance_txn("txn_1", "charge", 2000, 60, Some("pi_1")), &[s.clone()], "Top-up").unwrap();
        let refund = annotate(&balance_txn("txn_2", "refund", -2000, 0, Some("pi_1")), &[s], "Top-up").unwrap();

        assert_eq!(sale.line_items.len(), 1);
        assert_eq!(refund.kind, TransactionKind::ProductSale);
        assert_eq!(refund.product.as_deref(), Some("Membership"));
        assert!(refund.line_items.is_empty());
        assert_eq!(refund.net, -2000);
    }

    #[test]
    fn test_annotate_labels_top_ups() {
        let txn = balance_txn("txn_1", "charge", 1000, 50, Some("pi_1"));
        let row = annotate(&txn, &[], "SudoSOS Topup").unwrap();
        assert_eq!(row.kind, TransactionKind::TopUp);
        assert_eq!(row.product.as_deref(), Some("SudoSOS Topup"));
        assert_eq!(row.net, 950);
        assert_eq!(row.balance_type, "charge");
    }

    #[test]
    fn test_annotate_without_source() {
        let mut txn = balance_txn("txn_2", "adjustment", -300, 0, None);
        txn.source = Some(wire::Source::Id("adj_1".to_string()));
        let row = annotate(&txn, &[], "Top-up").unwrap();
        assert_eq!(row.kind, TransactionKind::TopUp);
        assert!(row.line_items.is_empty());
    }
}
