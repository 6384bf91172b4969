use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::fmt::{format_date, money};
use crate::report::{Report, Totals};

fn totals_row(label: Cell, totals: &Totals, currency: &str) -> Vec<Cell> {
    vec![
        label,
        Cell::new(totals.count),
        Cell::new(money(totals.amount, currency)),
        Cell::new(money(totals.fee, currency)),
        Cell::new(money(totals.net, currency)),
    ]
}

pub fn render(report: &Report) -> String {
    let payout = &report.payout;
    let currency = payout.currency.as_str();

    let mut out = format!(
        "Payout {}  created {}  arrival {}  amount {}\n",
        payout.id.bold(),
        format_date(payout.created),
        format_date(payout.arrival_date),
        money(payout.amount, currency),
    );

    let mut kinds = Table::new();
    kinds.set_header(vec!["Type", "Count", "Amount", "Fee", "Net"]);
    for k in &report.by_kind {
        kinds.add_row(totals_row(Cell::new(k.kind.label()), &k.totals, currency));
    }
    kinds.add_row(totals_row(Cell::new("Total".bold()), &report.totals, currency));
    out.push_str(&format!("\nBy type\n{kinds}\n"));

    if !report.by_product.is_empty() {
        let mut products = Table::new();
        products.set_header(vec!["Product", "Count", "Amount", "Fee", "Net"]);
        for p in &report.by_product {
            products.add_row(totals_row(Cell::new(&p.product), &p.totals, currency));
        }
        out.push_str(&format!("\nBy product\n{products}\n"));
    }

    let discrepancy = report.discrepancy();
    if discrepancy != 0 {
        out.push_str(&format!(
            "\n{} {} not accounted for by transactions\n",
            "Unreconciled:".red().bold(),
            money(discrepancy, currency),
        ));
    }
    out
}

pub fn print(report: &Report) {
    print!("{}", render(report));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::sample_report;

    #[test]
    fn test_summary_mentions_kinds_and_products() {
        colored::control::set_override(false);
        let text = render(&sample_report());
        assert!(text.contains("Payout po_test"));
        assert!(text.contains("Product sale"));
        assert!(text.contains("Custom invoice"));
        assert!(!text.contains("Unreconciled"));
    }

    #[test]
    fn test_summary_flags_discrepancy() {
        colored::control::set_override(false);
        let mut report = sample_report();
        report.payout.amount += 100;
        assert!(render(&report).contains("1.00 EUR not accounted for"));
    }
}
