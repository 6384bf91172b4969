use std::path::Path;

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::Result;
use crate::fmt::{currency_exponent, format_date, format_timestamp, to_major};
use crate::models::Transaction;
use crate::report::{Report, Totals};

pub const TRANSACTIONS_SHEET: &str = "Transactions";
pub const SUMMARY_SHEET: &str = "Summary";

const TRANSACTION_HEADERS: [&str; 14] = [
    "id", "created", "type", "kind", "amount", "fee", "net", "currency", "product", "quantity",
    "unit_price", "line_total", "name", "email",
];
const SUBTOTAL_HEADERS: [&str; 5] = ["", "count", "amount", "fee", "net"];

struct Formats {
    header: Format,
    cents: Format,
    whole: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
            cents: Format::new().set_num_format("#,##0.00"),
            whole: Format::new().set_num_format("#,##0"),
        }
    }

    fn money(&self, currency: &str) -> &Format {
        if currency_exponent(currency) == 0 {
            &self.whole
        } else {
            &self.cents
        }
    }
}

fn major(minor: i64, currency: &str) -> f64 {
    to_major(minor, currency).to_f64().unwrap_or_default()
}

/// Render the workbook in memory.
pub fn render(report: &Report) -> Result<Vec<u8>> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name(TRANSACTIONS_SHEET)?;
    write_transactions(sheet, report, &formats)?;
    sheet.autofit();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SUMMARY_SHEET)?;
    write_summary(sheet, report, &formats)?;
    sheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

/// Write the workbook to `path` in a single write, so a failure leaves no
/// partial spreadsheet behind.
pub fn save(report: &Report, path: &Path) -> Result<()> {
    let bytes = render(report)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    tracing::info!(path = %path.display(), rows = report.sheet_row_count(), "spreadsheet written");
    Ok(())
}

fn write_transactions(sheet: &mut Worksheet, report: &Report, f: &Formats) -> Result<()> {
    for (col, title) in TRANSACTION_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &f.header)?;
    }

    let mut row: u32 = 1;
    for txn in &report.transactions {
        write_transaction_cells(sheet, row, txn, f)?;
        if txn.line_items.is_empty() {
            if let Some(product) = &txn.product {
                sheet.write_string(row, 8, product.as_str())?;
            }
            row += 1;
            continue;
        }

        for (i, item) in txn.line_items.iter().enumerate() {
            if i > 0 {
                sheet.write_string(row, 0, txn.id.as_str())?;
            }
            let money = f.money(&txn.currency);
            sheet.write_string(row, 8, item.product.as_str())?;
            sheet.write_number(row, 9, item.quantity as f64)?;
            sheet.write_number_with_format(row, 10, major(item.unit_amount, &txn.currency), money)?;
            sheet.write_number_with_format(row, 11, major(item.amount_total, &txn.currency), money)?;
            row += 1;
        }
    }
    Ok(())
}

/// Transaction-level columns. Only written on a transaction's first row so
/// amounts are never counted twice.
fn write_transaction_cells(sheet: &mut Worksheet, row: u32, txn: &Transaction, f: &Formats) -> Result<()> {
    let money = f.money(&txn.currency);
    sheet.write_string(row, 0, txn.id.as_str())?;
    sheet.write_string(row, 1, format_timestamp(txn.created).as_str())?;
    sheet.write_string(row, 2, txn.balance_type.as_str())?;
    sheet.write_string(row, 3, txn.kind.label())?;
    sheet.write_number_with_format(row, 4, major(txn.amount, &txn.currency), money)?;
    sheet.write_number_with_format(row, 5, major(txn.fee, &txn.currency), money)?;
    sheet.write_number_with_format(row, 6, major(txn.net, &txn.currency), money)?;
    sheet.write_string(row, 7, txn.currency.to_uppercase().as_str())?;
    if let Some(name) = &txn.customer.name {
        sheet.write_string(row, 12, name.as_str())?;
    }
    if let Some(email) = &txn.customer.email {
        sheet.write_string(row, 13, email.as_str())?;
    }
    Ok(())
}

fn write_summary(sheet: &mut Worksheet, report: &Report, f: &Formats) -> Result<()> {
    let payout = &report.payout;
    let currency = payout.currency.as_str();

    sheet.write_string_with_format(0, 0, "Payout", &f.header)?;
    sheet.write_string(0, 1, payout.id.as_str())?;
    sheet.write_string(1, 0, "Created")?;
    sheet.write_string(1, 1, format_date(payout.created).as_str())?;
    sheet.write_string(2, 0, "Arrival")?;
    sheet.write_string(2, 1, format_date(payout.arrival_date).as_str())?;
    sheet.write_string(3, 0, "Amount")?;
    sheet.write_number_with_format(3, 1, major(payout.amount, currency), f.money(currency))?;
    sheet.write_string(4, 0, "Currency")?;
    sheet.write_string(4, 1, currency.to_uppercase().as_str())?;
    if let Some(status) = &payout.status {
        sheet.write_string(5, 0, "Status")?;
        sheet.write_string(5, 1, status.as_str())?;
    }

    let mut row = 7;
    write_subtotal_header(sheet, row, "kind", f)?;
    row += 1;
    for k in &report.by_kind {
        write_subtotal_row(sheet, row, k.kind.label(), &k.totals, currency, f)?;
        row += 1;
    }
    write_subtotal_row(sheet, row, "Total", &report.totals, currency, f)?;
    row += 2;

    write_subtotal_header(sheet, row, "product", f)?;
    row += 1;
    for p in &report.by_product {
        write_subtotal_row(sheet, row, &p.product, &p.totals, currency, f)?;
        row += 1;
    }

    if report.discrepancy() != 0 {
        row += 1;
        sheet.write_string_with_format(row, 0, "Unreconciled", &f.header)?;
        sheet.write_number_with_format(row, 4, major(report.discrepancy(), currency), f.money(currency))?;
    }
    Ok(())
}

fn write_subtotal_header(sheet: &mut Worksheet, row: u32, first: &str, f: &Formats) -> Result<()> {
    for (col, title) in SUBTOTAL_HEADERS.iter().enumerate() {
        let title = if col == 0 { first } else { *title };
        sheet.write_string_with_format(row, col as u16, title, &f.header)?;
    }
    Ok(())
}

fn write_subtotal_row(
    sheet: &mut Worksheet,
    row: u32,
    label: &str,
    totals: &Totals,
    currency: &str,
    f: &Formats,
) -> Result<()> {
    let money = f.money(currency);
    sheet.write_string(row, 0, label)?;
    sheet.write_number(row, 1, totals.count as f64)?;
    sheet.write_number_with_format(row, 2, major(totals.amount, currency), money)?;
    sheet.write_number_with_format(row, 3, major(totals.fee, currency), money)?;
    sheet.write_number_with_format(row, 4, major(totals.net, currency), money)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use calamine::{open_workbook_auto, Data, Reader};

    use super::*;
    use crate::error::ReportError;
    use crate::report::tests::sample_report;

    #[test]
    fn test_one_row_per_transaction_or_line_item() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Report_po_test.xlsx");
        let report = sample_report();
        save(&report, &path).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec![TRANSACTIONS_SHEET, SUMMARY_SHEET]);

        let range = workbook.worksheet_range(TRANSACTIONS_SHEET).unwrap();
        // header + 3 plain transactions + 2 line items
        assert_eq!(range.height(), 1 + report.sheet_row_count());
        assert_eq!(range.height(), 6);
        assert_eq!(range.width(), TRANSACTION_HEADERS.len());
    }

    #[test]
    fn test_amounts_in_major_units() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        save(&sample_report(), &path).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range(TRANSACTIONS_SHEET).unwrap();
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("txn_topup".into())));
        assert_eq!(range.get_value((1, 4)), Some(&Data::Float(20.0)));
        assert_eq!(range.get_value((1, 5)), Some(&Data::Float(0.6)));
        assert_eq!(range.get_value((1, 8)), Some(&Data::String("Top-up".into())));

        // second line item of the product sale
        assert_eq!(range.get_value((3, 0)), Some(&Data::String("txn_sale".into())));
        assert_eq!(range.get_value((3, 8)), Some(&Data::String("Sticker".into())));
        assert_eq!(range.get_value((3, 9)), Some(&Data::Float(1.0)));
        assert_eq!(range.get_value((3, 10)), Some(&Data::Float(0.99)));
        assert_eq!(range.get_value((3, 4)), Some(&Data::Empty));
    }

    #[test]
    fn test_summary_sheet_lists_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        save(&sample_report(), &path).unwrap();

        let mut workbook = open_workbook_auto(&path).unwrap();
        let range = workbook.worksheet_range(SUMMARY_SHEET).unwrap();
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("po_test".into())));
        assert_eq!(range.get_value((8, 0)), Some(&Data::String("Top-up".into())));
        assert_eq!(range.get_value((8, 1)), Some(&Data::Float(2.0)));
    }

    #[test]
    fn test_unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let err = save(&sample_report(), &blocker.join("out.xlsx")).unwrap_err();
        assert!(matches!(err, ReportError::Io(_)));
    }
}
