use std::io::{self, BufRead, Write};

use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::{format_date, money};
use crate::models::Payout;

pub fn payout_table(payouts: &[Payout]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Created", "Arrival", "Amount", "Status", "ID"]);
    for (i, p) in payouts.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format_date(p.created)),
            Cell::new(format_date(p.arrival_date)),
            Cell::new(money(p.amount, &p.currency)),
            Cell::new(p.status.as_deref().unwrap_or("")),
            Cell::new(&p.id),
        ]);
    }
    table
}

/// List the payouts and ask which one to report on. The listing and prompt go
/// to stderr so stdout stays clean for JSON output.
pub fn choose_payout(payouts: Vec<Payout>) -> Result<Option<Payout>> {
    let stdin = io::stdin();
    let stderr = io::stderr();
    let mut out = stderr.lock();
    writeln!(out, "Latest payouts\n{}", payout_table(&payouts))?;

    let choice = prompt_choice(&mut stdin.lock(), &mut out, payouts.len())?;
    Ok(choice.and_then(|n| payouts.into_iter().nth(n - 1)))
}

/// Read a 1-based choice in `1..=count`. `0` or end of input means no choice.
pub fn prompt_choice<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    count: usize,
) -> io::Result<Option<usize>> {
    loop {
        write!(output, "Enter the number of the payout to generate a report (0 to exit): ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            Ok(0) => return Ok(None),
            Ok(n) if n <= count => return Ok(Some(n)),
            Ok(_) => writeln!(output, "Invalid choice. Enter a number between 0 and {count}.")?,
            Err(_) => writeln!(output, "Invalid input. Please enter a valid number.")?,
        }
    }
}
