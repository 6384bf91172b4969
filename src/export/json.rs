use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::report::Report;

pub fn write<W: Write>(report: &Report, mut out: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    Ok(())
}

pub fn print(report: &Report) -> Result<()> {
    let stdout = std::io::stdout();
    write(report, stdout.lock())
}

/// Load a snapshot previously written by [`write`].
pub fn load(path: &Path) -> Result<Report> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
