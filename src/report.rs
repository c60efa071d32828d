//! CSV report output.

use crate::error::Result;
use crate::fetcher::PaperRow;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Report columns, in output order
pub const REPORT_COLUMNS: &[&str] = &[
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

/// Write `rows` as CSV (header + one line per row) to `sink`.
///
/// With no rows nothing is written, not even the header.
pub fn write_csv<W: Write>(rows: &[PaperRow], sink: W) -> Result<()> {
    if rows.is_empty() {
        warn!("No papers to save.");
        return Ok(());
    }

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(sink);

    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write `rows` to a CSV file at `path`, creating or truncating it
pub fn save_csv(rows: &[PaperRow], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_csv(rows, file)?;
    if !rows.is_empty() {
        info!(path = %path.display(), count = rows.len(), "Saved papers");
    }
    Ok(())
}
