//! Text rendering for `roster` output.

use std::fmt::Write;

use crate::record::CandidateRecord;
use crate::roster::ADDED_MESSAGE;
use crate::validate::FieldErrors;

use super::OutputFormat;

/// Printed instead of an empty listing.
pub const EMPTY_LISTING: &str = "No Record Found";

const TABLE_HEADERS: [&str; 6] = ["S.No", "Full Name", "Job Role", "Email", "Qualification", "Id"];

/// Render records in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_records(
    records: &[CandidateRecord],
    format: OutputFormat,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(records),
        _ if records.is_empty() => Ok(EMPTY_LISTING.to_string()),
        OutputFormat::Table => Ok(render_table(records)),
        OutputFormat::Plain => Ok(render_plain(records)),
    }
}

/// One line per record: serial number, name, email, role and id.
#[must_use]
pub fn render_plain(records: &[CandidateRecord]) -> String {
    let mut out = String::new();
    for (index, record) in records.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} <{}> - {} [{}]",
            index + 1,
            record.fields.full_name,
            record.fields.email,
            record.fields.job_role,
            record.id
        );
    }
    out
}

/// An aligned table with a header row, numbered from 1.
#[must_use]
pub fn render_table(records: &[CandidateRecord]) -> String {
    let rows: Vec<[String; 6]> = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            [
                (index + 1).to_string(),
                record.fields.full_name.clone(),
                record.fields.job_role.clone(),
                record.fields.email.clone(),
                record.fields.qualification.clone(),
                record.id.to_string(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            // Long free-text cells are not wrapped.
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, &TABLE_HEADERS, &widths);
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Summary printed by `roster add` once a record is stored.
///
/// JSON output is the stored record alone, so it can be piped.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_added(record: &CandidateRecord, json: bool) -> serde_json::Result<String> {
    if json {
        serde_json::to_string_pretty(record)
    } else {
        Ok(format!("{ADDED_MESSAGE} Id: {}", record.id))
    }
}

/// One indented `field: message` line per failed field.
#[must_use]
pub fn render_field_errors(errors: &FieldErrors) -> String {
    let mut out = String::new();
    for (field, message) in errors.iter() {
        let _ = writeln!(out, "  {field}: {message}");
    }
    out
}
