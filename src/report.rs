//! Text rendering of a coverage run
//!
//! Per-file summary lines look like
//! `[traces/vlc.json], [93.41], [10472], [85.71], [56]`, and the ranked
//! table is an aligned grid with one column per program.

use crate::cli::OutputFormat;
use crate::csv_output::CsvTableOutput;
use crate::json_output::JsonOutput;
use crate::pipeline::{FileReport, RunReport};
use crate::rank::RankedTable;
use std::io::{self, Write};

/// Placeholder for percentages of empty traces
pub const NOT_APPLICABLE: &str = "N/A";

/// Header printed above the summary lines
pub const SUMMARY_HEADER: &str = "filename, coverage of all syscalls, total syscalls called, \
coverage of unique syscalls, total unique syscalls called";

/// Summary line for one file
pub fn format_summary_line(file: &FileReport) -> String {
    let path = file.path.display();
    match &file.coverage {
        Some(stats) => format!(
            "[{}], [{:.2}], [{}], [{:.2}], [{}]",
            path,
            stats.coverage_percent,
            stats.total,
            stats.unique_coverage_percent,
            stats.unique_total
        ),
        None => format!(
            "[{}], [{}], [0], [{}], [0]",
            path, NOT_APPLICABLE, NOT_APPLICABLE
        ),
    }
}

/// Display width of a cell
fn cell_width(text: &str) -> usize {
    text.chars().count()
}

/// Aligned text table of per-program counts
///
/// A table without rows renders as the header line alone.
pub fn format_table(table: &RankedTable, program_labels: &[String]) -> String {
    let labels: Vec<String> = table.rows.iter().map(|row| row.label().into_owned()).collect();
    let name_width = labels
        .iter()
        .map(|label| cell_width(label))
        .chain(std::iter::once(cell_width("syscall")))
        .max()
        .unwrap_or(0);

    let mut widths: Vec<usize> = program_labels.iter().map(|label| cell_width(label)).collect();
    for row in &table.rows {
        for (width, count) in widths.iter_mut().zip(&row.counts) {
            *width = (*width).max(cell_width(&count.to_string()));
        }
    }
    let total_width = table
        .rows
        .iter()
        .map(|row| cell_width(&row.total().to_string()))
        .chain(std::iter::once(cell_width("total")))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("{:<name_width$}", "syscall"));
    for (label, width) in program_labels.iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", label, width = *width));
    }
    out.push_str(&format!("  {:>total_width$}\n", "total"));

    for (row, label) in table.rows.iter().zip(&labels) {
        out.push_str(&format!("{:<name_width$}", label));
        for (count, width) in row.counts.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", count, width = *width));
        }
        out.push_str(&format!("  {:>total_width$}\n", row.total()));
    }

    out
}

/// Write the header and one summary line per file
pub fn write_summary<W: Write>(out: &mut W, report: &RunReport) -> io::Result<()> {
    writeln!(out, "{}", SUMMARY_HEADER)?;
    for file in &report.files {
        writeln!(out, "{}", format_summary_line(file))?;
    }
    Ok(())
}

/// Write the report in the requested format
///
/// Text carries the summary lines and the ranked table. CSV carries only
/// the ranked table so the stream stays a single CSV document; callers
/// wanting the summary alongside it use [`write_summary`] on another stream.
pub fn write_report<W: Write>(out: &mut W, report: &RunReport, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            write_summary(out, report)?;
            writeln!(out)?;
            if report.distinct_unresolved == 0 {
                return writeln!(out, "No unresolved syscalls.");
            }
            writeln!(
                out,
                "Top {} of {} unresolved syscalls:",
                report.table.len(),
                report.distinct_unresolved
            )?;
            write!(out, "{}", format_table(&report.table, &report.program_labels))
        }
        OutputFormat::Csv => {
            let csv = CsvTableOutput::new(&report.table, &report.program_labels);
            write!(out, "{}", csv.to_csv())
        }
        OutputFormat::Json => {
            let json = JsonOutput::from_report(report);
            let text = json.to_json().map_err(io::Error::other)?;
            writeln!(out, "{}", text)
        }
    }
}
