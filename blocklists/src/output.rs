//! Shared output formatting for conversion reports.
//!
//! Provides JSON and plain-text formatters for `ConversionReport`.
//! Color/terminal formatting belongs to the CLI layer.

use std::io::Write;

use crate::report::ConversionReport;

/// Errors from the report formatters.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Format a `ConversionReport` as JSON to a writer.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json(
    report: &ConversionReport,
    writer: &mut dyn Write,
) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(report)?;
    writeln!(writer, "{json}")?;
    Ok(())
}

/// Format a `ConversionReport` as human-readable plain text to a writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human(
    report: &ConversionReport,
    writer: &mut dyn Write,
) -> Result<(), OutputError> {
    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer, "  DEN BLOCKLISTS")?;
    writeln!(writer, "{}", "=".repeat(80))?;
    writeln!(writer)?;
    writeln!(writer, "  Lists processed:  {}", report.total())?;
    writeln!(writer, "  Lists converted:  {}", report.succeeded())?;
    writeln!(writer, "  Lists failed:     {}", report.failed())?;
    writeln!(writer, "  Over rule limit:  {}", report.over_limit())?;
    writeln!(writer, "  Rules converted:  {}", report.converted_rules())?;
    writeln!(writer)?;

    writeln!(writer, "{}", "-".repeat(80))?;
    for result in report.manifest.results() {
        let status = if result.succeeded() { "ok" } else { "FAILED" };
        let limit = if result.over_limit { " (over limit)" } else { "" };
        writeln!(
            writer,
            "  {:<32} {:>6}  {:>8} rules  {:>6} errors{limit}",
            result.id, status, result.converted_count, result.errors_count
        )?;
    }
    writeln!(writer, "{}", "-".repeat(80))?;

    if !report.entry_errors.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "  ERRORS")?;
        for error in &report.entry_errors {
            writeln!(writer, "{}", error.format_human_readable())?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(80))?;
    if report.ok() {
        writeln!(writer, "All {} lists converted", report.total())?;
    } else {
        writeln!(
            writer,
            "{} of {} lists failed; the manifest records them with zero counts",
            report.failed(),
            report.total()
        )?;
    }
    writeln!(writer, "{}", "=".repeat(80))?;

    Ok(())
}
