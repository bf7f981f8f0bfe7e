//! Local CSV export of rows already on screen. No network, no reformatting of
//! values beyond quoting.

use chrono::NaiveDate;
use std::{fs, io, path::Path};

/// Quotes a field when it contains a delimiter, a quote or a line break.
#[must_use]
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Header line plus one line per row, joined with `\n`, no trailing newline.
#[must_use]
pub fn csv_document<I>(header: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut lines = vec![header.join(",")];
    lines.extend(rows.into_iter().map(|row| {
        row.iter()
            .map(|field| csv_field(field))
            .collect::<Vec<_>>()
            .join(",")
    }));
    lines.join("\n")
}

/// `<prefix>-YYYY-MM-DD.csv`
#[must_use]
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}.csv", date.format("%Y-%m-%d"))
}

/// Writes an export, creating the parent directory if needed.
///
/// # Errors
/// Returns the I/O error from creating the directory or writing the file.
pub fn write_export(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

/// Renders an optional number, empty when absent.
#[must_use]
pub fn optional_number(value: Option<f64>) -> String {
    value.map(|value| value.to_string()).unwrap_or_default()
}
