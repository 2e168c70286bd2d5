// Delimited text export of invoice items

use crate::record::{Field, InvoiceItem};
use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_DELIMITER: char = ',';

/// File name the shell saves exports under unless told otherwise
pub const DEFAULT_EXPORT_FILE: &str = "invoice_items.csv";

/// One exported column: which field, and the label in the header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportColumn {
    pub name: Field,
    pub header: String,
}

impl ExportColumn {
    pub fn new(name: Field, header: impl Into<String>) -> Self {
        Self {
            name,
            header: header.into(),
        }
    }

    /// Parse a comma-separated column list such as `ItemNo:ID,Description`
    ///
    /// Each entry is `<field>` or `<field>:<header>`; without a header the
    /// field name is used.
    pub fn parse_list(spec: &str) -> Result<Vec<Self>> {
        spec.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                let (name, header) = match entry.split_once(':') {
                    Some((name, header)) => (name.trim(), Some(header.trim())),
                    None => (entry, None),
                };
                let field = name.parse::<Field>().wrap_err_with(|| format!("Invalid export column: {}", entry))?;
                Ok(Self::new(field, header.unwrap_or(field.name())))
            })
            .collect()
    }
}

impl From<Field> for ExportColumn {
    fn from(field: Field) -> Self {
        Self::new(field, field.name())
    }
}

/// All invoice fields, headed by their own names, for spreadsheet exports
pub fn invoice_columns() -> Vec<ExportColumn> {
    Field::ALL.into_iter().map(ExportColumn::from).collect()
}

/// Serialize records to delimited text
///
/// The header row carries the column labels as given. Every data cell is
/// wrapped in double quotes with inner quotes doubled, and every line ends
/// with `\n`. No records, or no columns, produce an empty string.
pub fn to_delimited_text(records: &[InvoiceItem], columns: &[ExportColumn], delimiter: char) -> String {
    if records.is_empty() || columns.is_empty() {
        return String::new();
    }

    let separator = delimiter.to_string();
    let mut out = String::new();

    let header: Vec<&str> = columns.iter().map(|c| c.header.as_str()).collect();
    out.push_str(&header.join(&separator));
    out.push('\n');

    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|c| quote(&record.value(c.name).to_string()))
            .collect();
        out.push_str(&row.join(&separator));
        out.push('\n');
    }

    debug!(
        rows = records.len(),
        columns = columns.len(),
        bytes = out.len(),
        "to_delimited_text: serialized"
    );

    out
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Save exported text to `path`, replacing any existing file
pub fn write_export(path: &Path, content: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(eyre!("Export path cannot be empty"));
    }

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .with_context(|| format!("Failed to open export file {}", path.display()))?;

    // Acquire exclusive lock before truncating so concurrent writers don't interleave
    file.lock_exclusive().context("Failed to acquire file lock")?;

    file.set_len(0)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    info!(file = ?path, bytes = content.len(), "Export written");

    // Lock is automatically released when file is dropped
    Ok(())
}
