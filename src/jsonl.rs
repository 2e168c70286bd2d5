// Loading invoice items from JSON and JSONL files

use crate::record::InvoiceItem;
use eyre::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// Read a file holding a single JSON array of items
pub fn read_json_array(path: &Path) -> Result<Vec<InvoiceItem>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let records: Vec<InvoiceItem> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON array in {}", path.display()))?;

    info!(file = ?path, count = records.len(), "Loaded records from JSON");

    Ok(records)
}

/// Read a JSON-lines file, one item per line, in file order
///
/// Blank lines are ignored. Lines that cannot be read or parsed are skipped
/// with a warning.
pub fn read_jsonl(path: &Path) -> Result<Vec<InvoiceItem>> {
    let file = File::open(path).with_context(|| format!("Failed to open JSONL file {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<InvoiceItem>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse JSON, skipping"
                );
            }
        }
    }

    info!(file = ?path, count = records.len(), "Loaded records from JSONL");

    Ok(records)
}
