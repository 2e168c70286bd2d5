// In-memory record store holding the session's invoice items

use crate::jsonl;
use crate::record::InvoiceItem;
use eyre::{Result, eyre};
use std::path::Path;
use tracing::{debug, info};

/// Source collection of invoice items, in load order
///
/// The store is read-only for queries and exports. `load` replaces the
/// whole collection and needs `&mut self`, so there is only ever one writer.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<InvoiceItem>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a data file
    ///
    /// `.jsonl` files are read line by line; anything else must hold a JSON array.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(eyre!("Data file not found: {}", path.display()));
        }

        let records = match path.extension().and_then(|s| s.to_str()) {
            Some("jsonl") => jsonl::read_jsonl(path)?,
            _ => jsonl::read_json_array(path)?,
        };

        let mut store = Self::new();
        store.load(records);
        Ok(store)
    }

    /// Replace the current contents
    ///
    /// Records are accepted as given; field consistency is the caller's concern.
    pub fn load(&mut self, records: Vec<InvoiceItem>) {
        debug!(previous = self.records.len(), "load: replacing records");
        self.records = records;
        info!(count = self.records.len(), "Record store loaded");
    }

    /// Current records in load order
    pub fn snapshot(&self) -> &[InvoiceItem] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by item number (first match)
    pub fn get(&self, item_no: &str) -> Option<&InvoiceItem> {
        self.records.iter().find(|r| r.item_no == item_no)
    }
}

impl From<Vec<InvoiceItem>> for RecordStore {
    fn from(records: Vec<InvoiceItem>) -> Self {
        Self { records }
    }
}
