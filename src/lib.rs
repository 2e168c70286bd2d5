// InvoiceTable - Search, filter, sort and export invoice line items

pub mod config;
pub mod export;
pub mod filter;
pub mod jsonl;
pub mod query;
pub mod record;
pub mod store;

// Re-export main types for convenience
pub use config::Config;
pub use export::{DEFAULT_DELIMITER, DEFAULT_EXPORT_FILE, ExportColumn, invoice_columns, to_delimited_text, write_export};
pub use filter::{Filter, FilterOp};
pub use query::{QueryEngine, QuerySpec, SortDirection, SortSpec};
pub use record::{Field, FieldValue, InvoiceItem};
pub use store::RecordStore;
