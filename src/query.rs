// Search, filter and sort over a record store snapshot

use crate::filter::{Filter, contains_ignore_case};
use crate::record::{Field, FieldValue, InvoiceItem};
use crate::store::RecordStore;
use eyre::{Result, eyre};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Fields searched by free text unless configured otherwise
pub const DEFAULT_SEARCH_FIELDS: [Field; 2] = [Field::Description, Field::Material];

/// One search/filter/sort request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpec {
    /// Free-text term matched against the searchable fields
    pub search: Option<String>,
    /// Explicit filters, all of which must hold
    pub filters: Vec<Filter>,
    pub sort: Option<SortSpec>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(SortSpec {
            field: field.into(),
            direction,
        });
        self
    }

    /// Search term if one is set and not empty
    fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(eyre!("Invalid sort direction: {} (expected asc or desc)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    /// Field name to sort on
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Parse `<field>[:asc|:desc]`; direction defaults to ascending
    pub fn parse(expr: &str) -> Result<Self> {
        let (field, direction) = match expr.split_once(':') {
            Some((field, direction)) => (field.trim(), direction.parse()?),
            None => (expr.trim(), SortDirection::Ascending),
        };

        if field.is_empty() {
            return Err(eyre!("Invalid sort: {} (missing field name)", expr));
        }

        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

/// Computes ordered views of a record store
///
/// The engine holds only configuration and the size of the latest result,
/// so it can be shared across threads and called concurrently.
#[derive(Debug)]
pub struct QueryEngine {
    search_fields: Vec<Field>,
    last_count: AtomicUsize,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::with_search_fields(DEFAULT_SEARCH_FIELDS.to_vec())
    }
}

impl QueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine searching the given fields instead of the defaults
    pub fn with_search_fields(search_fields: Vec<Field>) -> Self {
        Self {
            search_fields,
            last_count: AtomicUsize::new(0),
        }
    }

    pub fn search_fields(&self) -> &[Field] {
        &self.search_fields
    }

    /// Number of records returned by the most recent `apply`
    pub fn last_count(&self) -> usize {
        self.last_count.load(Ordering::Relaxed)
    }

    /// Compute the ordered view for `spec`
    ///
    /// Search keeps a record when any searchable field contains the term,
    /// ignoring case. Filters then all have to hold. Sorting is stable, and
    /// descending order reverses the comparison, not the ties. Unknown
    /// field names match nothing in filters and leave order unchanged in
    /// sorts. The store is never modified.
    pub fn apply(&self, store: &RecordStore, spec: &QuerySpec) -> Vec<InvoiceItem> {
        let term = spec.search_term();

        let mut results: Vec<InvoiceItem> = store
            .snapshot()
            .iter()
            .filter(|item| term.is_none_or(|t| self.matches_search(item, t)))
            .filter(|item| spec.filters.iter().all(|f| f.matches(item)))
            .cloned()
            .collect();

        if let Some(sort) = &spec.sort {
            results = sort_records(results, sort);
        }

        debug!(
            total = store.len(),
            matched = results.len(),
            filters = spec.filters.len(),
            "apply: query complete"
        );

        self.last_count.store(results.len(), Ordering::Relaxed);
        results
    }

    fn matches_search(&self, item: &InvoiceItem, term: &str) -> bool {
        self.search_fields
            .iter()
            .any(|field| contains_ignore_case(&item.value(*field).to_string(), term))
    }
}

/// Stable sort by one field; unknown fields leave the order as is
fn sort_records(records: Vec<InvoiceItem>, sort: &SortSpec) -> Vec<InvoiceItem> {
    let Some(field) = Field::from_name(&sort.field) else {
        debug!(field = %sort.field, "sort_records: unknown field, keeping order");
        return records;
    };

    let mut keyed: Vec<(FieldValue, InvoiceItem)> = records.into_iter().map(|r| (r.value(field), r)).collect();

    // sort_by is stable, so ties keep their relative order in both directions
    match sort.direction {
        SortDirection::Ascending => keyed.sort_by(|(a, _), (b, _)| field.compare(a, b)),
        SortDirection::Descending => keyed.sort_by(|(a, _), (b, _)| field.compare(b, a)),
    }

    keyed.into_iter().map(|(_, r)| r).collect()
}
