// Per-field filters for querying invoice items

use crate::record::{Field, FieldValue, InvoiceItem};
use eyre::{Result, eyre};
use std::cmp::Ordering;

/// Filter for querying records
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field name to filter on
    pub field: String,
    /// Comparison operator
    pub op: FilterOp,
    /// Value to compare against
    pub value: FieldValue,
}

/// Comparison operators for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,       // ==
    Ne,       // !=
    Gt,       // >
    Lt,       // <
    Gte,      // >=
    Lte,      // <=
    Contains, // case-insensitive substring
}

impl FilterOp {
    /// Operator symbols, longest first so `>=` wins over `>`
    const SYMBOLS: [(&'static str, FilterOp); 7] = [
        ("!=", FilterOp::Ne),
        (">=", FilterOp::Gte),
        ("<=", FilterOp::Lte),
        ("=", FilterOp::Eq),
        (">", FilterOp::Gt),
        ("<", FilterOp::Lt),
        ("~", FilterOp::Contains),
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "!=",
            FilterOp::Gt => ">",
            FilterOp::Lt => "<",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
            FilterOp::Contains => "~",
        }
    }
}

impl std::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Exact match after coercing both sides to text
    pub fn equals(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    pub fn contains(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::new(field, FilterOp::Contains, value)
    }

    /// Parse `<field><op><value>`, e.g. `Material=M2` or `NetValueItem>=100`
    ///
    /// The field name is kept as written; an unknown name is not an error
    /// here and simply matches nothing when applied.
    pub fn parse(expr: &str) -> Result<Self> {
        let start = expr
            .find(['=', '!', '<', '>', '~'])
            .ok_or_else(|| eyre!("Invalid filter: {} (expected <field><op><value>)", expr))?;

        let (field, rest) = expr.split_at(start);
        let field = field.trim();
        if field.is_empty() {
            return Err(eyre!("Invalid filter: {} (missing field name)", expr));
        }

        let (symbol, op) = FilterOp::SYMBOLS
            .into_iter()
            .find(|(symbol, _)| rest.starts_with(*symbol))
            .ok_or_else(|| eyre!("Invalid filter operator in: {}", expr))?;

        Ok(Self::new(field, op, &rest[symbol.len()..]))
    }

    /// Resolved field, `None` when the name is unknown
    pub fn resolved_field(&self) -> Option<Field> {
        Field::from_name(&self.field)
    }

    /// Whether a record satisfies this filter
    pub fn matches(&self, item: &InvoiceItem) -> bool {
        let Some(field) = self.resolved_field() else {
            return false;
        };

        // Ordering a numeric column against a non-number is malformed input
        let ordering = matches!(self.op, FilterOp::Gt | FilterOp::Lt | FilterOp::Gte | FilterOp::Lte);
        if ordering && field.is_numeric() && self.value.as_number().is_none() {
            return false;
        }

        let actual = item.value(field);
        match self.op {
            FilterOp::Eq => actual.to_string() == self.value.to_string(),
            FilterOp::Ne => actual.to_string() != self.value.to_string(),
            FilterOp::Contains => contains_ignore_case(&actual.to_string(), &self.value.to_string()),
            FilterOp::Gt => field.compare(&actual, &self.value) == Ordering::Greater,
            FilterOp::Lt => field.compare(&actual, &self.value) == Ordering::Less,
            FilterOp::Gte => field.compare(&actual, &self.value) != Ordering::Less,
            FilterOp::Lte => field.compare(&actual, &self.value) != Ordering::Greater,
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.field, self.op, self.value)
    }
}

/// Case-insensitive substring test
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> InvoiceItem {
        InvoiceItem {
            item_no: "20".to_string(),
            description: "Switch".to_string(),
            material: "M2".to_string(),
            net_value_item: FieldValue::Number(50.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_creation() {
        let filter = Filter::equals("Material", "M2");

        assert_eq!(filter.field, "Material");
        assert_eq!(filter.op, FilterOp::Eq);
        assert_eq!(filter.resolved_field(), Some(Field::Material));
    }

    #[test]
    fn test_filter_op_display() {
        assert_eq!(FilterOp::Eq.to_string(), "=");
        assert_eq!(FilterOp::Ne.to_string(), "!=");
        assert_eq!(FilterOp::Gte.to_string(), ">=");
        assert_eq!(FilterOp::Contains.to_string(), "~");
    }

    #[test]
    fn test_eq_coerces_to_text() {
        assert!(Filter::equals("Material", "M2").matches(&item()));
        assert!(!Filter::equals("Material", "m2").matches(&item()));
        assert!(Filter::equals("NetValueItem", "50").matches(&item()));
        assert!(Filter::equals("NetValueItem", 50_i64).matches(&item()));
        assert!(!Filter::equals("NetValueItem", "50.00").matches(&item()));
    }

    #[test]
    fn test_unknown_field_matches_nothing() {
        assert!(!Filter::equals("Price", "50").matches(&item()));
        assert!(!Filter::new("Price", FilterOp::Ne, "x").matches(&item()));
    }

    #[test]
    fn test_comparison_ops() {
        assert!(Filter::new("NetValueItem", FilterOp::Gt, "9").matches(&item()));
        assert!(Filter::new("NetValueItem", FilterOp::Gte, "50").matches(&item()));
        assert!(!Filter::new("NetValueItem", FilterOp::Lt, "50").matches(&item()));
        assert!(Filter::new("NetValueItem", FilterOp::Lte, "50").matches(&item()));
        assert!(Filter::new("Description", FilterOp::Ne, "Router").matches(&item()));
        assert!(Filter::contains("Description", "WIT").matches(&item()));
    }

    #[test]
    fn test_ordering_against_non_number_matches_nothing() {
        for op in [FilterOp::Gt, FilterOp::Lt, FilterOp::Gte, FilterOp::Lte] {
            assert!(!Filter::new("NetValueItem", op, "abc").matches(&item()));
            assert!(!Filter::new("NetValueItem", op, "").matches(&item()));
        }
        // Text columns still order lexicographically
        assert!(Filter::new("Description", FilterOp::Gt, "Router").matches(&item()));
    }

    #[test]
    fn test_parse() {
        assert_eq!(Filter::parse("Material=M2").unwrap(), Filter::equals("Material", "M2"));
        assert_eq!(
            Filter::parse("NetValueItem>=100").unwrap(),
            Filter::new("NetValueItem", FilterOp::Gte, "100")
        );
        assert_eq!(
            Filter::parse("Description~omega soft").unwrap(),
            Filter::contains("Description", "omega soft")
        );
        assert_eq!(Filter::parse("SU!=").unwrap(), Filter::new("SU", FilterOp::Ne, ""));
        // Only the first operator splits; the rest belongs to the value
        assert_eq!(Filter::parse("Description=a=b").unwrap(), Filter::equals("Description", "a=b"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Filter::parse("Material").is_err());
        assert!(Filter::parse("=M2").is_err());
        assert!(Filter::parse("Material!M2").is_err());
    }
}
