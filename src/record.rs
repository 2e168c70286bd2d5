// Invoice line item record and typed field access

use eyre::{Result, eyre};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::str::FromStr;

/// One invoice line item as delivered by the data source
///
/// Every field is optional on input. Absent or `null` values become the
/// empty value so exports never see a missing cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InvoiceItem {
    #[serde(deserialize_with = "null_as_default")]
    pub item_no: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub billed_quantity: FieldValue,
    #[serde(rename = "SU", deserialize_with = "null_as_default")]
    pub su: String,
    #[serde(deserialize_with = "null_as_default")]
    pub net_value_item: FieldValue,
    #[serde(deserialize_with = "null_as_default")]
    pub material: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tax_amount: FieldValue,
}

impl InvoiceItem {
    /// Value of a single field, coerced to a `FieldValue`
    pub fn value(&self, field: Field) -> FieldValue {
        match field {
            Field::ItemNo => FieldValue::Text(self.item_no.clone()),
            Field::Description => FieldValue::Text(self.description.clone()),
            Field::BilledQuantity => self.billed_quantity.clone(),
            Field::Su => FieldValue::Text(self.su.clone()),
            Field::NetValueItem => self.net_value_item.clone(),
            Field::Material => FieldValue::Text(self.material.clone()),
            Field::TaxAmount => self.tax_amount.clone(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Columns of an invoice item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    ItemNo,
    Description,
    BilledQuantity,
    #[serde(rename = "SU")]
    Su,
    NetValueItem,
    Material,
    TaxAmount,
}

impl Field {
    /// All fields in table order
    pub const ALL: [Field; 7] = [
        Field::ItemNo,
        Field::Description,
        Field::BilledQuantity,
        Field::Su,
        Field::NetValueItem,
        Field::Material,
        Field::TaxAmount,
    ];

    /// Key used in the JSON data and as the default column header
    pub fn name(self) -> &'static str {
        match self {
            Field::ItemNo => "ItemNo",
            Field::Description => "Description",
            Field::BilledQuantity => "BilledQuantity",
            Field::Su => "SU",
            Field::NetValueItem => "NetValueItem",
            Field::Material => "Material",
            Field::TaxAmount => "TaxAmount",
        }
    }

    /// Resolve a field by key, ignoring ASCII case. Unknown keys give `None`.
    pub fn from_name(name: &str) -> Option<Field> {
        let name = name.trim();
        Field::ALL.into_iter().find(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Fields that sort and compare as numbers
    pub fn is_numeric(self) -> bool {
        matches!(self, Field::BilledQuantity | Field::NetValueItem | Field::TaxAmount)
    }

    /// Order two values of this field: numerically for numeric fields, by text otherwise
    pub fn compare(self, a: &FieldValue, b: &FieldValue) -> Ordering {
        if !self.is_numeric() {
            return a.as_text().cmp(&b.as_text());
        }

        match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            // Blank or non-numeric cells go first
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => a.as_text().cmp(&b.as_text()),
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Field {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self> {
        Field::from_name(s).ok_or_else(|| {
            eyre!(
                "Unknown field: {} (expected one of {})",
                s,
                Field::ALL.map(Field::name).join(", ")
            )
        })
    }
}

/// A cell value: numbers stay numbers, everything else is text
///
/// Numeric columns may arrive as JSON numbers or as strings; both forms are
/// kept as delivered so display and equality see the original text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Numeric reading of the value, if it has one
    ///
    /// Text is parsed as a plain decimal. Locale formatted amounts such as
    /// `19 991,00` have no numeric value here.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
        .filter(|n| n.is_finite())
    }

    /// Text form of the value, borrowed unless it is a number
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Number(n) => Cow::Owned(n.to_string()),
            FieldValue::Text(s) => Cow::Borrowed(s),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }
}

// Integral numbers go out as integers so a source `100` stays `100`
impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                serializer.serialize_i64(*n as i64)
            }
            FieldValue::Number(n) => serializer.serialize_f64(*n),
            FieldValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_mixed_numeric_forms() {
        let json = r#"{
            "ItemNo": "10",
            "Description": "Omega Soft-Hardware",
            "BilledQuantity": "3",
            "SU": "EA",
            "NetValueItem": 100,
            "Material": "M1",
            "TaxAmount": "19 991,00"
        }"#;

        let item: InvoiceItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.item_no, "10");
        assert_eq!(item.su, "EA");
        assert_eq!(item.billed_quantity, FieldValue::Text("3".to_string()));
        assert_eq!(item.net_value_item, FieldValue::Number(100.0));
        assert_eq!(item.billed_quantity.as_number(), Some(3.0));
        assert_eq!(item.tax_amount.as_number(), None);
    }

    #[test]
    fn test_missing_and_null_fields_become_empty() {
        let item: InvoiceItem = serde_json::from_str(r#"{"ItemNo": "1", "Material": null}"#).unwrap();
        assert_eq!(item.material, "");
        assert!(item.net_value_item.is_empty());
        assert_eq!(item.value(Field::TaxAmount).to_string(), "");
    }

    #[test]
    fn test_serialize_uses_source_keys() {
        let item = InvoiceItem {
            item_no: "1".to_string(),
            su: "PC".to_string(),
            net_value_item: FieldValue::Number(12.5),
            ..Default::default()
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["ItemNo"], "1");
        assert_eq!(json["SU"], "PC");
        assert_eq!(json["NetValueItem"], 12.5);
        assert_eq!(json["Description"], "");
    }

    #[test]
    fn test_integral_numbers_serialize_as_integers() {
        let item: InvoiceItem = serde_json::from_str(r#"{"NetValueItem": 100, "TaxAmount": 19.5}"#).unwrap();

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains(r#""NetValueItem":100,"#));
        assert!(json.contains(r#""TaxAmount":19.5"#));
        assert_eq!(serde_json::to_string(&FieldValue::from("100")).unwrap(), r#""100""#);
    }

    #[test]
    fn test_as_text_borrows_text() {
        let text = FieldValue::from("Router");
        assert!(matches!(text.as_text(), Cow::Borrowed("Router")));
        assert_eq!(FieldValue::Number(100.0).as_text(), "100");
    }

    #[test]
    fn test_field_from_name() {
        assert_eq!(Field::from_name("Material"), Some(Field::Material));
        assert_eq!(Field::from_name("su"), Some(Field::Su));
        assert_eq!(Field::from_name(" netvalueitem "), Some(Field::NetValueItem));
        assert_eq!(Field::from_name("Price"), None);
        assert!("Price".parse::<Field>().is_err());
        assert_eq!("TaxAmount".parse::<Field>().unwrap(), Field::TaxAmount);
    }

    #[test]
    fn test_number_display_drops_integral_fraction() {
        assert_eq!(FieldValue::Number(100.0).to_string(), "100");
        assert_eq!(FieldValue::Number(19.5).to_string(), "19.5");
        assert_eq!(FieldValue::from(7_i64).to_string(), "7");
    }

    #[test]
    fn test_compare_numeric_and_text() {
        let hundred = FieldValue::Number(100.0);
        let fifty = FieldValue::Text("50".to_string());
        assert_eq!(Field::NetValueItem.compare(&hundred, &fifty), Ordering::Greater);
        // Lexicographic for text fields: "100" < "50"
        assert_eq!(Field::ItemNo.compare(&hundred, &fifty), Ordering::Less);

        let blank = FieldValue::default();
        assert_eq!(Field::TaxAmount.compare(&blank, &fifty), Ordering::Less);
        assert_eq!(Field::TaxAmount.compare(&blank, &blank), Ordering::Equal);
    }

    #[test]
    fn test_non_finite_text_is_not_numeric() {
        assert_eq!(FieldValue::from("NaN").as_number(), None);
        assert_eq!(FieldValue::from("inf").as_number(), None);
        assert_eq!(FieldValue::from(" 4.25 ").as_number(), Some(4.25));
    }
}
