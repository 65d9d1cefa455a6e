use serde::{Deserialize, Deserializer, Serialize};

pub type Id = i64;

/// Millimeters per foot, used to turn asset widths into linear footage
pub const MM_PER_FOOT: f64 = 304.8;

/// Placeholder shown when an asset carries no usable manufacturer name
pub const UNKNOWN_MANUFACTURER: &str = "-";

/// A physical dimension as delivered by upstream data.
///
/// Decimal columns are frequently serialized as strings (`"600.00"`), so both
/// shapes are accepted. Anything that does not parse, including values of
/// any other JSON type, reads as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Dimension {
    pub fn millimeters(value: f64) -> Self {
        Dimension::Number(value)
    }

    pub fn value(&self) -> f64 {
        let value = match self {
            Dimension::Number(n) => *n,
            Dimension::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            Dimension::Other(_) => 0.0,
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

/// Read an explicit `null` the same way as an absent field
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn default_quantity() -> u32 {
    1
}

/// Quantities are one unless given
pub fn quantity_or_one<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_else(default_quantity))
}

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(count: usize, page: usize, page_size: usize, results: Vec<T>) -> Self {
        Self {
            count,
            page,
            page_size,
            total_pages: count.div_ceil(page_size.max(1)),
            results,
        }
    }
}

/// Round half away from zero to the given number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_parsing() {
        assert_eq!(Dimension::Number(600.0).value(), 600.0);
        assert_eq!(Dimension::Text("300.50".to_string()).value(), 300.5);
        assert_eq!(Dimension::Text(" 12 ".to_string()).value(), 12.0);
        assert_eq!(Dimension::Text("n/a".to_string()).value(), 0.0);
        assert_eq!(Dimension::Text(String::new()).value(), 0.0);
    }

    #[test]
    fn test_dimension_deserializes_both_shapes() {
        let number: Dimension = serde_json::from_str("600").unwrap();
        let text: Dimension = serde_json::from_str("\"600.00\"").unwrap();
        assert_eq!(number.value(), 600.0);
        assert_eq!(text.value(), 600.0);
    }

    #[test]
    fn test_dimension_of_other_json_types_reads_as_zero() {
        for raw in ["false", "{}", "[]", "[600]"] {
            let dimension: Dimension = serde_json::from_str(raw).unwrap();
            assert!(matches!(dimension, Dimension::Other(_)), "{}", raw);
            assert_eq!(dimension.value(), 0.0);
        }
    }

    #[derive(Debug, Deserialize)]
    struct Line {
        #[serde(default, deserialize_with = "null_as_default")]
        label: String,
        #[serde(default = "default_quantity", deserialize_with = "quantity_or_one")]
        quantity: u32,
    }

    #[test]
    fn test_null_fields_fall_back_to_defaults() {
        let line: Line = serde_json::from_str(r#"{"label": null, "quantity": null}"#).unwrap();
        assert_eq!(line.label, "");
        assert_eq!(line.quantity, 1);

        let line: Line = serde_json::from_str("{}").unwrap();
        assert_eq!(line.quantity, 1);

        let line: Line = serde_json::from_str(r#"{"label": "Shelf", "quantity": 4}"#).unwrap();
        assert_eq!(line.label, "Shelf");
        assert_eq!(line.quantity, 4);
    }

    #[test]
    fn test_page_counts() {
        let page = Page::new(51, 2, 25, vec![1, 2, 3]);
        assert_eq!(page.total_pages, 3);

        let empty: Page<i32> = Page::new(0, 1, 25, vec![]);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(6.889763, 2), 6.89);
        assert_eq!(round_to(87.4999, 1), 87.5);
        assert_eq!(round_to(0.0, 2), 0.0);
    }
}
