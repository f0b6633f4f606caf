use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A candidate item pulled off one receipt line, prior to validation.
/// May still carry OCR noise; the validator decides whether it survives.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLineItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

/// A validated line item — the unit of the scanner's output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: Option<String>,
    pub unit: Option<String>,
}

impl BillItem {
    /// Key used to collapse duplicate extractions of the same line.
    pub fn dedup_key(&self) -> (String, Decimal) {
        (self.name.to_lowercase(), self.price.round_dp(2))
    }
}

impl From<ParsedLineItem> for BillItem {
    fn from(item: ParsedLineItem) -> Self {
        BillItem {
            name: item.name,
            price: item.price,
            quantity: item.quantity,
            unit: item.unit,
        }
    }
}

impl fmt::Display for BillItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.quantity, &self.unit) {
            (Some(q), Some(u)) => write!(f, "{} ({q} {u}) {:.2}", self.name, self.price),
            (Some(q), None) => write!(f, "{} (x{q}) {:.2}", self.name, self.price),
            _ => write!(f, "{} {:.2}", self.name, self.price),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn item(name: &str, price: &str) -> BillItem {
        BillItem {
            name: name.to_string(),
            price: Decimal::from_str(price).unwrap(),
            quantity: None,
            unit: None,
        }
    }

    #[test]
    fn dedup_key_lowercases_name() {
        let a = item("Modern Milk", "30.00");
        let b = item("MODERN MILK", "30.00");
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn dedup_key_rounds_to_two_places() {
        let a = item("Milk", "1.234");
        let b = item("Milk", "1.23");
        assert_eq!(a.dedup_key(), b.dedup_key());
        let c = item("Milk", "1.24");
        assert_ne!(a.dedup_key(), c.dedup_key());
    }

    #[test]
    fn display_includes_quantity_and_unit() {
        let mut it = item("Bread", "1.15");
        it.quantity = Some("2".to_string());
        it.unit = Some("each".to_string());
        assert_eq!(it.to_string(), "Bread (2 each) 1.15");
    }

    #[test]
    fn serializes_with_decimal_price() {
        let json = serde_json::to_string(&item("Milk", "30.00")).unwrap();
        assert!(json.contains("\"30.00\""), "got {json}");
    }
}
