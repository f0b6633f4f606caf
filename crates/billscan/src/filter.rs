//! Output hygiene: duplicate collapse and the over-extraction cap.

use std::collections::HashSet;

use homeboard_core::{plausibility_score, BillItem};

/// Upper bound on items per scan. A smudged receipt can manufacture dozens of
/// spurious line matches; anything past this is not human-reviewable anyway.
pub const MAX_ITEMS: usize = 20;

/// Keep the first occurrence of each `(lowercased name, rounded price)` pair.
pub fn dedup(items: Vec<BillItem>) -> Vec<BillItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.dedup_key()))
        .collect()
}

/// When more than [`MAX_ITEMS`] survive, keep the most word-like names.
/// The sort is stable, so equally scored items stay in parse order.
pub fn cap_outliers(items: Vec<BillItem>) -> Vec<BillItem> {
    if items.len() <= MAX_ITEMS {
        return items;
    }
    let mut scored: Vec<(f32, BillItem)> = items
        .into_iter()
        .map(|item| (plausibility_score(&item.name), item))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(MAX_ITEMS);
    scored.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
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
    fn dedup_keeps_first_occurrence() {
        let out = dedup(vec![
            item("Milk", "30.00"),
            item("Bread", "25.00"),
            item("MILK", "30.00"),
            item("Milk", "30.004"),
        ]);
        let names: Vec<&str> = out.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Milk", "Bread"]);
    }

    #[test]
    fn same_name_different_price_is_not_a_duplicate() {
        let out = dedup(vec![item("Milk", "30.00"), item("Milk", "32.00")]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn cap_leaves_small_lists_untouched_in_order() {
        let items: Vec<BillItem> =
            (0..MAX_ITEMS).map(|i| item(&format!("Item {i}"), "1.00")).collect();
        let out = cap_outliers(items.clone());
        assert_eq!(out, items);
    }

    #[test]
    fn cap_keeps_the_most_word_like_twenty() {
        // 22 clean names plus 3 noisy ones: the noisy ones must go first.
        let mut items: Vec<BillItem> =
            (0..22).map(|i| item(&format!("Item Number {i}"), "1.00")).collect();
        items.push(item("x9 41 7a", "2.00"));
        items.push(item("q2 88 1z", "2.00"));
        items.push(item("m0 55 3k", "2.00"));
        let out = cap_outliers(items);
        assert_eq!(out.len(), MAX_ITEMS);
        assert!(out.iter().all(|i| i.name.starts_with("Item Number")));
    }

    #[test]
    fn cap_is_stable_for_equal_scores() {
        let items: Vec<BillItem> =
            (0..25).map(|i| item(&format!("Item {i}"), "1.00")).collect();
        let out = cap_outliers(items);
        let names: Vec<String> = (0..MAX_ITEMS).map(|i| format!("Item {i}")).collect();
        let got: Vec<&str> = out.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(got, names);
    }
}
