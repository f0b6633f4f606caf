//! Structural plausibility checks for extracted items. Rejection is a
//! boolean, never an error: the cascade is best-effort on noisy input and
//! dropping a candidate is a routine outcome.

use rust_decimal::Decimal;

use homeboard_core::ParsedLineItem;

re!(re_non_alnum, r"[^a-zA-Z0-9\s]");
re!(re_no_letters, r"^[^a-zA-Z]*$");
re!(re_digits_and_symbols, r"^[\d\s\.\$:=\-/]+$");
re!(re_short_code, r"^[A-Z]{1,2}\d+");

/// Whether `name` looks like a real product name rather than OCR garbage.
pub fn is_plausible_name(name: &str) -> bool {
    if name.chars().count() < 2 {
        return false;
    }

    // Ratio is judged on the alphanumeric-and-space skeleton of the name.
    let cleaned = re_non_alnum().replace_all(name, "");
    let letters = cleaned.chars().filter(|c| c.is_ascii_alphabetic()).count();
    let total = cleaned.chars().filter(|c| !c.is_whitespace()).count();
    if total == 0 || letters < 2 {
        return false;
    }
    if (letters as f32 / total as f32) < 0.3 {
        return false;
    }

    // Digit-heavy strings are product codes, not names.
    let digits = cleaned.chars().filter(|c| c.is_ascii_digit()).count();
    if digits > letters * 2 {
        return false;
    }

    !(re_no_letters().is_match(name)
        || re_digits_and_symbols().is_match(name)
        || re_short_code().is_match(name))
}

/// Final accept/reject for a parsed candidate. The price bound is asserted
/// again here even though the cascade enforces it on its fallback paths.
pub fn accepts(item: &ParsedLineItem) -> bool {
    is_plausible_name(&item.name)
        && item.price > Decimal::ZERO
        && item.price < Decimal::from(10_000)
}
