//! Per-line extraction of `{name, price, quantity, unit}` candidates from
//! merged OCR text. Receipt layouts vary wildly, so extraction is an ordered
//! cascade of strategies: the first one producing a usable `(name, price)`
//! pair wins the line, and lines nothing matches are silently dropped —
//! misses are the expected, high-frequency outcome on noisy input.

use rust_decimal::Decimal;
use std::str::FromStr;

use homeboard_core::ParsedLineItem;

// ── Pre-filter patterns ───────────────────────────────────────────────────────

re!(re_numeric_noise, r"^[\d\s\.\$:=\-/]+$");
re!(re_date_line, r"^\d{1,2}[-/]\d{1,2}[-/]\d{2,4}");
re!(re_time_line, r"^\d{1,2}:\d{2}");
re!(re_gst_rate, r"@\s*\d+\.?\d*\s*%");
re!(re_bare_code, r"^\d{4,}\s*$");

/// Header/footer vocabulary that never describes a purchasable item. Matched
/// by substring on the lowercased line, separator runs included.
const STOP_KEYWORDS: &[&str] = &[
    "total", "subtotal", "tax", "gst", "vat", "discount", "cash", "change", "thank", "store",
    "receipt", "invoice", "date", "time", "==", "---", "___", "balance", "amount", "paid", "due",
    "refund", "return", "round", "off", "sale", "account", "items:", "qty:", "particulars", "hsn",
    "n/rate", "value", "cgst", "sgst", "breakup", "details", "inr",
];

// ── Strategy patterns ─────────────────────────────────────────────────────────

re!(re_hsn_line, r"^(\d{6})\s+(.+)$");
re!(re_numeric_token, r"^\d+\.?\d*$");
re!(re_qty_multiplier, r"(\d+)\s*[xX@]\s*(.+?)\s+(\d+\.?\d*)");
re!(re_colon_price, r"^(.+?)\s*:\s*(\d+\.?\d*)\s*$");
re!(re_currency_price, r"^(.+?)\s+[$₹](\d+\.?\d*)\s*$");
re!(re_two_decimal_price, r"^(.+?)\s+₹?(\d+\.\d{2})\s*$");
re!(re_one_decimal_price, r"^(.+?)\s+₹?(\d+\.\d)\s*$");
re!(re_any_trailing_price, r"(.+?)\s+₹?(\d+\.?\d*)\s*$");
re!(re_trailing_decimal, r"₹?(\d+\.\d{1,2})\s*$");
re!(re_trailing_integer, r"₹?(\d+)\s*$");

// ── Name cleanup patterns ─────────────────────────────────────────────────────

re!(re_leading_hsn, r"^\d{6}\s+");
re!(
    re_qty_unit,
    r"(?i)(\d+\.?\d*)\s*(kg|g|gm|grams?|lb|lbs|oz|ml|l|liters?|pcs?|pieces?|nos?|numbers?|pk|pack|each|ea|ct|count)"
);
re!(re_leading_numbering, r"^\d+\.?\s*");
re!(re_whitespace_run, r"\s+");

/// One way a receipt line can encode an item and its price.
pub trait LineStrategy: Send + Sync {
    fn try_match(&self, line: &str) -> Option<ParsedLineItem>;
}

fn parse_price(s: &str) -> Option<Decimal> {
    Decimal::from_str(s).ok().filter(|p| *p > Decimal::ZERO)
}

/// Prices at or above 10000 on a single grocery line are OCR artifacts.
fn parse_bounded_price(s: &str) -> Option<Decimal> {
    parse_price(s).filter(|p| *p < Decimal::from(10_000))
}

// ── Strategies, in cascade priority order ─────────────────────────────────────

/// Indian retail layout: 6-digit HSN code, free-text name, then one or more
/// numeric tokens (quantity / rate / value), e.g.
/// `190590 MODERN MILK PLUS BR 1 30.00 30.00`.
struct HsnCoded;

impl LineStrategy for HsnCoded {
    fn try_match(&self, line: &str) -> Option<ParsedLineItem> {
        let caps = re_hsn_line().captures(line)?;
        let remainder = caps.get(2)?.as_str();

        let mut numbers: Vec<Decimal> = Vec::new();
        let mut words: Vec<&str> = Vec::new();
        for token in remainder.split_whitespace() {
            match re_numeric_token().is_match(token).then(|| Decimal::from_str(token)) {
                Some(Ok(n)) => numbers.push(n),
                _ => words.push(token),
            }
        }
        if words.is_empty() || numbers.is_empty() {
            return None;
        }

        // Heuristic carried over from field observations: a small integral
        // leading numeral is read as the quantity, and the last numeral as the
        // line value. On some layouts the last numeral is a rate or
        // tax-inclusive figure instead; there is no way to disambiguate from
        // the text alone.
        let (quantity, price) = if numbers.len() >= 2 {
            let first = numbers[0];
            if first <= Decimal::from(10) && first.fract().is_zero() {
                (Some(first.normalize().to_string()), numbers[numbers.len() - 1])
            } else {
                (None, numbers[numbers.len() - 1])
            }
        } else {
            (None, numbers[0])
        };
        if price <= Decimal::ZERO {
            return None;
        }

        Some(ParsedLineItem {
            name: words.join(" "),
            price,
            quantity,
            unit: None,
        })
    }
}

/// `2x Bread 1.15` / `2 @ Bread 1.15` — explicit count before the name.
struct QuantityMultiplier;

impl LineStrategy for QuantityMultiplier {
    fn try_match(&self, line: &str) -> Option<ParsedLineItem> {
        let caps = re_qty_multiplier().captures(line)?;
        let price = parse_price(caps.get(3)?.as_str())?;
        Some(ParsedLineItem {
            name: caps.get(2)?.as_str().trim().to_string(),
            price,
            quantity: Some(caps.get(1)?.as_str().to_string()),
            unit: Some("each".to_string()),
        })
    }
}

/// `Milk: 1.15`
struct ColonDelimited;

impl LineStrategy for ColonDelimited {
    fn try_match(&self, line: &str) -> Option<ParsedLineItem> {
        let caps = re_colon_price().captures(line)?;
        let price = parse_price(caps.get(2)?.as_str())?;
        Some(plain(caps.get(1)?.as_str(), price))
    }
}

/// `Milk $1.15` / `Milk ₹50.00`
struct CurrencySymbol;

impl LineStrategy for CurrencySymbol {
    fn try_match(&self, line: &str) -> Option<ParsedLineItem> {
        let caps = re_currency_price().captures(line)?;
        let price = parse_price(caps.get(2)?.as_str())?;
        Some(plain(caps.get(1)?.as_str(), price))
    }
}

/// `Milk 1.15` — trailing price with exactly two decimal digits.
struct TrailingTwoDecimal;

impl LineStrategy for TrailingTwoDecimal {
    fn try_match(&self, line: &str) -> Option<ParsedLineItem> {
        let caps = re_two_decimal_price().captures(line)?;
        let price = parse_price(caps.get(2)?.as_str())?;
        Some(plain(caps.get(1)?.as_str(), price))
    }
}

/// `Milk 1.5` — trailing price with a single decimal digit.
struct TrailingOneDecimal;

impl LineStrategy for TrailingOneDecimal {
    fn try_match(&self, line: &str) -> Option<ParsedLineItem> {
        let caps = re_one_decimal_price().captures(line)?;
        let price = parse_price(caps.get(2)?.as_str())?;
        Some(plain(caps.get(1)?.as_str(), price))
    }
}

/// Currency-agnostic trailing number (`Paneer ₹90`, `Dahi 45`), bounded to a
/// believable grocery range.
struct TrailingNumber;

impl LineStrategy for TrailingNumber {
    fn try_match(&self, line: &str) -> Option<ParsedLineItem> {
        let caps = re_any_trailing_price().captures(line)?;
        let price = parse_bounded_price(caps.get(2)?.as_str())?;
        Some(plain(caps.get(1)?.as_str(), price))
    }
}

/// Last resort: any decimal-formatted number at line end, then any bare
/// integer. Everything before the number becomes the candidate name.
struct LastResortNumber;

impl LineStrategy for LastResortNumber {
    fn try_match(&self, line: &str) -> Option<ParsedLineItem> {
        let m = re_trailing_decimal()
            .find(line)
            .or_else(|| re_trailing_integer().find(line))?;
        let caps_start = m.start();
        let digits = m.as_str().trim_start_matches('₹').trim_end();
        let price = parse_bounded_price(digits)?;
        Some(plain(&line[..caps_start], price))
    }
}

fn plain(name: &str, price: Decimal) -> ParsedLineItem {
    ParsedLineItem {
        name: name.trim().to_string(),
        price,
        quantity: None,
        unit: None,
    }
}

// ── Cascade ───────────────────────────────────────────────────────────────────

/// Ordered strategy list; first match wins per line.
pub struct LineParserCascade {
    strategies: Vec<Box<dyn LineStrategy>>,
}

impl Default for LineParserCascade {
    fn default() -> Self {
        LineParserCascade {
            strategies: vec![
                Box::new(HsnCoded),
                Box::new(QuantityMultiplier),
                Box::new(ColonDelimited),
                Box::new(CurrencySymbol),
                Box::new(TrailingTwoDecimal),
                Box::new(TrailingOneDecimal),
                Box::new(TrailingNumber),
                Box::new(LastResortNumber),
            ],
        }
    }
}

impl LineParserCascade {
    /// Parse every line of a merged OCR document, in order.
    pub fn parse_text(&self, text: &str) -> Vec<ParsedLineItem> {
        text.lines().filter_map(|line| self.parse_line(line)).collect()
    }

    /// Extract one candidate item from a line, or `None` if the line is
    /// pre-filtered or no strategy matches.
    pub fn parse_line(&self, line: &str) -> Option<ParsedLineItem> {
        let line = line.trim();
        if should_skip(line) {
            return None;
        }
        let raw = self.strategies.iter().find_map(|s| s.try_match(line))?;
        Some(cleanup(raw))
    }
}

/// Lines that cannot describe an item: headers, footers, totals, dates,
/// separators and bare numeric runs.
fn should_skip(line: &str) -> bool {
    if line.chars().count() < 3 {
        return true;
    }
    let lower = line.to_lowercase();
    if STOP_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }
    re_numeric_noise().is_match(line)
        || re_date_line().is_match(line)
        || re_time_line().is_match(line)
        || re_gst_rate().is_match(line)
        || re_bare_code().is_match(line)
}

/// Applied to every extracted candidate regardless of which strategy matched.
fn cleanup(mut item: ParsedLineItem) -> ParsedLineItem {
    let mut name = re_leading_hsn().replace(&item.name, "").into_owned();

    // A quantity+unit token embedded in the name ("Cherry Tomatoes 1lb")
    // becomes structured data, unless the strategy already supplied one.
    if let Some(caps) = re_qty_unit().captures(&name) {
        if item.quantity.is_none() {
            item.quantity = Some(caps[1].to_string());
            item.unit = Some(caps[2].to_string());
        }
        name = re_qty_unit().replace_all(&name, "").into_owned();
    }

    let name = re_leading_numbering().replace(name.trim(), "");
    let name = re_whitespace_run().replace_all(name.trim(), " ");
    item.name = name.trim().to_string();
    item
}
