//! Monetary amount extraction from budget text.

use crate::source::is_null_marker;
use once_cell::sync::Lazy;
use regex::Regex;

/// Currency words and symbols removed before numeric parsing.
const CURRENCY_TOKENS: [&str; 32] = [
    "rs", "lkr", "usd", "us$", "$", "eur", "€", "gbp", "£", "inr", "₹", "aud", "cad", "jpy", "¥",
    "cny", "sgd", "hkd", "thb", "myr", "pkr", "bdt", "npr", "rupees", "dollars", "euros",
    "pounds", "yen", "yuan", "baht", "ringgit", "taka",
];

static NON_NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\d.,]").expect("valid non-numeric regex"));

/// Extracts the numeric amount from free budget text.
///
/// Commas are treated purely as thousands separators, so both
/// `1,500,000` and `15,00,000` parse. Returns `None` for blank, null-marker
/// or unparsable text. Signs are stripped, so results are never negative.
pub fn clean_amount(budget_text: &str) -> Option<f64> {
    let trimmed = budget_text.trim();
    if is_null_marker(trimmed) {
        return None;
    }

    let mut cleaned = trimmed.to_lowercase();
    for token in CURRENCY_TOKENS {
        cleaned = cleaned.replace(token, "");
    }
    let digits = NON_NUMERIC_RE.replace_all(&cleaned, "").replace(',', "");
    if digits.is_empty() {
        return None;
    }

    digits.parse::<f64>().ok().filter(|value| value.is_finite())
}
