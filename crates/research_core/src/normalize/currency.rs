//! Currency inference from budget text.

use crate::model::project::DEFAULT_CURRENCY_CODE;
use crate::source::is_null_marker;

/// Currency codes accepted by manual project entry.
pub const VALID_CURRENCY_CODES: [&str; 16] = [
    "Rs", "USD", "EUR", "GBP", "INR", "AUD", "CAD", "JPY", "CNY", "SGD", "HKD", "THB", "MYR",
    "PKR", "BDT", "NPR",
];

/// Ordered phrase table; the first phrase contained in the budget text wins.
///
/// Qualified rupee/dollar phrases precede the generic word forms, and word
/// forms precede codes and symbols.
const CURRENCY_PHRASES: &[(&str, &str)] = &[
    ("sri lankan rupees", "Rs"),
    ("pakistani rupees", "PKR"),
    ("indian rupees", "INR"),
    ("nepalese rupees", "NPR"),
    ("us dollars", "USD"),
    ("american dollars", "USD"),
    ("rupees", "Rs"),
    ("dollars", "USD"),
    ("rs", "Rs"),
    ("lkr", "Rs"),
    ("usd", "USD"),
    ("us$", "USD"),
    ("$", "USD"),
    ("eur", "EUR"),
    ("€", "EUR"),
    ("euros", "EUR"),
    ("gbp", "GBP"),
    ("£", "GBP"),
    ("pounds", "GBP"),
    ("inr", "INR"),
    ("₹", "INR"),
    ("aud", "AUD"),
    ("cad", "CAD"),
    ("jpy", "JPY"),
    ("¥", "JPY"),
    ("yen", "JPY"),
    ("cny", "CNY"),
    ("yuan", "CNY"),
    ("sgd", "SGD"),
    ("hkd", "HKD"),
    ("thb", "THB"),
    ("baht", "THB"),
    ("myr", "MYR"),
    ("ringgit", "MYR"),
    ("pkr", "PKR"),
    ("bdt", "BDT"),
    ("taka", "BDT"),
    ("npr", "NPR"),
];

/// Infers a currency code for one row.
///
/// A non-blank currency column value is returned verbatim (trimmed).
/// Otherwise the lowercased budget text is scanned against the phrase table;
/// `"Rs"` is the fallback.
pub fn detect_currency(budget_text: &str, currency_text: &str) -> String {
    let currency = currency_text.trim();
    if !is_null_marker(currency) {
        return currency.to_string();
    }

    let budget = budget_text.trim();
    if is_null_marker(budget) {
        return DEFAULT_CURRENCY_CODE.to_string();
    }

    let lowered = budget.to_lowercase();
    CURRENCY_PHRASES
        .iter()
        .find(|(phrase, _)| lowered.contains(phrase))
        .map_or(DEFAULT_CURRENCY_CODE, |(_, code)| code)
        .to_string()
}
