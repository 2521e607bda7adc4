//! Phone number normalization for inbound senders.

use once_cell::sync::Lazy;
use regex::Regex;

/// Length of a North American national number (area code + subscriber).
pub const NATIONAL_NUMBER_LEN: usize = 10;

// Greedy prefix: when a line holds several `+1` numbers, the last one wins.
static US_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".*\+1([0-9]{10})").expect("valid phone pattern"));

/// Strip a `+1` country code, returning the 10-digit national number.
///
/// Input that is already 10 characters long (counted as characters, not bytes), or that has
/// no `+1` followed by ten digits, is returned unchanged. Numbers outside the `+1` plan are not touched.
pub fn strip_country_code(number: &str) -> &str {
    if number.chars().count() == NATIONAL_NUMBER_LEN {
        return number;
    }
    US_NUMBER
        .captures(number)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(number)
}
