//! Presentation helpers for names and phone numbers.
//!
//! # Responsibility
//! - Shorten long personal names for compact list rendering.
//! - Extract and mask Brazilian phone numbers.
//!
//! # Invariants
//! - Helpers are pure and never fail; unknown shapes pass through trimmed.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_DIGIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9]+").expect("valid digit regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Abbreviates middle names to their initial.
///
/// `"PEDRO GONÇALVES CARRILO"` becomes `"PEDRO G. CARRILO"`. Names with one
/// or two words are returned with whitespace collapsed.
pub fn abbreviate_name(full_name: &str) -> String {
    let parts = WHITESPACE_RE
        .split(full_name.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>();

    match parts.as_slice() {
        [] => String::new(),
        [first, middle @ .., last] if !middle.is_empty() => {
            let mut out = Vec::with_capacity(parts.len());
            out.push((*first).to_string());
            out.extend(middle.iter().filter_map(|name| {
                name.chars()
                    .next()
                    .map(|initial| format!("{}.", initial.to_uppercase()))
            }));
            out.push((*last).to_string());
            out.join(" ")
        }
        short => short.join(" "),
    }
}

/// Returns only the digits of a phone input.
pub fn phone_digits(raw: &str) -> String {
    NON_DIGIT_RE.replace_all(raw, "").into_owned()
}

/// Masks a phone number as `(DD) DDDDD-DDDD` or `(DD) DDDD-DDDD`.
///
/// Inputs with any other digit count are returned trimmed, unmasked.
pub fn format_phone(raw: &str) -> String {
    let digits = phone_digits(raw);
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => raw.trim().to_string(),
    }
}
