//! Locale-aware name ordering.
//!
//! Property names are ordered the way a root-locale collator orders them:
//! - primary: punctuation/whitespace < digits < letters, letters compared
//!   case-insensitively
//! - tertiary: at the first case-only difference, lowercase sorts first
//!
//! For the kebab-case ASCII names found in style specs this gives a stable,
//! platform-independent order with no dependency on the host locale.

use std::cmp::Ordering;

/// Collation order of the punctuation marks that occur in style spec names.
/// Anything not listed sorts after these, by code point.
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Primary collation class + weight of a single char.
fn primary_key(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        return (0, c as u32);
    }
    if c.is_ascii_digit() {
        return (2, c as u32);
    }
    if c.is_alphabetic() {
        let lower = c.to_lowercase().next().unwrap_or(c);
        return (3, lower as u32);
    }
    match PUNCTUATION_ORDER.find(c) {
        Some(idx) => (1, idx as u32),
        None => (1, PUNCTUATION_ORDER.len() as u32 + c as u32),
    }
}

/// Compare two names with locale-aware collation.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .map(primary_key)
        .cmp(b.chars().map(primary_key));
    if primary != Ordering::Equal {
        return primary;
    }

    // Tertiary: lowercase before uppercase at the first case difference
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca != cb {
            return match (ca.is_lowercase(), cb.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => ca.cmp(&cb),
            };
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_names_sort_alphabetically() {
        let mut names = vec!["fill-pattern", "fill-antialias", "fill-color", "fill-opacity"];
        names.sort_by(|a, b| locale_cmp(a, b));
        assert_eq!(names, vec!["fill-antialias", "fill-color", "fill-opacity", "fill-pattern"]);
    }

    #[test]
    fn test_hyphen_sorts_before_letters() {
        // "line-gap-width" < "line-gapwidth" because '-' precedes letters
        assert_eq!(locale_cmp("line-gap-width", "line-gapwidth"), Ordering::Less);
        assert_eq!(locale_cmp("text-halo", "text-halo-blur"), Ordering::Less);
    }

    #[test]
    fn test_case_is_secondary() {
        assert_eq!(locale_cmp("Alpha", "alpha"), Ordering::Greater);
        assert_eq!(locale_cmp("alpha", "Beta"), Ordering::Less);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_digits_before_letters() {
        assert_eq!(locale_cmp("a1", "ab"), Ordering::Less);
        assert_eq!(locale_cmp("a-", "a1"), Ordering::Less);
    }
}
