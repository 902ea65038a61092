//! Form validation helpers.
//!
//! A [`Validator`] collects field-keyed and form-wide error messages while a
//! handler checks its input; the free functions are the individual checks.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

pub static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9.\-]+\.[a-z]{2,4}$").expect("email pattern compiles")
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validator {
    pub non_field_errors: Vec<String>,
    pub field_errors: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn valid(&self) -> bool {
        self.field_errors.is_empty() && self.non_field_errors.is_empty()
    }

    pub fn add_non_field_error(&mut self, message: impl Into<String>) {
        self.non_field_errors.push(message.into());
    }

    /// Record an error for `key`. The first message recorded for a key wins.
    pub fn add_field_error(&mut self, key: &str, message: impl Into<String>) {
        self.field_errors
            .entry(key.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn check_field(&mut self, ok: bool, key: &str, message: impl Into<String>) {
        if !ok {
            self.add_field_error(key, message);
        }
    }

    /// Message for `key`, if any. Convenient in templates.
    pub fn field_error(&self, key: &str) -> Option<&str> {
        self.field_errors.get(key).map(String::as_str)
    }
}

pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// At most `n` characters (not bytes).
pub fn max_chars(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

/// At least `n` characters (not bytes).
pub fn min_chars(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_validator_is_valid() {
        assert!(Validator::new().valid());
    }

    #[test]
    fn test_first_field_error_wins() {
        // Given two failing checks on the same field
        let mut v = Validator::new();
        v.check_field(false, "title", "This field cannot be blank");
        v.check_field(false, "title", "This field cannot be more than 100 characters long");

        // Then only the first message is kept
        assert!(!v.valid());
        assert_eq!(v.field_error("title"), Some("This field cannot be blank"));
        assert_eq!(v.field_errors.len(), 1);
    }

    #[test]
    fn test_non_field_error_invalidates() {
        let mut v = Validator::new();
        v.add_non_field_error("Email or password is incorrect");
        assert!(!v.valid());
        assert_eq!(v.non_field_errors, vec!["Email or password is incorrect"]);
    }

    #[test]
    fn test_passing_check_adds_nothing() {
        let mut v = Validator::new();
        v.check_field(true, "title", "unused");
        assert!(v.valid());
        assert_eq!(v.field_error("title"), None);
    }

    #[test]
    fn test_not_blank() {
        assert!(not_blank("x"));
        assert!(!not_blank(""));
        assert!(!not_blank(" \t\n"));
    }

    #[test]
    fn test_char_limits_count_characters() {
        // Three characters, nine bytes
        let value = "日本語";
        assert!(max_chars(value, 3));
        assert!(!max_chars(value, 2));
        assert!(min_chars(value, 3));
        assert!(!min_chars(value, 4));
    }

    #[test]
    fn test_permitted_value() {
        assert!(permitted_value(&7, &[1, 7, 365]));
        assert!(!permitted_value(&30, &[1, 7, 365]));
    }

    #[test]
    fn test_email_regex() {
        assert!(matches("alice@example.com", &EMAIL_RX));
        assert!(matches("a.b+c@sub.example.org", &EMAIL_RX));
        assert!(!matches("alice@example", &EMAIL_RX));
        assert!(!matches("not an email", &EMAIL_RX));
        assert!(!matches("Alice@Example.com", &EMAIL_RX));
    }

    proptest! {
        #[test]
        fn prop_max_chars_matches_char_count(value in ".{0,40}", n in 0usize..50) {
            prop_assert_eq!(max_chars(&value, n), value.chars().count() <= n);
        }

        #[test]
        fn prop_min_and_max_cover_every_length(value in ".{0,40}", n in 0usize..50) {
            // Every string is either at most n or at least n characters long
            prop_assert!(max_chars(&value, n) || min_chars(&value, n));
        }

        #[test]
        fn prop_whitespace_only_is_blank(value in "[ \t\r\n]{0,20}") {
            prop_assert!(!not_blank(&value));
        }

        #[test]
        fn prop_simple_addresses_match(local in "[a-z0-9]{1,12}", domain in "[a-z]{1,12}", tld in "[a-z]{2,4}") {
            let email = format!("{local}@{domain}.{tld}");
            prop_assert!(matches(&email, &EMAIL_RX));
        }
    }
}
