//! Contact-detail validation for the email and phone steps.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum number of digits a phone number must carry.
pub const MIN_PHONE_DIGITS: usize = 10;

/// Permissive RFC-5322-like address pattern: local-part characters, `@`,
/// then dot-separated domain labels.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is a valid regex")
});

/// Check an email address.
///
/// Beyond the pattern: exactly one `@`, a dotted domain whose last label is
/// at least two characters, and no `..` or `,` anywhere.
pub fn is_valid_email(email: &str) -> bool {
    if !EMAIL_PATTERN.is_match(email) {
        return false;
    }
    if email.contains("..") || email.contains(',') {
        return false;
    }

    let parts: Vec<&str> = email.split('@').collect();
    let [_, domain] = parts.as_slice() else {
        return false;
    };

    match domain.rsplit_once('.') {
        Some((_, tld)) => tld.chars().count() >= 2,
        None => false,
    }
}

/// Count the digits in a phone number, ignoring all formatting.
pub fn phone_digits(phone: &str) -> usize {
    phone.chars().filter(|c| c.is_ascii_digit()).count()
}

/// A phone number is valid when at least [`MIN_PHONE_DIGITS`] digits remain
/// after stripping everything else. No country-code handling.
pub fn is_valid_phone(phone: &str) -> bool {
    phone_digits(phone) >= MIN_PHONE_DIGITS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_emails() {
        for email in ["user@example.com", "a.b+c@sub.example.co"] {
            assert!(is_valid_email(email), "{email} should be valid");
        }
    }

    #[test]
    fn rejects_invalid_emails() {
        for email in [
            "user@@example.com",
            "user@example",
            "user..name@example.com",
            "user,name@example.com",
            "user@example.c",
            "",
            "@example.com",
            "user@",
            "user@exa mple.com",
        ] {
            assert!(!is_valid_email(email), "{email:?} should be invalid");
        }
    }

    #[test]
    fn rejects_double_dot_in_domain() {
        assert!(!is_valid_email("user@example..com"));
    }

    #[test]
    fn phone_digit_count_ignores_formatting() {
        assert_eq!(phone_digits("+1 (555) 123 4567"), 11);
        assert_eq!(phone_digits("555-123-4567"), 10);
        assert_eq!(phone_digits("call me"), 0);
    }

    #[test]
    fn phone_validation_table() {
        assert!(is_valid_phone("555-123-4567"));
        assert!(is_valid_phone("+1 (555) 123 4567"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("555-123-456"));
    }
}
