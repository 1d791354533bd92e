//! Input-validation rules applied before anything reaches storage.

use regex::Regex;
use std::sync::LazyLock;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_'.]*$").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+31-6-\d{8}$").unwrap());
static POSTAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}[A-Z]{2}$").unwrap());
static PASSWORD_SPECIAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[~!@#$%&_\-+=`|(){}\[\]:;'<>,.?/]").unwrap());

/// 8–10 characters, starting with a letter or underscore; letters, digits,
/// underscores, apostrophes, and periods after that.
pub fn is_valid_username(username: &str) -> bool {
    (8..=10).contains(&username.chars().count()) && USERNAME_RE.is_match(username)
}

/// 12–30 characters with at least one lowercase letter, one uppercase letter,
/// one digit, and one special character.
pub fn is_valid_password(password: &str) -> bool {
    (12..=30).contains(&password.chars().count())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && PASSWORD_SPECIAL_RE.is_match(password)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Dutch mobile format: `+31-6-XXXXXXXX`.
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Postal code format `DDDDXX` (four digits, two uppercase letters).
pub fn is_valid_postal_code(code: &str) -> bool {
    POSTAL_RE.is_match(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(is_valid_username("alice_w.b"));
        assert!(is_valid_username("_underbar"));
        assert!(!is_valid_username("short"));
        assert!(!is_valid_username("waytoolongname"));
        assert!(!is_valid_username("1leading9"));
        assert!(!is_valid_username("spaced ou"));
    }

    #[test]
    fn password_rules() {
        assert!(is_valid_password("Sufficient_1!"));
        assert!(!is_valid_password("Short_1!"));
        assert!(!is_valid_password("nouppercase_123!"));
        assert!(!is_valid_password("NOLOWERCASE_123!"));
        assert!(!is_valid_password("NoDigitsHere_!aa"));
        assert!(!is_valid_password("NoSpecials123aaa"));
    }

    #[test]
    fn email_rules() {
        assert!(is_valid_email("member@example.com"));
        assert!(is_valid_email("a.b+c@mail.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn phone_rules() {
        assert!(is_valid_phone("+31-6-12345678"));
        assert!(!is_valid_phone("+31-6-1234567"));
        assert!(!is_valid_phone("0612345678"));
    }

    #[test]
    fn postal_code_rules() {
        assert!(is_valid_postal_code("1234AB"));
        assert!(!is_valid_postal_code("1234ab"));
        assert!(!is_valid_postal_code("12345A"));
    }
}
