//! Membership-ID generation and checksum validation.

use chrono::Datelike;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 10-digit membership code: two-digit registration year, seven random
/// digits, and a trailing checksum digit (sum of the first nine digits
/// mod 10).
///
/// Uniqueness is only probabilistic: generation does not consult existing
/// records, and lookups use first-match semantics if a collision ever occurs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipId(String);

impl MembershipId {
    /// Generates a fresh ID for the given calendar year.
    pub fn generate(year: i32) -> Self {
        let mut rng = rand::rng();
        let mut digits = format!("{:02}", year.rem_euclid(100));
        for _ in 0..7 {
            digits.push(char::from_digit(rng.random_range(0..10), 10).unwrap());
        }
        let checksum = digit_sum(&digits) % 10;
        digits.push(char::from_digit(checksum, 10).unwrap());
        Self(digits)
    }

    /// Generates a fresh ID stamped with the current year.
    pub fn generate_now() -> Self {
        Self::generate(chrono::Local::now().year())
    }

    /// Checks shape (exactly ten ASCII digits) and the checksum digit.
    pub fn validate(candidate: &str) -> bool {
        if candidate.len() != 10 || !candidate.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        let expected = digit_sum(&candidate[..9]) % 10;
        candidate.as_bytes()[9] - b'0' == expected as u8
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MembershipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn digit_sum(digits: &str) -> u32 {
    digits.bytes().map(|b| u32::from(b - b'0')).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn generated_ids_carry_the_year_prefix() {
        let id = MembershipId::generate(2026);
        assert!(id.as_str().starts_with("26"));
        assert_eq!(id.as_str().len(), 10);
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        assert!(!MembershipId::validate("123"));
        assert!(!MembershipId::validate("26abc45678"));
        assert!(!MembershipId::validate("26123456789")); // 11 digits
    }

    #[test]
    fn validate_rejects_wrong_checksum() {
        let id = MembershipId::generate(2026).into_string();
        let last = id.as_bytes()[9] - b'0';
        let flipped = format!("{}{}", &id[..9], (last + 1) % 10);
        assert!(!MembershipId::validate(&flipped));
    }

    proptest! {
        #[test]
        fn generated_ids_always_checksum(year in 1900i32..2200) {
            let id = MembershipId::generate(year);
            prop_assert!(MembershipId::validate(id.as_str()));
        }
    }
}
