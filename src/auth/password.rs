//! Password strength policy and bcrypt hashing.
//!
//! Hashing is salted per call, so the same password never produces the same
//! digest twice and digests cannot be compared to each other, only verified.

use crate::error::Result;

/// Work factor for bcrypt. Raising it slows brute force and every login
/// equally; 12 keeps a login round-trip comfortably under a second on
/// desktop hardware.
const HASH_COST: u32 = 12;

/// Message attached to `Error::Validation` wherever a password is set.
pub(crate) const WEAK_PASSWORD: &str =
    "must be at least 8 characters with an uppercase letter, a lowercase letter, a digit, and a symbol";

/// Whether a password clears the strength bar: at least 8 characters with at
/// least one uppercase letter, one lowercase letter, one digit, and one ASCII
/// punctuation symbol.
pub fn is_strong(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_punctuation())
}

/// Hash a password for storage. Salting happens inside bcrypt, so callers
/// never see or pass a salt.
pub fn hash(password: &str) -> Result<String> {
    Ok(bcrypt::hash(password, HASH_COST)?)
}

/// Check a password against a stored digest. A malformed digest is treated as
/// a mismatch rather than an error: a corrupted row should fail the login,
/// not crash it.
pub fn verify(password: &str, digest: &str) -> bool {
    bcrypt::verify(password, digest).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_requires_every_character_class() {
        assert!(is_strong("Str0ng!Pw"));
        assert!(!is_strong("Sh0r!t"), "too short");
        assert!(!is_strong("str0ng!pw"), "no uppercase");
        assert!(!is_strong("STR0NG!PW"), "no lowercase");
        assert!(!is_strong("Strong!Pw"), "no digit");
        assert!(!is_strong("Str0ngPwd"), "no symbol");
        assert!(!is_strong(""), "empty");
    }

    #[test]
    fn hash_round_trips_and_rejects_other_passwords() {
        let digest = hash("Str0ng!Pw").unwrap();
        assert!(verify("Str0ng!Pw", &digest));
        assert!(!verify("Wr0ng!Pw!", &digest));
    }

    #[test]
    fn equal_inputs_hash_to_distinct_digests() {
        let first = hash("Str0ng!Pw").unwrap();
        let second = hash("Str0ng!Pw").unwrap();
        assert_ne!(first, second, "salting should make digests unique");
    }

    #[test]
    fn malformed_digest_fails_verification_quietly() {
        assert!(!verify("Str0ng!Pw", "not-a-bcrypt-digest"));
        assert!(!verify("Str0ng!Pw", ""));
    }
}
