//! Passcode generation and normalization
//!
//! A passcode is the short shared secret a user types to join a shared
//! tutor or a study group. Codes are 6 characters from the 36-symbol
//! uppercase-alphanumeric alphabet, which keeps them readable over a
//! projector or a WhatsApp message while leaving ~2.2 billion possible
//! values per resource kind.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Alphabet passcodes are drawn from
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of every passcode
pub const PASSCODE_LEN: usize = 6;

/// A normalized join passcode
///
/// The inner string is always exactly [`PASSCODE_LEN`] characters from
/// `[A-Z0-9]`; both constructors uphold that invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Passcode(String);

impl Passcode {
    /// Generate a random passcode
    ///
    /// The generator does not guarantee uniqueness; the store's unique
    /// index is the collision check, and creation flows retry with a fresh
    /// code when an insert is rejected.
    pub fn generate() -> Self {
        use rand::Rng;

        let mut rng = rand::rng();
        let code = (0..PASSCODE_LEN)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect();

        Passcode(code)
    }

    /// Normalize raw user input into a passcode
    ///
    /// Removes ASCII whitespace and uppercases before validating, so
    /// `" ab 12 cd "` normalizes to `AB12CD`. Anything that does not come
    /// out as 6 characters of `[A-Z0-9]` is rejected.
    pub fn normalize(raw: &str) -> Result<Self, PasscodeError> {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();

        if cleaned.chars().count() != PASSCODE_LEN {
            return Err(PasscodeError::WrongLength(cleaned.chars().count()));
        }

        if !cleaned.bytes().all(|b| CHARSET.contains(&b)) {
            return Err(PasscodeError::InvalidCharacter);
        }

        Ok(Passcode(cleaned))
    }

    /// Reconstruct a passcode from an already-normalized stored value
    pub(crate) fn from_stored(value: String) -> Self {
        Passcode(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Passcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Passcode validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasscodeError {
    #[error("passcode must be exactly {PASSCODE_LEN} characters, got {0}")]
    WrongLength(usize),

    #[error("passcode may only contain letters A-Z and digits 0-9")]
    InvalidCharacter,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_passcode_shape() {
        for _ in 0..100 {
            let code = Passcode::generate();
            assert_eq!(code.as_str().len(), PASSCODE_LEN);
            assert!(code.as_str().bytes().all(|b| CHARSET.contains(&b)));
        }
    }

    #[test]
    fn test_generated_passcode_collision_rate() {
        // 10,000 draws from a 36^6 space give an expected birthday-collision
        // count of roughly 0.02; a handful of duplicates would already
        // indicate a broken generator.
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            seen.insert(Passcode::generate());
        }
        assert!(seen.len() >= 9_997, "too many collisions: {}", 10_000 - seen.len());
    }

    #[test]
    fn test_normalize_uppercases_and_strips_whitespace() {
        let code = Passcode::normalize(" ab 12 cd ").unwrap();
        assert_eq!(code.as_str(), "AB12CD");
    }

    #[test]
    fn test_normalize_rejects_wrong_length() {
        assert_eq!(
            Passcode::normalize("AB12C"),
            Err(PasscodeError::WrongLength(5))
        );
        assert_eq!(
            Passcode::normalize("AB12CDE"),
            Err(PasscodeError::WrongLength(7))
        );
        assert_eq!(Passcode::normalize(""), Err(PasscodeError::WrongLength(0)));
    }

    #[test]
    fn test_normalize_rejects_invalid_characters() {
        assert_eq!(
            Passcode::normalize("AB-2CD"),
            Err(PasscodeError::InvalidCharacter)
        );
        assert_eq!(
            Passcode::normalize("AB12Cé"),
            Err(PasscodeError::InvalidCharacter)
        );
    }

    proptest! {
        #[test]
        fn prop_valid_codes_normalize(raw in "[a-zA-Z0-9]{6}") {
            let code = Passcode::normalize(&raw).unwrap();
            prop_assert_eq!(code.as_str(), raw.to_ascii_uppercase());
        }

        #[test]
        fn prop_wrong_lengths_rejected(raw in "[A-Z0-9]{0,5}|[A-Z0-9]{7,12}") {
            prop_assert!(matches!(
                Passcode::normalize(&raw),
                Err(PasscodeError::WrongLength(_))
            ));
        }

        #[test]
        fn prop_whitespace_never_changes_meaning(raw in "[a-z0-9]{6}", pad in "[ \t]{0,3}") {
            let padded = format!("{pad}{raw}{pad}");
            prop_assert_eq!(
                Passcode::normalize(&padded).unwrap(),
                Passcode::normalize(&raw).unwrap()
            );
        }
    }
}
