//! Booking references.

use std::{fmt, str::FromStr};

use rand::{RngCore as _, rngs::OsRng};
use thiserror::Error;

/// Number of characters in a booking reference.
pub const REFERENCE_LEN: usize = 8;

const ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Short user-facing identifier correlating a session's records and its
/// confirmation mail. Generated once per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingReference(String);

impl BookingReference {
    /// Generate a fresh reference from OS randomness.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0_u8; REFERENCE_LEN];

        OsRng.fill_bytes(&mut bytes);

        let id = bytes
            .iter()
            .map(|byte| char::from(ALPHABET[usize::from(byte % 36)]))
            .collect();

        Self(id)
    }

    /// The reference value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error raised when a string is not a valid booking reference.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("booking reference must be {REFERENCE_LEN} lowercase alphanumeric characters")]
pub struct InvalidReference;

impl FromStr for BookingReference {
    type Err = InvalidReference;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let valid = value.len() == REFERENCE_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());

        if !valid {
            return Err(InvalidReference);
        }

        Ok(Self(value.to_string()))
    }
}
