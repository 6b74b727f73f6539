//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input has the wrong number of characters.
    #[error("phone number must be exactly {expected} digits (got {actual})")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
        /// Number of characters supplied.
        actual: usize,
    },
    /// The input contains something other than ASCII digits.
    #[error("phone number must contain only digits")]
    NonDigit,
}

/// A 10-digit phone number.
///
/// The value is stored exactly as supplied: no trimming, no formatting
/// characters. Uniqueness across customers is enforced by the store, not here.
///
/// ## Examples
///
/// ```
/// use rolodex_core::PhoneNumber;
///
/// assert!(PhoneNumber::parse("9876543210").is_ok());
///
/// assert!(PhoneNumber::parse("").is_err());            // empty
/// assert!(PhoneNumber::parse("98765").is_err());       // too short
/// assert!(PhoneNumber::parse("98765-4321").is_err());  // separator
/// assert!(PhoneNumber::parse(" 9876543210").is_err()); // not trimmed
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Number of digits in a phone number.
    pub const LENGTH: usize = 10;

    /// Parse a `PhoneNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, is not exactly 10 characters
    /// long, or contains anything other than ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        if s.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        let actual = s.chars().count();
        if actual != Self::LENGTH {
            return Err(PhoneNumberError::WrongLength {
                expected: Self::LENGTH,
                actual,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneNumberError::NonDigit);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
