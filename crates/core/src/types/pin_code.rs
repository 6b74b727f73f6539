//! Postal pin code type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PinCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PinCodeError {
    /// The input string is empty.
    #[error("pin code cannot be empty")]
    Empty,
    /// The input is shorter or longer than allowed.
    #[error("pin code must be {min} to {max} digits (got {actual})")]
    WrongLength {
        /// Minimum number of digits.
        min: usize,
        /// Maximum number of digits.
        max: usize,
        /// Number of characters supplied.
        actual: usize,
    },
    /// The input contains something other than ASCII digits.
    #[error("pin code must contain only digits")]
    NonDigit,
}

/// A 5 or 6 digit postal code, stored exactly as supplied.
///
/// ```
/// use rolodex_core::PinCode;
///
/// assert!(PinCode::parse("400001").is_ok());
/// assert!(PinCode::parse("90210").is_ok());
/// assert!(PinCode::parse("1234").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PinCode(String);

impl PinCode {
    /// Shortest accepted pin code.
    pub const MIN_LENGTH: usize = 5;
    /// Longest accepted pin code.
    pub const MAX_LENGTH: usize = 6;

    /// Parse a `PinCode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, is not 5 or 6 characters long,
    /// or contains anything other than ASCII digits.
    pub fn parse(s: &str) -> Result<Self, PinCodeError> {
        if s.is_empty() {
            return Err(PinCodeError::Empty);
        }

        let actual = s.chars().count();
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&actual) {
            return Err(PinCodeError::WrongLength {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
                actual,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PinCodeError::NonDigit);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the pin code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PinCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
