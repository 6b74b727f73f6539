//! Payload validation for customer and address writes.
//!
//! Validation runs before any storage call and reports only the first failing
//! field, in a fixed order:
//!
//! - customer: first name, last name, phone number
//! - address: details, city, state, pin code
//!
//! Text fields are trimmed before their length is checked and the trimmed
//! value is what gets persisted. Phone numbers and pin codes are persisted
//! exactly as supplied.

use serde::{Deserialize, Deserializer, Serialize, de::IgnoredAny};

use crate::types::{PhoneNumber, PinCode};

/// Minimum trimmed length of a first or last name.
pub const MIN_NAME_LENGTH: usize = 2;
/// Minimum trimmed length of the free-form address line.
pub const MIN_ADDRESS_DETAILS_LENGTH: usize = 5;
/// Minimum trimmed length of a city or state.
pub const MIN_REGION_LENGTH: usize = 2;

/// The first failing field of a customer or address payload.
///
/// The `Display` text is the message returned to API callers.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("First name is required and must be at least 2 characters")]
    FirstName,
    #[error("Last name is required and must be at least 2 characters")]
    LastName,
    #[error("Phone number is required and must be a valid 10-digit number")]
    PhoneNumber,
    #[error("Address details are required and must be at least 5 characters")]
    AddressDetails,
    #[error("City is required and must be at least 2 characters")]
    City,
    #[error("State is required and must be at least 2 characters")]
    State,
    #[error("Pin code is required and must be a valid 5 or 6-digit code")]
    PinCode,
}

/// Raw customer payload as received from a caller.
///
/// Fields of the wrong JSON type deserialize as absent so that
/// [`CustomerInput::validate`] reports them in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInput {
    #[serde(default, deserialize_with = "text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "digits")]
    pub phone_number: Option<String>,
}

/// A customer payload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    /// Trimmed first name.
    pub first_name: String,
    /// Trimmed last name.
    pub last_name: String,
    /// Phone number as supplied.
    pub phone_number: PhoneNumber,
}

impl CustomerInput {
    /// Check every field in order and return the normalized customer.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] for the first field that fails.
    pub fn validate(&self) -> Result<NewCustomer, ValidationError> {
        let first_name = trimmed_min(self.first_name.as_deref(), MIN_NAME_LENGTH)
            .ok_or(ValidationError::FirstName)?;
        let last_name = trimmed_min(self.last_name.as_deref(), MIN_NAME_LENGTH)
            .ok_or(ValidationError::LastName)?;
        let phone_number = self
            .phone_number
            .as_deref()
            .and_then(|raw| PhoneNumber::parse(raw).ok())
            .ok_or(ValidationError::PhoneNumber)?;

        Ok(NewCustomer {
            first_name,
            last_name,
            phone_number,
        })
    }
}

/// Raw address payload as received from a caller.
///
/// Deserializes as leniently as [`CustomerInput`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    #[serde(default, deserialize_with = "text")]
    pub address_details: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "digits")]
    pub pin_code: Option<String>,
}

/// An address payload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    /// Trimmed street address.
    pub address_details: String,
    /// Trimmed city.
    pub city: String,
    /// Trimmed state.
    pub state: String,
    /// Pin code as supplied.
    pub pin_code: PinCode,
}

impl AddressInput {
    /// Check every field in order and return the normalized address.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] for the first field that fails.
    pub fn validate(&self) -> Result<NewAddress, ValidationError> {
        let address_details =
            trimmed_min(self.address_details.as_deref(), MIN_ADDRESS_DETAILS_LENGTH)
                .ok_or(ValidationError::AddressDetails)?;
        let city = trimmed_min(self.city.as_deref(), MIN_REGION_LENGTH)
            .ok_or(ValidationError::City)?;
        let state = trimmed_min(self.state.as_deref(), MIN_REGION_LENGTH)
            .ok_or(ValidationError::State)?;
        let pin_code = self
            .pin_code
            .as_deref()
            .and_then(|raw| PinCode::parse(raw).ok())
            .ok_or(ValidationError::PinCode)?;

        Ok(NewAddress {
            address_details,
            city,
            state,
            pin_code,
        })
    }
}

/// Any JSON value a payload field may carry.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Text(String),
    Unsigned(u64),
    Other(#[allow(dead_code)] IgnoredAny),
}

/// A string field; any other JSON type is treated as missing.
fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(value) => Some(value),
        Loose::Unsigned(_) | Loose::Other(_) => None,
    })
}

/// A digit-string field; unsigned integers are accepted in their decimal form.
fn digits<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Text(value) => Some(value),
        Loose::Unsigned(value) => Some(value.to_string()),
        Loose::Other(_) => None,
    })
}

/// Trim `value` and return it if at least `min` characters remain.
fn trimmed_min(value: Option<&str>, min: usize) -> Option<String> {
    let trimmed = value?.trim();
    (trimmed.chars().count() >= min).then(|| trimmed.to_owned())
}
