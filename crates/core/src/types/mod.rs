//! Core types for Rolodex.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod page;
pub mod phone;
pub mod pin_code;

pub use id::*;
pub use page::{Page, PageError, PageRequest, SortOrder};
pub use phone::{PhoneNumber, PhoneNumberError};
pub use pin_code::{PinCode, PinCodeError};
