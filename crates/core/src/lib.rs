//! Rolodex Core - Shared types library.
//!
//! This crate provides the domain types used across all Rolodex components:
//! - `server` - JSON API over the customer and address store
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP. This keeps validation testable in isolation
//! and usable from any front end.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, phone numbers, pin codes and pagination values
//! - [`validation`] - Customer and address payload validators

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::{
    AddressInput, CustomerInput, NewAddress, NewCustomer, ValidationError,
};
