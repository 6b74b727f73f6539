//! Domain models returned by the repositories and serialized by the API.

pub mod address;
pub mod customer;

pub use address::{Address, AddressWithCustomer, CustomerAddresses};
pub use customer::{Customer, CustomerSummary};
