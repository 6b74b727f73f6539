//! Customer domain models.

use serde::{Deserialize, Serialize};

use rolodex_core::{CustomerId, PhoneNumber};

/// A stored customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Store-assigned identity, never reused.
    pub id: CustomerId,
    /// Trimmed first name.
    pub first_name: String,
    /// Trimmed last name.
    pub last_name: String,
    /// Unique 10-digit phone number.
    pub phone_number: PhoneNumber,
}

/// A customer as shown in list views, with its live address count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    #[serde(flatten)]
    pub customer: Customer,
    /// Number of addresses the customer owns right now.
    pub address_count: i64,
}
