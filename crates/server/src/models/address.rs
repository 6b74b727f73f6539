//! Address domain models.

use serde::{Deserialize, Serialize};

use rolodex_core::{AddressId, CustomerId, PinCode};

/// A stored postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Store-assigned identity, never reused.
    pub id: AddressId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Trimmed street address.
    pub address_details: String,
    /// Trimmed city.
    pub city: String,
    /// Trimmed state.
    pub state: String,
    /// 5 or 6 digit pin code.
    pub pin_code: PinCode,
}

/// An address joined with its owner's name, as returned by address search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressWithCustomer {
    #[serde(flatten)]
    pub address: Address,
    /// Owner's first name.
    pub first_name: String,
    /// Owner's last name.
    pub last_name: String,
}

/// Every address of one customer.
///
/// `has_only_one_address` is derived from `addresses` each time this is
/// built; it is never stored and cannot be set independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAddresses {
    pub addresses: Vec<Address>,
    pub has_only_one_address: bool,
}

impl CustomerAddresses {
    /// Wrap a customer's addresses, deriving the single-address flag.
    #[must_use]
    pub fn new(addresses: Vec<Address>) -> Self {
        let has_only_one_address = addresses.len() == 1;
        Self {
            addresses,
            has_only_one_address,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address(id: i64) -> Address {
        Address {
            id: AddressId::new(id),
            customer_id: CustomerId::new(1),
            address_details: "221B Baker St".to_owned(),
            city: "Mumbai".to_owned(),
            state: "MH".to_owned(),
            pin_code: PinCode::parse("400001").unwrap(),
        }
    }

    #[test]
    fn test_single_address_flag_is_derived() {
        assert!(!CustomerAddresses::new(vec![]).has_only_one_address);
        assert!(CustomerAddresses::new(vec![address(1)]).has_only_one_address);
        assert!(!CustomerAddresses::new(vec![address(1), address(2)]).has_only_one_address);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(CustomerAddresses::new(vec![address(3)])).unwrap();
        assert_eq!(json["hasOnlyOneAddress"], true);
        assert_eq!(json["addresses"][0]["pin_code"], "400001");
        assert_eq!(json["addresses"][0]["customer_id"], 1);
    }

    #[test]
    fn test_search_row_is_flat() {
        let row = AddressWithCustomer {
            address: address(9),
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
        };
        let json = serde_json::to_value(row).unwrap();
        assert_eq!(json["id"], 9);
        assert_eq!(json["city"], "Mumbai");
        assert_eq!(json["first_name"], "Jane");
    }
}
