//! Address repository.

use sqlx::SqlitePool;

use rolodex_core::{AddressId, CustomerId, NewAddress, Page, PageRequest, PinCode};

use super::query::{Filter, PaginatedQuery, Sort, Sortable};
use super::{RepositoryError, customers};
use crate::models::{Address, AddressWithCustomer, CustomerAddresses};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: AddressId,
    customer_id: CustomerId,
    address_details: String,
    city: String,
    state: String,
    pin_code: String,
}

impl TryFrom<AddressRow> for Address {
    type Error = RepositoryError;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        let pin_code = PinCode::parse(&row.pin_code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid pin code in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            customer_id: row.customer_id,
            address_details: row.address_details,
            city: row.city,
            state: row.state,
            pin_code,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AddressWithCustomerRow {
    #[sqlx(flatten)]
    address: AddressRow,
    first_name: String,
    last_name: String,
}

impl TryFrom<AddressWithCustomerRow> for AddressWithCustomer {
    type Error = RepositoryError;

    fn try_from(row: AddressWithCustomerRow) -> Result<Self, Self::Error> {
        Ok(Self {
            address: row.address.try_into()?,
            first_name: row.first_name,
            last_name: row.last_name,
        })
    }
}

// =============================================================================
// Search
// =============================================================================

/// Columns an address search may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSort {
    Id,
    CustomerId,
    AddressDetails,
    City,
    State,
    PinCode,
    FirstName,
    LastName,
}

impl Sortable for AddressSort {
    const DEFAULT: Self = Self::Id;

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "customer_id" => Some(Self::CustomerId),
            "address_details" => Some(Self::AddressDetails),
            "city" => Some(Self::City),
            "state" => Some(Self::State),
            "pin_code" => Some(Self::PinCode),
            "first_name" => Some(Self::FirstName),
            "last_name" => Some(Self::LastName),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "a.id",
            Self::CustomerId => "a.customer_id",
            Self::AddressDetails => "a.address_details",
            Self::City => "a.city",
            Self::State => "a.state",
            Self::PinCode => "a.pin_code",
            Self::FirstName => "c.first_name",
            Self::LastName => "c.last_name",
        }
    }

    fn tie_breaker() -> &'static str {
        "a.id"
    }
}

/// Optional substring filters for address search, AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFilter {
    pub city: Option<String>,
    pub state: Option<String>,
    pub pin_code: Option<String>,
}

const SEARCH_SELECT: &str = "SELECT a.id, a.customer_id, a.address_details, a.city, a.state, \
     a.pin_code, c.first_name, c.last_name";
const SEARCH_FROM: &str = "FROM addresses a JOIN customers c ON a.customer_id = c.id";

// =============================================================================
// Repository
// =============================================================================

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add an address to an existing customer.
    ///
    /// The owner check and the insert share one transaction, so the address
    /// cannot land on a customer deleted in between.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_for_customer(
        &self,
        customer_id: CustomerId,
        input: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if !customers::exists(&mut *tx, customer_id).await? {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        let row: AddressRow = sqlx::query_as(
            r"
            INSERT INTO addresses (customer_id, address_details, city, state, pin_code)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, customer_id, address_details, city, state, pin_code
            ",
        )
        .bind(customer_id)
        .bind(&input.address_details)
        .bind(&input.city)
        .bind(&input.state)
        .bind(input.pin_code.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(address_id = %row.id, customer_id = %customer_id, "address created");
        row.try_into()
    }

    /// Every address of a customer, oldest first.
    ///
    /// A customer with no addresses, or no customer at all, yields an empty
    /// list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<CustomerAddresses, RepositoryError> {
        let rows: Vec<AddressRow> = sqlx::query_as(
            r"
            SELECT id, customer_id, address_details, city, state, pin_code
            FROM addresses
            WHERE customer_id = ?
            ORDER BY id
            ",
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        let addresses = rows
            .into_iter()
            .map(Address::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CustomerAddresses::new(addresses))
    }

    /// Get an address by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AddressId) -> Result<Option<Address>, RepositoryError> {
        let row: Option<AddressRow> = sqlx::query_as(
            r"
            SELECT id, customer_id, address_details, city, state, pin_code
            FROM addresses
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Address::try_from).transpose()
    }

    /// Replace an address's fields. The owner never changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: AddressId,
        input: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let row: Option<AddressRow> = sqlx::query_as(
            r"
            UPDATE addresses
            SET address_details = ?, city = ?, state = ?, pin_code = ?
            WHERE id = ?
            RETURNING id, customer_id, address_details, city, state, pin_code
            ",
        )
        .bind(&input.address_details)
        .bind(&input.city)
        .bind(&input.state)
        .bind(input.pin_code.as_str())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let row = row.ok_or(RepositoryError::NotFound)?;
        tracing::debug!(address_id = %id, "address updated");
        row.try_into()
    }

    /// Delete an address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not exist.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: AddressId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!(address_id = %id, "address deleted");
        Ok(())
    }

    /// Search addresses across all customers, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        filter: &AddressFilter,
        sort: Sort<AddressSort>,
        page: PageRequest,
    ) -> Result<Page<AddressWithCustomer>, RepositoryError> {
        let rows = PaginatedQuery::new(SEARCH_SELECT, SEARCH_FROM, sort, page)
            .filter(Filter::contains(&["a.city"], filter.city.as_deref()))
            .filter(Filter::contains(&["a.state"], filter.state.as_deref()))
            .filter(Filter::contains(&["a.pin_code"], filter.pin_code.as_deref()))
            .fetch::<AddressWithCustomerRow>(self.pool)
            .await?;

        rows.try_map(AddressWithCustomer::try_from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rolodex_core::{AddressInput, CustomerInput, SortOrder};

    use super::*;
    use crate::db::{self, CustomerRepository};

    async fn customer(pool: &SqlitePool, first: &str, phone: &str) -> CustomerId {
        let input = CustomerInput {
            first_name: Some(first.to_owned()),
            last_name: Some("Doe".to_owned()),
            phone_number: Some(phone.to_owned()),
        }
        .validate()
        .unwrap();
        CustomerRepository::new(pool).create(&input).await.unwrap().id
    }

    fn new_address(city: &str, state: &str, pin_code: &str) -> NewAddress {
        AddressInput {
            address_details: Some("221B Baker Street".to_owned()),
            city: Some(city.to_owned()),
            state: Some(state.to_owned()),
            pin_code: Some(pin_code.to_owned()),
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_for_missing_customer() {
        let pool = db::in_memory().await.unwrap();
        let repo = AddressRepository::new(&pool);

        let err = repo
            .create_for_customer(CustomerId::new(42), &new_address("Pune", "MH", "411001"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM addresses")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_has_only_one_address() {
        let pool = db::in_memory().await.unwrap();
        let repo = AddressRepository::new(&pool);
        let jane = customer(&pool, "Jane", "9876543210").await;

        let listed = repo.list_for_customer(jane).await.unwrap();
        assert!(listed.addresses.is_empty());
        assert!(!listed.has_only_one_address);

        let first = repo
            .create_for_customer(jane, &new_address("Pune", "MH", "411001"))
            .await
            .unwrap();
        assert!(repo.list_for_customer(jane).await.unwrap().has_only_one_address);

        let second = repo
            .create_for_customer(jane, &new_address("Mumbai", "MH", "40001"))
            .await
            .unwrap();
        let listed = repo.list_for_customer(jane).await.unwrap();
        assert!(!listed.has_only_one_address);
        let ids: Vec<_> = listed.addresses.iter().map(|a| a.id).collect();
        assert_eq!(ids, [first.id, second.id]);

        repo.delete(first.id).await.unwrap();
        assert!(repo.list_for_customer(jane).await.unwrap().has_only_one_address);
    }

    #[tokio::test]
    async fn test_update_keeps_owner() {
        let pool = db::in_memory().await.unwrap();
        let repo = AddressRepository::new(&pool);
        let jane = customer(&pool, "Jane", "9876543210").await;
        let address = repo
            .create_for_customer(jane, &new_address("Pune", "MH", "411001"))
            .await
            .unwrap();

        let updated = repo
            .update(address.id, &new_address("Bengaluru", "KA", "560001"))
            .await
            .unwrap();
        assert_eq!(updated.id, address.id);
        assert_eq!(updated.customer_id, jane);
        assert_eq!(updated.city, "Bengaluru");
        assert_eq!(repo.get(address.id).await.unwrap(), Some(updated));

        let err = repo
            .update(AddressId::new(999), &new_address("Pune", "MH", "411001"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_missing() {
        let pool = db::in_memory().await.unwrap();
        let repo = AddressRepository::new(&pool);
        assert!(matches!(
            repo.delete(AddressId::new(1)).await.unwrap_err(),
            RepositoryError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_search_filters_and_sorts() {
        let pool = db::in_memory().await.unwrap();
        let repo = AddressRepository::new(&pool);
        let jane = customer(&pool, "Jane", "9876543210").await;
        let zoe = customer(&pool, "Zoe", "9123456789").await;

        repo.create_for_customer(jane, &new_address("Pune", "Maharashtra", "411001"))
            .await
            .unwrap();
        repo.create_for_customer(zoe, &new_address("Mumbai", "Maharashtra", "400001"))
            .await
            .unwrap();
        repo.create_for_customer(zoe, &new_address("Chennai", "Tamil Nadu", "600001"))
            .await
            .unwrap();

        let filter = AddressFilter {
            state: Some("maha".to_owned()),
            ..AddressFilter::default()
        };
        let sort = Sort {
            column: AddressSort::FirstName,
            order: SortOrder::Desc,
        };
        let page = repo
            .search(&filter, sort, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        let rows: Vec<_> = page
            .data
            .iter()
            .map(|a| (a.first_name.as_str(), a.address.city.as_str()))
            .collect();
        assert_eq!(rows, [("Zoe", "Mumbai"), ("Jane", "Pune")]);

        let filter = AddressFilter {
            state: Some("Maharashtra".to_owned()),
            pin_code: Some("4110".to_owned()),
            ..AddressFilter::default()
        };
        let page = repo
            .search(&filter, Sort::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data.first().map(|a| a.address.customer_id), Some(jane));
    }

    #[tokio::test]
    async fn test_search_pages_partition_results() {
        let pool = db::in_memory().await.unwrap();
        let repo = AddressRepository::new(&pool);
        let jane = customer(&pool, "Jane", "9876543210").await;
        for _ in 0..5 {
            repo.create_for_customer(jane, &new_address("Pune", "MH", "411001"))
                .await
                .unwrap();
        }

        let mut seen = Vec::new();
        for page in 1..=3 {
            let result = repo
                .search(
                    &AddressFilter::default(),
                    Sort::default(),
                    PageRequest::new(page, 2).unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(result.total, 5);
            assert_eq!(result.total_pages, 3);
            seen.extend(result.data.into_iter().map(|a| a.address.id));
        }
        let expected: Vec<_> = (1..=5).map(AddressId::new).collect();
        assert_eq!(seen, expected);
    }
}
