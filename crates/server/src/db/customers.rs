//! Customer repository.
//!
//! Deleting a customer removes its addresses first, in the same transaction,
//! so no address can outlive its owner.

use sqlx::SqlitePool;

use rolodex_core::{CustomerId, NewCustomer, Page, PageRequest, PhoneNumber};

use super::query::{Filter, PaginatedQuery, Sort, Sortable};
use super::{RepositoryError, conflict_on_unique};
use crate::models::{Customer, CustomerSummary};

const DUPLICATE_PHONE: &str = "Phone number already exists";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for customer queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: CustomerId,
    first_name: String,
    last_name: String,
    phone_number: String,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let phone_number = PhoneNumber::parse(&row.phone_number).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone number in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            phone_number,
        })
    }
}

/// Internal row type for the customer list, with the derived address count.
#[derive(Debug, sqlx::FromRow)]
struct CustomerSummaryRow {
    #[sqlx(flatten)]
    customer: CustomerRow,
    address_count: i64,
}

impl TryFrom<CustomerSummaryRow> for CustomerSummary {
    type Error = RepositoryError;

    fn try_from(row: CustomerSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            customer: row.customer.try_into()?,
            address_count: row.address_count,
        })
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Columns a customer list may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerSort {
    Id,
    FirstName,
    LastName,
    PhoneNumber,
}

impl Sortable for CustomerSort {
    const DEFAULT: Self = Self::Id;

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "first_name" => Some(Self::FirstName),
            "last_name" => Some(Self::LastName),
            "phone_number" => Some(Self::PhoneNumber),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "c.id",
            Self::FirstName => "c.first_name",
            Self::LastName => "c.last_name",
            Self::PhoneNumber => "c.phone_number",
        }
    }

    fn tie_breaker() -> &'static str {
        "c.id"
    }
}

/// Optional filters for the customer list.
///
/// `search` matches a substring of the first name, last name or phone
/// number. The address filters keep customers owning at least one address
/// that matches all of them. Matching is ASCII case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerFilter {
    pub search: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pin_code: Option<String>,
}

impl CustomerFilter {
    fn address_filter(&self) -> Option<Filter> {
        let filters: Vec<Filter> = [
            Filter::contains(&["fa.city"], self.city.as_deref()),
            Filter::contains(&["fa.state"], self.state.as_deref()),
            Filter::contains(&["fa.pin_code"], self.pin_code.as_deref()),
        ]
        .into_iter()
        .flatten()
        .collect();

        (!filters.is_empty()).then_some(Filter::Exists {
            from: "addresses fa",
            correlation: "fa.customer_id = c.id",
            filters,
        })
    }
}

const LIST_SELECT: &str = "SELECT c.id, c.first_name, c.last_name, c.phone_number, \
     (SELECT COUNT(*) FROM addresses ca WHERE ca.customer_id = c.id) AS address_count";
const LIST_FROM: &str = "FROM customers c";
const SEARCH_COLUMNS: &[&str] = &["c.first_name", "c.last_name", "c.phone_number"];

// =============================================================================
// Repository
// =============================================================================

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the phone number is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &NewCustomer) -> Result<Customer, RepositoryError> {
        let row: CustomerRow = sqlx::query_as(
            r"
            INSERT INTO customers (first_name, last_name, phone_number)
            VALUES (?, ?, ?)
            RETURNING id, first_name, last_name, phone_number
            ",
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.phone_number.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_PHONE))?;

        tracing::debug!(customer_id = %row.id, "customer created");
        row.try_into()
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r"
            SELECT id, first_name, last_name, phone_number
            FROM customers
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Customer::try_from).transpose()
    }

    /// Replace a customer's name and phone number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    /// Returns `RepositoryError::Conflict` if the phone number belongs to
    /// another customer.
    pub async fn update(
        &self,
        id: CustomerId,
        input: &NewCustomer,
    ) -> Result<Customer, RepositoryError> {
        let row: Option<CustomerRow> = sqlx::query_as(
            r"
            UPDATE customers
            SET first_name = ?, last_name = ?, phone_number = ?
            WHERE id = ?
            RETURNING id, first_name, last_name, phone_number
            ",
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.phone_number.as_str())
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_PHONE))?;

        let row = row.ok_or(RepositoryError::NotFound)?;
        tracing::debug!(customer_id = %id, "customer updated");
        row.try_into()
    }

    /// Delete a customer and every address it owns.
    ///
    /// Both deletes run in one transaction: either the customer and all of
    /// its addresses are gone, or nothing changed. Returns the number of
    /// addresses removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    /// Returns `RepositoryError::Database` if either delete fails.
    pub async fn delete(&self, id: CustomerId) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let addresses = sqlx::query("DELETE FROM addresses WHERE customer_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let customers = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if customers == 0 {
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        tracing::debug!(customer_id = %id, addresses, "customer deleted");
        Ok(addresses)
    }

    /// List customers one page at a time.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &CustomerFilter,
        sort: Sort<CustomerSort>,
        page: PageRequest,
    ) -> Result<Page<CustomerSummary>, RepositoryError> {
        let rows = PaginatedQuery::new(LIST_SELECT, LIST_FROM, sort, page)
            .filter(Filter::contains(SEARCH_COLUMNS, filter.search.as_deref()))
            .filter(filter.address_filter())
            .fetch::<CustomerSummaryRow>(self.pool)
            .await?;

        rows.try_map(CustomerSummary::try_from)
    }
}

/// Whether a customer row exists, checked on an open connection or transaction.
pub(crate) async fn exists(
    conn: &mut sqlx::SqliteConnection,
    id: CustomerId,
) -> Result<bool, RepositoryError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM customers WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rolodex_core::{CustomerInput, SortOrder};

    use super::*;
    use crate::db;

    fn new_customer(first: &str, last: &str, phone: &str) -> NewCustomer {
        CustomerInput {
            first_name: Some(first.to_owned()),
            last_name: Some(last.to_owned()),
            phone_number: Some(phone.to_owned()),
        }
        .validate()
        .unwrap()
    }

    async fn address_count(pool: &SqlitePool, id: CustomerId) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM addresses WHERE customer_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn add_address(pool: &SqlitePool, id: CustomerId, city: &str) {
        sqlx::query(
            "INSERT INTO addresses (customer_id, address_details, city, state, pin_code) \
             VALUES (?, '1 Main Street', ?, 'MH', '400001')",
        )
        .bind(id)
        .bind(city)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let pool = db::in_memory().await.unwrap();
        let repo = CustomerRepository::new(&pool);

        let created = repo
            .create(&new_customer(" Jane ", "Doe ", "9876543210"))
            .await
            .unwrap();
        assert_eq!(created.id, CustomerId::new(1));

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.first_name, "Jane");
        assert_eq!(fetched.last_name, "Doe");
    }

    #[tokio::test]
    async fn test_duplicate_phone_is_conflict() {
        let pool = db::in_memory().await.unwrap();
        let repo = CustomerRepository::new(&pool);

        repo.create(&new_customer("Jane", "Doe", "9876543210"))
            .await
            .unwrap();
        let err = repo
            .create(&new_customer("John", "Roe", "9876543210"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_update_missing_and_conflicting() {
        let pool = db::in_memory().await.unwrap();
        let repo = CustomerRepository::new(&pool);

        let jane = repo
            .create(&new_customer("Jane", "Doe", "9876543210"))
            .await
            .unwrap();
        repo.create(&new_customer("John", "Roe", "9123456789"))
            .await
            .unwrap();

        let err = repo
            .update(CustomerId::new(99), &new_customer("Ann", "Lee", "9000000000"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));

        let err = repo
            .update(jane.id, &new_customer("Jane", "Doe", "9123456789"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        // Keeping your own phone number is not a conflict.
        let updated = repo
            .update(jane.id, &new_customer("Janet", "Doe", "9876543210"))
            .await
            .unwrap();
        assert_eq!(updated.first_name, "Janet");
    }

    #[tokio::test]
    async fn test_delete_cascades_to_addresses() {
        let pool = db::in_memory().await.unwrap();
        let repo = CustomerRepository::new(&pool);

        let jane = repo
            .create(&new_customer("Jane", "Doe", "9876543210"))
            .await
            .unwrap();
        let john = repo
            .create(&new_customer("John", "Roe", "9123456789"))
            .await
            .unwrap();
        add_address(&pool, jane.id, "Mumbai").await;
        add_address(&pool, jane.id, "Pune").await;
        add_address(&pool, john.id, "Delhi").await;

        assert_eq!(repo.delete(jane.id).await.unwrap(), 2);
        assert!(repo.get(jane.id).await.unwrap().is_none());
        assert_eq!(address_count(&pool, jane.id).await, 0);
        assert_eq!(address_count(&pool, john.id).await, 1);

        assert!(matches!(
            repo.delete(jane.id).await.unwrap_err(),
            RepositoryError::NotFound
        ));
    }

    #[tokio::test]
    async fn test_list_search_and_address_filters() {
        let pool = db::in_memory().await.unwrap();
        let repo = CustomerRepository::new(&pool);

        let jane = repo
            .create(&new_customer("Jane", "Doe", "9876543210"))
            .await
            .unwrap();
        let john = repo
            .create(&new_customer("John", "Roe", "9123456789"))
            .await
            .unwrap();
        repo.create(&new_customer("Alice", "Janeway", "9000000001"))
            .await
            .unwrap();
        add_address(&pool, jane.id, "Mumbai").await;
        add_address(&pool, jane.id, "Pune").await;
        add_address(&pool, john.id, "Navi Mumbai").await;

        let search = CustomerFilter {
            search: Some("jane".to_owned()),
            ..CustomerFilter::default()
        };
        let page = repo
            .list(&search, Sort::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2, "first and last names, case-insensitive");

        let by_phone = CustomerFilter {
            search: Some("912345".to_owned()),
            ..CustomerFilter::default()
        };
        let page = repo
            .list(&by_phone, Sort::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);

        let by_city = CustomerFilter {
            city: Some("mumbai".to_owned()),
            ..CustomerFilter::default()
        };
        let sort = Sort {
            column: CustomerSort::FirstName,
            order: SortOrder::Desc,
        };
        let page = repo
            .list(&by_city, sort, PageRequest::default())
            .await
            .unwrap();
        let names: Vec<_> = page
            .data
            .iter()
            .map(|c| (c.customer.first_name.as_str(), c.address_count))
            .collect();
        assert_eq!(names, [("John", 1), ("Jane", 2)]);
    }

    #[tokio::test]
    async fn test_address_filters_match_one_address() {
        let pool = db::in_memory().await.unwrap();
        let repo = CustomerRepository::new(&pool);
        let jane = repo
            .create(&new_customer("Jane", "Doe", "9876543210"))
            .await
            .unwrap();
        add_address(&pool, jane.id, "Mumbai").await;

        // City and state match the same address.
        let filter = CustomerFilter {
            city: Some("Mumbai".to_owned()),
            state: Some("MH".to_owned()),
            ..CustomerFilter::default()
        };
        let page = repo
            .list(&filter, Sort::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);

        let filter = CustomerFilter {
            city: Some("Mumbai".to_owned()),
            state: Some("KA".to_owned()),
            ..CustomerFilter::default()
        };
        let page = repo
            .list(&filter, Sort::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }
}
