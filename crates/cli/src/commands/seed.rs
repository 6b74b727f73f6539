//! Seed the database with demo customers and addresses.
//!
//! Demo rows are deterministic: customer `i` always gets the same name, phone
//! number and addresses, so reseeding skips customers that already exist
//! instead of duplicating them. Every row goes through the same validation
//! and repositories as the API.

use sqlx::SqlitePool;
use tracing::{info, warn};

use rolodex_core::{AddressInput, CustomerInput};
use rolodex_server::db::{self, AddressRepository, CustomerRepository, RepositoryError};

use super::{CommandError, connect};

/// Demo phone numbers are `9` followed by nine digits, which caps the run size.
pub const MAX_CUSTOMERS: u32 = 900_000_000;

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Priya", "Rohan", "Ananya", "Vikram", "Meera", "Arjun", "Kavya", "Ishaan", "Diya",
];
const LAST_NAMES: &[&str] = &[
    "Sharma", "Iyer", "Patel", "Reddy", "Nair", "Gupta", "Menon", "Kapoor",
];
const PLACES: &[(&str, &str, &str)] = &[
    ("Mumbai", "Maharashtra", "400001"),
    ("Pune", "Maharashtra", "411001"),
    ("Bengaluru", "Karnataka", "560001"),
    ("Chennai", "Tamil Nadu", "600001"),
    ("Hyderabad", "Telangana", "500001"),
    ("Kochi", "Kerala", "682001"),
    ("Jaipur", "Rajasthan", "302001"),
];

/// What a seeding run did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers: u32,
    pub addresses: u32,
    pub skipped: u32,
}

/// Seed the configured database.
///
/// # Errors
///
/// Returns an error if the database cannot be opened, migrated, or written.
pub async fn run(customers: u32) -> Result<(), CommandError> {
    let pool = connect().await?;
    db::run_migrations(&pool).await?;

    let summary = seed(&pool, customers).await?;
    info!(
        customers = summary.customers,
        addresses = summary.addresses,
        skipped = summary.skipped,
        "Seeding complete!"
    );
    Ok(())
}

/// Insert `count` demo customers, each with one or two addresses.
///
/// # Errors
///
/// Returns an error if a write fails for any reason other than the demo
/// customer already existing.
pub async fn seed(pool: &SqlitePool, count: u32) -> Result<SeedSummary, CommandError> {
    let customers = CustomerRepository::new(pool);
    let addresses = AddressRepository::new(pool);
    let mut summary = SeedSummary::default();

    for i in 0..count {
        let input = demo_customer(i).validate()?;
        let customer = match customers.create(&input).await {
            Ok(customer) => customer,
            Err(RepositoryError::Conflict(_)) => {
                warn!(phone_number = %input.phone_number, "demo customer exists, skipping");
                summary.skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        summary.customers += 1;

        for address in demo_addresses(i) {
            addresses
                .create_for_customer(customer.id, &address.validate()?)
                .await?;
            summary.addresses += 1;
        }
    }

    Ok(summary)
}

/// The `i`th demo customer.
fn demo_customer(i: u32) -> CustomerInput {
    let n = i as usize;
    CustomerInput {
        first_name: Some(pick(FIRST_NAMES, n).to_string()),
        last_name: Some(pick(LAST_NAMES, n / FIRST_NAMES.len() + n).to_string()),
        phone_number: Some(format!("9{:09}", 100_000_000 + u64::from(i))),
    }
}

/// The `i`th demo customer's addresses: two for every third customer.
fn demo_addresses(i: u32) -> Vec<AddressInput> {
    let n = i as usize;
    let count = if i % 3 == 0 { 2 } else { 1 };
    (0..count)
        .map(|k| {
            let (city, state, pin_code) = pick(PLACES, n + k * 3);
            AddressInput {
                address_details: Some(format!("{} MG Road, Block {}", 10 + n, k + 1)),
                city: Some((*city).to_string()),
                state: Some((*state).to_string()),
                pin_code: Some((*pin_code).to_string()),
            }
        })
        .collect()
}

#[allow(clippy::indexing_slicing)] // every demo list is non-empty
fn pick<T>(items: &[T], n: usize) -> &T {
    &items[n % items.len()]
}
