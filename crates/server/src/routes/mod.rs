//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                         - Liveness
//! GET    /health/ready                   - Readiness (database reachable)
//!
//! # Customers
//! POST   /api/customers                  - Create customer
//! GET    /api/customers                  - List customers (search, sort, page)
//! GET    /api/customers/{id}             - Customer detail
//! PUT    /api/customers/{id}             - Update customer
//! DELETE /api/customers/{id}             - Delete customer and its addresses
//!
//! # Addresses
//! POST   /api/customers/{id}/addresses   - Add address to customer
//! GET    /api/customers/{id}/addresses   - Customer's addresses
//! GET    /api/addresses                  - Search addresses (filter, sort, page)
//! GET    /api/addresses/{addressId}      - Address detail
//! PUT    /api/addresses/{addressId}      - Update address
//! DELETE /api/addresses/{addressId}      - Delete address
//! ```

pub mod addresses;
pub mod customers;
pub mod health;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Build the full route table.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(customers::router())
        .merge(addresses::router())
}

/// Acknowledgement body for updates and deletes.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Body returned with `201 Created`.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    pub id: i64,
}
