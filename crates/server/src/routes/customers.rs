//! Customer API handlers.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use rolodex_core::{CustomerId, CustomerInput, Page, PageRequest};

use super::{CreatedResponse, MessageResponse};
use crate::db::{CustomerFilter, CustomerRepository, Sort};
use crate::error::{AppError, Result};
use crate::models::{Customer, CustomerSummary};
use crate::state::AppState;

const CUSTOMER_NOT_FOUND: &str = "Customer not found";

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list_customers).post(create_customer))
        .route(
            "/api/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

/// Query parameters for the customer list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "pin_code")]
    pub pin_code: Option<String>,
}

/// Create a customer.
///
/// # Errors
///
/// Returns 400 for an invalid payload and 409 if the phone number is taken.
#[instrument(skip(state, payload))]
pub async fn create_customer(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CustomerInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let Json(input) = payload?;
    let customer = input.validate()?;

    let created = CustomerRepository::new(state.pool()).create(&customer).await?;
    tracing::info!(customer_id = %created.id, "customer created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Customer created successfully",
            id: created.id.as_i64(),
        }),
    ))
}

/// List customers with search, address filters, sorting and pagination.
///
/// # Errors
///
/// Returns 400 for out-of-range paging or an unknown sort column.
#[instrument(skip(state))]
pub async fn list_customers(
    State(state): State<AppState>,
    query: std::result::Result<Query<CustomerListQuery>, QueryRejection>,
) -> Result<Json<Page<CustomerSummary>>> {
    let Query(query) = query?;
    let page = PageRequest::from_query(query.page, query.limit)?;
    let sort = Sort::from_query(query.sort_by.as_deref(), query.sort_order.as_deref())?;
    let filter = CustomerFilter {
        search: query.search,
        city: query.city,
        state: query.state,
        pin_code: query.pin_code,
    };

    let customers = CustomerRepository::new(state.pool())
        .list(&filter, sort, page)
        .await?;
    Ok(Json(customers))
}

/// Get one customer.
///
/// # Errors
///
/// Returns 400 for a malformed ID and 404 if the customer does not exist.
#[instrument(skip(state))]
pub async fn get_customer(
    State(state): State<AppState>,
    id: std::result::Result<Path<CustomerId>, PathRejection>,
) -> Result<Json<Customer>> {
    let Path(id) = id?;
    CustomerRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(CUSTOMER_NOT_FOUND))
}

/// Replace a customer's name and phone number.
///
/// # Errors
///
/// Returns 400 for an invalid payload, 404 if the customer does not exist and
/// 409 if the phone number belongs to another customer.
#[instrument(skip(state, payload))]
pub async fn update_customer(
    State(state): State<AppState>,
    id: std::result::Result<Path<CustomerId>, PathRejection>,
    payload: std::result::Result<Json<CustomerInput>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let customer = input.validate()?;

    CustomerRepository::new(state.pool())
        .update(id, &customer)
        .await
        .map_err(|e| AppError::from_repository(e, CUSTOMER_NOT_FOUND))?;
    tracing::info!(customer_id = %id, "customer updated");

    Ok(Json(MessageResponse {
        message: "Customer updated successfully",
    }))
}

/// Delete a customer and all of its addresses.
///
/// # Errors
///
/// Returns 400 for a malformed ID and 404 if the customer does not exist.
#[instrument(skip(state))]
pub async fn delete_customer(
    State(state): State<AppState>,
    id: std::result::Result<Path<CustomerId>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(id) = id?;
    let addresses = CustomerRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| AppError::from_repository(e, CUSTOMER_NOT_FOUND))?;
    tracing::info!(customer_id = %id, addresses, "customer deleted");

    Ok(Json(MessageResponse {
        message: "Customer deleted successfully",
    }))
}
