//! Address API handlers.

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

use rolodex_core::{AddressId, AddressInput, CustomerId, Page, PageRequest};

use super::{CreatedResponse, MessageResponse};
use crate::db::{AddressFilter, AddressRepository, Sort};
use crate::error::{AppError, Result};
use crate::models::{Address, AddressWithCustomer, CustomerAddresses};
use crate::state::AppState;

const ADDRESS_NOT_FOUND: &str = "Address not found";

/// Build the addresses router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/customers/{id}/addresses",
            get(list_customer_addresses).post(create_address),
        )
        .route("/api/addresses", get(search_addresses))
        .route(
            "/api/addresses/{address_id}",
            get(get_address).put(update_address).delete(delete_address),
        )
}

/// Query parameters for address search.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSearchQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(rename = "pin_code")]
    pub pin_code: Option<String>,
}

/// Add an address to a customer.
///
/// # Errors
///
/// Returns 400 for an invalid payload and 404 if the customer does not exist.
#[instrument(skip(state, payload))]
pub async fn create_address(
    State(state): State<AppState>,
    customer_id: std::result::Result<Path<CustomerId>, PathRejection>,
    payload: std::result::Result<Json<AddressInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>)> {
    let Path(customer_id) = customer_id?;
    let Json(input) = payload?;
    let address = input.validate()?;

    let created = AddressRepository::new(state.pool())
        .create_for_customer(customer_id, &address)
        .await
        .map_err(|e| AppError::from_repository(e, "Customer not found"))?;
    tracing::info!(address_id = %created.id, customer_id = %customer_id, "address created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Address created successfully",
            id: created.id.as_i64(),
        }),
    ))
}

/// Every address of one customer, with the single-address flag.
///
/// # Errors
///
/// Returns 400 for a malformed ID.
#[instrument(skip(state))]
pub async fn list_customer_addresses(
    State(state): State<AppState>,
    customer_id: std::result::Result<Path<CustomerId>, PathRejection>,
) -> Result<Json<CustomerAddresses>> {
    let Path(customer_id) = customer_id?;
    let addresses = AddressRepository::new(state.pool())
        .list_for_customer(customer_id)
        .await?;
    Ok(Json(addresses))
}

/// Search addresses across all customers.
///
/// # Errors
///
/// Returns 400 for out-of-range paging or an unknown sort column.
#[instrument(skip(state))]
pub async fn search_addresses(
    State(state): State<AppState>,
    query: std::result::Result<Query<AddressSearchQuery>, QueryRejection>,
) -> Result<Json<Page<AddressWithCustomer>>> {
    let Query(query) = query?;
    let page = PageRequest::from_query(query.page, query.limit)?;
    let sort = Sort::from_query(query.sort_by.as_deref(), query.sort_order.as_deref())?;
    let filter = AddressFilter {
        city: query.city,
        state: query.state,
        pin_code: query.pin_code,
    };

    let addresses = AddressRepository::new(state.pool())
        .search(&filter, sort, page)
        .await?;
    Ok(Json(addresses))
}

/// Get one address.
///
/// # Errors
///
/// Returns 400 for a malformed ID and 404 if the address does not exist.
#[instrument(skip(state))]
pub async fn get_address(
    State(state): State<AppState>,
    address_id: std::result::Result<Path<AddressId>, PathRejection>,
) -> Result<Json<Address>> {
    let Path(address_id) = address_id?;
    AddressRepository::new(state.pool())
        .get(address_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(ADDRESS_NOT_FOUND))
}

/// Replace an address's fields.
///
/// # Errors
///
/// Returns 400 for an invalid payload and 404 if the address does not exist.
#[instrument(skip(state, payload))]
pub async fn update_address(
    State(state): State<AppState>,
    address_id: std::result::Result<Path<AddressId>, PathRejection>,
    payload: std::result::Result<Json<AddressInput>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(address_id) = address_id?;
    let Json(input) = payload?;
    let address = input.validate()?;

    AddressRepository::new(state.pool())
        .update(address_id, &address)
        .await
        .map_err(|e| AppError::from_repository(e, ADDRESS_NOT_FOUND))?;
    tracing::info!(address_id = %address_id, "address updated");

    Ok(Json(MessageResponse {
        message: "Address updated successfully",
    }))
}

/// Delete one address.
///
/// # Errors
///
/// Returns 400 for a malformed ID and 404 if the address does not exist.
#[instrument(skip(state))]
pub async fn delete_address(
    State(state): State<AppState>,
    address_id: std::result::Result<Path<AddressId>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(address_id) = address_id?;
    AddressRepository::new(state.pool())
        .delete(address_id)
        .await
        .map_err(|e| AppError::from_repository(e, ADDRESS_NOT_FOUND))?;
    tracing::info!(address_id = %address_id, "address deleted");

    Ok(Json(MessageResponse {
        message: "Address deleted successfully",
    }))
}
