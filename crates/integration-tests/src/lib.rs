//! Integration tests for Rolodex.
//!
//! Each test builds the full application router over a fresh in-memory
//! database and drives it in-process with `tower::ServiceExt::oneshot`. No
//! server, port or external database is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rolodex-integration-tests
//! ```

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower::ServiceExt;

use rolodex_server::{app, db, state::AppState};

/// A response with its body decoded.
///
/// JSON bodies are parsed; anything else is kept as a JSON string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The `error` message of an error body.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    /// The `id` of a `201 Created` body.
    #[must_use]
    pub fn id(&self) -> Option<i64> {
        self.body.get("id").and_then(Value::as_i64)
    }
}

/// The application over its own in-memory database.
pub struct TestApp {
    router: Router,
    pool: SqlitePool,
}

impl TestApp {
    /// Build the app over a fresh, migrated in-memory database.
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created.
    pub async fn new() -> Self {
        let pool = db::in_memory()
            .await
            .expect("Failed to create in-memory database");
        let router = app(AppState::new(pool.clone()));
        Self { router, pool }
    }

    /// The database behind the app.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Send one request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    pub async fn request(&self, method: Method, uri: &str, body: Option<&Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router failed");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: &Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: &Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    // =========================================================================
    // Fixtures
    // =========================================================================

    /// Create a customer and return its ID.
    ///
    /// # Panics
    ///
    /// Panics unless the API answers `201 Created`.
    pub async fn create_customer(&self, first_name: &str, last_name: &str, phone: &str) -> i64 {
        let resp = self
            .post(
                "/api/customers",
                &json!({
                    "first_name": first_name,
                    "last_name": last_name,
                    "phone_number": phone,
                }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "create customer: {:?}", resp.body);
        resp.id().expect("created customer has an id")
    }

    /// Create an address under a customer and return its ID.
    ///
    /// # Panics
    ///
    /// Panics unless the API answers `201 Created`.
    pub async fn create_address(
        &self,
        customer_id: i64,
        city: &str,
        state: &str,
        pin_code: &str,
    ) -> i64 {
        let resp = self
            .post(
                &format!("/api/customers/{customer_id}/addresses"),
                &json!({
                    "address_details": "221B Baker St",
                    "city": city,
                    "state": state,
                    "pin_code": pin_code,
                }),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "create address: {:?}", resp.body);
        resp.id().expect("created address has an id")
    }
}
