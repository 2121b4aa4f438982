//! Integration tests for the RocketShoes cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! The tests need no external services: [`MockCatalogApi`] serves the
//! catalog and stock endpoints from an `axum` router bound to a random local
//! port, and carts are persisted into temporary directories.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Router;
use axum::extract::{Path as UrlPath, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use rocketshoes_cart::CartConfig;
use rocketshoes_cart::config::{API_TOKEN_VAR, API_URL_VAR, CART_FILE_VAR};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// How the mock API should misbehave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Answer every request with this status.
    Status(u16),
    /// Answer with 429 and a `Retry-After` header.
    RateLimited { retry_after: u64 },
    /// Answer 200 with a body that is not JSON.
    Garbage,
}

#[derive(Debug, Default)]
struct MockData {
    stock: HashMap<i32, Value>,
    products: HashMap<i32, Value>,
    stock_requests: usize,
    product_requests: usize,
    failure: Option<Failure>,
    last_authorization: Option<String>,
}

#[derive(Clone, Default)]
struct MockState {
    data: Arc<Mutex<MockData>>,
}

impl MockState {
    fn lock(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A catalog API served from memory.
pub struct MockCatalogApi {
    base_url: String,
    state: MockState,
    server: JoinHandle<()>,
}

impl MockCatalogApi {
    /// Bind to a random local port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        let state = MockState::default();

        let app = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock catalog listener");
        let addr = listener.local_addr().expect("mock catalog local address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            server,
        }
    }

    /// Base URL of the running server.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register a product with a given stock level.
    ///
    /// The catalog entry gets a predictable title, price and image.
    pub fn add_product(&self, id: i32, price: f64, stock: i64) {
        self.set_product(json!({
            "id": id,
            "title": format!("Tênis {id}"),
            "price": price,
            "image": format!("https://rocketseat.example/tenis-{id}.jpg"),
        }));
        self.set_stock(id, stock);
    }

    /// Serve `entry` from `/products/{entry.id}`.
    ///
    /// # Panics
    ///
    /// Panics if `entry` has no integer `id`.
    pub fn set_product(&self, entry: Value) {
        let id = entry["id"]
            .as_i64()
            .and_then(|id| i32::try_from(id).ok())
            .expect("product entry needs an integer id");
        self.state.lock().products.insert(id, entry);
    }

    /// Serve `{ "id": id, "amount": amount }` from `/stock/{id}`.
    pub fn set_stock(&self, id: i32, amount: i64) {
        self.state
            .lock()
            .stock
            .insert(id, json!({ "id": id, "amount": amount }));
    }

    /// Make every subsequent request fail, or stop failing with `None`.
    pub fn set_failure(&self, failure: Option<Failure>) {
        self.state.lock().failure = failure;
    }

    /// Number of `/stock` requests served.
    #[must_use]
    pub fn stock_requests(&self) -> usize {
        self.state.lock().stock_requests
    }

    /// Number of `/products` requests served.
    #[must_use]
    pub fn product_requests(&self) -> usize {
        self.state.lock().product_requests
    }

    /// `Authorization` header of the most recent request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        self.state.lock().last_authorization.clone()
    }

    /// Cart configuration pointing at this server and persisting to `cart_file`.
    ///
    /// # Panics
    ///
    /// Panics if the generated configuration is rejected.
    #[must_use]
    pub fn config(&self, cart_file: &Path, token: Option<&str>) -> CartConfig {
        let cart_file = cart_file.to_string_lossy().into_owned();
        CartConfig::from_lookup(|key| match key {
            API_URL_VAR => Some(self.base_url.clone()),
            CART_FILE_VAR => Some(cart_file.clone()),
            API_TOKEN_VAR => token.map(str::to_string),
            _ => None,
        })
        .expect("mock catalog config is valid")
    }
}

impl Drop for MockCatalogApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn stock(
    State(state): State<MockState>,
    UrlPath(id): UrlPath<i32>,
    headers: HeaderMap,
) -> Response {
    let mut data = state.lock();
    data.stock_requests += 1;
    serve(&mut data, &headers, |data| data.stock.get(&id).cloned())
}

async fn product(
    State(state): State<MockState>,
    UrlPath(id): UrlPath<i32>,
    headers: HeaderMap,
) -> Response {
    let mut data = state.lock();
    data.product_requests += 1;
    serve(&mut data, &headers, |data| data.products.get(&id).cloned())
}

fn serve(
    data: &mut MockData,
    headers: &HeaderMap,
    lookup: impl FnOnce(&MockData) -> Option<Value>,
) -> Response {
    data.last_authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match data.failure {
        Some(Failure::Status(code)) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, "mock catalog failure").into_response()
        }
        Some(Failure::RateLimited { retry_after }) => (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after.to_string())],
            "slow down",
        )
            .into_response(),
        Some(Failure::Garbage) => (StatusCode::OK, "<html>not json</html>").into_response(),
        None => lookup(data).map_or_else(
            || StatusCode::NOT_FOUND.into_response(),
            |body| axum::Json(body).into_response(),
        ),
    }
}
