//! HTTP client for the catalog and stock API.
//!
//! Uses `reqwest` 0.13 for HTTP. Caches catalog entries using `moka`
//! (5-minute TTL); stock is always fetched fresh.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rocketshoes_core::{Product, ProductId, Stock};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{Catalog, CatalogError};
use crate::config::CartConfig;

/// Longest response body excerpt carried in an error.
const ERROR_BODY_LIMIT: usize = 200;

/// Longest response body excerpt written to the log.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// HttpCatalog
// =============================================================================

/// Client for the catalog API.
///
/// Cheap to clone; clones share the HTTP connection pool and product cache.
#[derive(Clone)]
pub struct HttpCatalog {
    inner: Arc<HttpCatalogInner>,
}

struct HttpCatalogInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<ProductId, Product>,
}

impl HttpCatalog {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &CartConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| CatalogError::InvalidConfig(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()?;

        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(HttpCatalogInner {
                client,
                base_url: directory_url(&config.api_url),
                products,
            }),
        })
    }

    /// Build the URL for a path relative to the API base.
    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Execute a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CatalogError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.path().to_string()));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %excerpt(&response_text, LOG_BODY_LIMIT),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: excerpt(&response_text, ERROR_BODY_LIMIT),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                url = %url,
                body = %excerpt(&response_text, LOG_BODY_LIMIT),
                "Failed to parse catalog API response"
            );
            CatalogError::Parse(e)
        })
    }

    // =========================================================================
    // Stock Methods
    // =========================================================================

    /// Get the current stock for a product. Never cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the product has no stock record or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        let url = self.endpoint(&format!("stock/{id}"))?;
        let stock: Stock = self.get_json(url).await?;
        debug!(amount = stock.amount, "Fetched stock");
        Ok(stock)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product's catalog entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        // Check cache
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let url = self.endpoint(&format!("products/{id}"))?;
        let product: Product = self.get_json(url).await?;

        if product.id != id {
            return Err(CatalogError::MismatchedProduct {
                requested: id,
                returned: product.id,
            });
        }

        // Cache the result
        self.inner.products.insert(id, product.clone()).await;

        Ok(product)
    }
}

impl Catalog for HttpCatalog {
    async fn stock(&self, id: ProductId) -> Result<Stock, CatalogError> {
        self.get_stock(id).await
    }

    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.get_product(id).await
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Make sure the base URL ends in `/` so `join` appends instead of replacing
/// the last path segment.
fn directory_url(url: &Url) -> Url {
    let mut base = url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

fn excerpt(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}
