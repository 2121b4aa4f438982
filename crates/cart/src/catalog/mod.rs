//! Catalog and stock lookups.
//!
//! # Architecture
//!
//! - [`Catalog`] is the seam the cart talks to; tests substitute their own
//! - [`HttpCatalog`] reads the catalog API over HTTP with `reqwest`
//! - Catalog entries are cached in memory via `moka` (5 minute TTL)
//! - Stock levels are never cached: every cart mutation sees a fresh value
//!
//! # Endpoints
//!
//! - `GET /stock/{id}` - `{ "amount": 3 }`
//! - `GET /products/{id}` - the product's catalog entry
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::catalog::{Catalog, HttpCatalog};
//!
//! let catalog = HttpCatalog::new(&config)?;
//! let stock = catalog.stock(ProductId::new(1)).await?;
//! ```

mod http;

pub use http::HttpCatalog;

use std::future::Future;
use std::sync::Arc;

use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when reading the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Client could not be configured.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// The API answered with a different product than the one requested.
    #[error("Requested product {requested}, catalog returned product {returned}")]
    MismatchedProduct {
        requested: ProductId,
        returned: ProductId,
    },
}

/// Read access to product data and stock levels.
pub trait Catalog: Send + Sync {
    /// Current stock for a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send;

    /// Catalog entry for a product.
    fn product(&self, id: ProductId)
    -> impl Future<Output = Result<Product, CatalogError>> + Send;
}

impl<T: Catalog> Catalog for Arc<T> {
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, CatalogError>> + Send {
        (**self).stock(id)
    }

    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Product, CatalogError>> + Send {
        (**self).product(id)
    }
}
