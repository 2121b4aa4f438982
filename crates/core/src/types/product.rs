//! Catalog entries and stock levels as served by the catalog API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ProductId;
use super::price::Price;

/// A product as returned by `GET /products/{id}`.
///
/// Only `id` is required. Fields the cart does not use are kept in `extra` so
/// a cart persisted from this entry carries everything the catalog sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog ID.
    pub id: ProductId,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Unit price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// Image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Any other catalog fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Create a product with no extra catalog fields.
    #[must_use]
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        price: Price,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: Some(title.into()),
            price: Some(price),
            image: Some(image.into()),
            extra: Map::new(),
        }
    }

    /// Unit price, zero when the catalog sent none.
    #[must_use]
    pub fn unit_price(&self) -> Price {
        self.price.unwrap_or_default()
    }
}

/// Available quantity for a product, as returned by `GET /stock/{id}`.
///
/// Zero or negative means nothing can be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Units available.
    pub amount: i64,
}
