//! Cart line items.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// One product in the cart together with its quantity.
///
/// Serializes as a flat object: the catalog fields plus `amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// The catalog entry this line was created from.
    #[serde(flatten)]
    pub product: Product,
    /// Quantity in the cart. Always greater than zero.
    pub amount: u32,
}

impl LineItem {
    /// Create a line item.
    #[must_use]
    pub const fn new(product: Product, amount: u32) -> Self {
        Self { product, amount }
    }

    /// The product ID of this line.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// A copy of this line with a different quantity.
    #[must_use]
    pub fn with_amount(&self, amount: u32) -> Self {
        Self {
            product: self.product.clone(),
            amount,
        }
    }

    /// Unit price times quantity. A line without a price contributes zero.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.product.unit_price().times(self.amount)
    }
}
