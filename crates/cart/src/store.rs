//! The cart itself.
//!
//! [`CartStore`] owns the in-memory line items and keeps them mirrored to a
//! single storage entry. Each mutating operation builds a new sequence,
//! writes it to storage, and only then replaces the in-memory copy, so a
//! failed operation leaves both untouched.
//!
//! Mutations take `&mut self`: one cart, one operation at a time. Share a
//! cart across tasks through [`SharedCart`].

use std::collections::BTreeMap;
use std::sync::Arc;

use rocketshoes_core::{LineItem, ProductId, Stock};
use tracing::{info, instrument, warn};

use crate::catalog::Catalog;
use crate::error::{CartError, CartOperation, Result};
use crate::notify::Notifier;
use crate::storage::Storage;
use crate::summary::CartSummary;

/// Storage key the cart is persisted under.
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

/// A cart shared between tasks. The lock is held across catalog requests,
/// which serializes operations on the cart.
pub type SharedCart<C, S, N> = Arc<tokio::sync::Mutex<CartStore<C, S, N>>>;

/// Arguments for [`CartStore::update_product_amount`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

/// A persisted cart validated against remote stock.
#[derive(Debug)]
pub struct CartStore<C, S, N> {
    catalog: C,
    storage: S,
    notifier: N,
    items: Vec<LineItem>,
}

impl<C, S, N> CartStore<C, S, N>
where
    C: Catalog,
    S: Storage,
    N: Notifier,
{
    /// Open the cart persisted in `storage`, or an empty cart if there is none.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CorruptCart` if the stored value is not a valid
    /// cart, or `CartError::Unexpected` if storage cannot be read.
    pub fn load(catalog: C, storage: S, notifier: N) -> Result<Self> {
        let items = read_items(&storage)?;
        info!(items = items.len(), "Cart loaded");
        Ok(Self {
            catalog,
            storage,
            notifier,
            items,
        })
    }

    /// Like [`load`](Self::load), but starts empty when the stored cart is
    /// corrupt. The stored value is left alone until the next successful
    /// mutation overwrites it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Unexpected` if storage cannot be read.
    pub fn load_or_reset(catalog: C, storage: S, notifier: N) -> Result<Self> {
        let items = match read_items(&storage) {
            Ok(items) => items,
            Err(err @ CartError::CorruptCart { .. }) => {
                warn!(error = %err, "Discarding corrupt cart");
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        Ok(Self {
            catalog,
            storage,
            notifier,
            items,
        })
    }

    // =========================================================================
    // Read Methods
    // =========================================================================

    /// Current line items, in insertion order.
    #[must_use]
    pub fn cart(&self) -> &[LineItem] {
        &self.items
    }

    /// The line for `product_id`, if it is in the cart.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id() == product_id)
    }

    /// Quantity per product.
    #[must_use]
    pub fn amounts(&self) -> BTreeMap<ProductId, u32> {
        self.items
            .iter()
            .map(|item| (item.id(), item.amount))
            .collect()
    }

    /// Totals for display.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::from_items(&self.items)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of a product.
    ///
    /// A product already in the cart has its amount incremented; a new one is
    /// fetched from the catalog and appended with amount 1.
    ///
    /// # Errors
    ///
    /// `StockExceeded` if the new amount would exceed stock, `Unexpected` if
    /// the catalog or storage fails. The cart is unchanged on error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&mut self, product_id: ProductId) -> Result<()> {
        let result = self.try_add(product_id).await;
        self.report(result)
    }

    /// Remove a product entirely.
    ///
    /// # Errors
    ///
    /// `ItemNotFound` if the product is not in the cart, `Unexpected` if
    /// storage fails. The cart is unchanged on error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub fn remove_product(&mut self, product_id: ProductId) -> Result<()> {
        let result = self.try_remove(product_id);
        self.report(result)
    }

    /// Set a product's amount.
    ///
    /// Amounts of zero or below are ignored: nothing is fetched, written or
    /// reported.
    ///
    /// # Errors
    ///
    /// `StockExceeded` if `amount` exceeds stock, `ItemNotFound` if the
    /// product is not in the cart, `Unexpected` if the catalog or storage
    /// fails. The cart is unchanged on error.
    #[instrument(skip(self), fields(product_id = %update.product_id, amount = update.amount))]
    pub async fn update_product_amount(&mut self, update: UpdateProductAmount) -> Result<()> {
        let result = self.try_update(update).await;
        self.report(result)
    }

    async fn try_add(&mut self, product_id: ProductId) -> Result<()> {
        let current = self.get(product_id).map(|item| item.amount);

        let stock = self
            .catalog
            .stock(product_id)
            .await
            .map_err(|e| CartError::unexpected(CartOperation::Add, e))?;

        let requested = u64::from(current.unwrap_or(0)) + 1;
        let amount = check_stock(product_id, requested, stock)?;

        let items = if current.is_some() {
            with_amount(&self.items, product_id, amount)
        } else {
            let product = self
                .catalog
                .product(product_id)
                .await
                .map_err(|e| CartError::unexpected(CartOperation::Add, e))?;
            let mut items = self.items.clone();
            items.push(LineItem::new(product, 1));
            items
        };

        self.commit(items, CartOperation::Add)
    }

    fn try_remove(&mut self, product_id: ProductId) -> Result<()> {
        if self.get(product_id).is_none() {
            return Err(CartError::ItemNotFound {
                product_id,
                operation: CartOperation::Remove,
            });
        }

        let items = self
            .items
            .iter()
            .filter(|item| item.id() != product_id)
            .cloned()
            .collect();

        self.commit(items, CartOperation::Remove)
    }

    async fn try_update(&mut self, update: UpdateProductAmount) -> Result<()> {
        let UpdateProductAmount { product_id, amount } = update;

        let Ok(requested) = u64::try_from(amount) else {
            return Ok(());
        };
        if requested == 0 {
            return Ok(());
        }

        let stock = self
            .catalog
            .stock(product_id)
            .await
            .map_err(|e| CartError::unexpected(CartOperation::Update, e))?;

        let amount = check_stock(product_id, requested, stock)?;

        if self.get(product_id).is_none() {
            return Err(CartError::ItemNotFound {
                product_id,
                operation: CartOperation::Update,
            });
        }

        let items = with_amount(&self.items, product_id, amount);
        self.commit(items, CartOperation::Update)
    }

    /// Persist `items`, then make them the current cart.
    fn commit(&mut self, items: Vec<LineItem>, operation: CartOperation) -> Result<()> {
        let serialized =
            serde_json::to_string(&items).map_err(|e| CartError::unexpected(operation, e))?;

        self.storage
            .set(CART_STORAGE_KEY, &serialized)
            .map_err(|e| CartError::unexpected(operation, e))?;

        self.items = items;
        info!(%operation, items = self.items.len(), "Cart updated");
        Ok(())
    }

    /// Log and notify on failure, then hand the result back.
    fn report(&self, result: Result<()>) -> Result<()> {
        if let Err(err) = &result {
            match err {
                CartError::Unexpected { .. } | CartError::CorruptCart { .. } => {
                    tracing::error!(error = %err, "Cart operation failed");
                }
                CartError::StockExceeded { .. } | CartError::ItemNotFound { .. } => {
                    warn!(error = %err, "Cart operation rejected");
                }
            }
            self.notifier.error(err.user_message());
        }
        result
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Decode the persisted cart, enforcing positive amounts and unique ids.
fn read_items<S: Storage>(storage: &S) -> Result<Vec<LineItem>> {
    let Some(raw) = storage
        .get(CART_STORAGE_KEY)
        .map_err(|e| CartError::unexpected(CartOperation::Load, e))?
    else {
        return Ok(Vec::new());
    };

    let corrupt = |reason: String| CartError::CorruptCart {
        key: CART_STORAGE_KEY.to_string(),
        reason,
    };

    let items: Vec<LineItem> = serde_json::from_str(&raw).map_err(|e| corrupt(e.to_string()))?;

    let mut seen = std::collections::HashSet::new();
    for item in &items {
        if item.amount == 0 {
            return Err(corrupt(format!("product {} has amount 0", item.id())));
        }
        if !seen.insert(item.id()) {
            return Err(corrupt(format!("product {} appears twice", item.id())));
        }
    }

    Ok(items)
}

/// Accept `requested` if stock covers it.
///
/// Zero or negative stock rejects every request. Line amounts are `u32`, so a
/// request past `u32::MAX` is rejected whatever the stock says.
fn check_stock(product_id: ProductId, requested: u64, stock: Stock) -> Result<u32> {
    let covered = i64::try_from(requested).is_ok_and(|requested| requested <= stock.amount);
    match u32::try_from(requested) {
        Ok(amount) if covered => Ok(amount),
        _ => Err(CartError::StockExceeded {
            product_id,
            requested,
            available: stock.amount,
        }),
    }
}

/// A new sequence where only `product_id`'s amount differs.
fn with_amount(items: &[LineItem], product_id: ProductId, amount: u32) -> Vec<LineItem> {
    items
        .iter()
        .map(|item| {
            if item.id() == product_id {
                item.with_amount(amount)
            } else {
                item.clone()
            }
        })
        .collect()
}
