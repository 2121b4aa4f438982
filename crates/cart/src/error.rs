//! Cart error handling.
//!
//! Every cart operation returns `Result<_, CartError>` and also reports the
//! failure to the configured notifier. The variants map one-to-one onto the
//! messages a user sees: stock exceeded, item not in the cart, and
//! everything else folded into an operation-specific "failed" message.

use std::fmt;

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::storage::StorageError;

/// Message shown when a requested quantity exceeds stock.
pub const STOCK_EXCEEDED_MESSAGE: &str = "Quantidade solicitada fora de estoque";

/// Message shown when adding a product fails.
pub const ADD_FAILED_MESSAGE: &str = "Erro na adição do produto";

/// Message shown when removing a product fails.
pub const REMOVE_FAILED_MESSAGE: &str = "Erro na remoção do produto";

/// Message shown when changing a product's quantity fails.
pub const UPDATE_FAILED_MESSAGE: &str = "Erro na alteração de quantidade do produto";

/// Message shown when the persisted cart cannot be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Erro ao carregar o carrinho";

/// The cart operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    Load,
    Add,
    Remove,
    Update,
}

impl CartOperation {
    /// Message shown to the user when this operation fails for any reason
    /// other than stock.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Load => LOAD_FAILED_MESSAGE,
            Self::Add => ADD_FAILED_MESSAGE,
            Self::Remove => REMOVE_FAILED_MESSAGE,
            Self::Update => UPDATE_FAILED_MESSAGE,
        }
    }
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "load",
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
        })
    }
}

/// Underlying cause of an unexpected cart failure.
#[derive(Debug, Error)]
pub enum FailureCause {
    /// Catalog or stock lookup failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Reading or writing the persisted cart failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Cart-level error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity is larger than the available stock.
    #[error("Requested {requested} of product {product_id}, only {available} in stock")]
    StockExceeded {
        product_id: ProductId,
        requested: u64,
        available: i64,
    },

    /// The product is not in the cart.
    #[error("Cannot {operation} product {product_id}: not in cart")]
    ItemNotFound {
        product_id: ProductId,
        operation: CartOperation,
    },

    /// Any other failure (network, malformed response, storage).
    #[error("Cart {operation} failed: {source}")]
    Unexpected {
        operation: CartOperation,
        #[source]
        source: FailureCause,
    },

    /// The persisted cart could not be understood.
    #[error("Persisted cart under {key} is corrupt: {reason}")]
    CorruptCart { key: String, reason: String },
}

impl CartError {
    /// Wrap a lower-level failure for `operation`.
    pub fn unexpected(operation: CartOperation, cause: impl Into<FailureCause>) -> Self {
        Self::Unexpected {
            operation,
            source: cause.into(),
        }
    }

    /// The message shown to the user for this error.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::StockExceeded { .. } => STOCK_EXCEEDED_MESSAGE,
            Self::ItemNotFound { operation, .. } | Self::Unexpected { operation, .. } => {
                operation.failure_message()
            }
            Self::CorruptCart { .. } => CartOperation::Load.failure_message(),
        }
    }

    /// True for stock-exceeded failures.
    #[must_use]
    pub const fn is_stock_exceeded(&self) -> bool {
        matches!(self, Self::StockExceeded { .. })
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
