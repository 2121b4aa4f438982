//! RocketShoes Cart library.
//!
//! A shopping cart that persists across sessions and checks every quantity
//! change against live stock.
//!
//! # Architecture
//!
//! - [`CartStore`] holds the line items and owns three collaborators:
//!   - a [`Catalog`] for stock levels and product data ([`HttpCatalog`] in production)
//!   - a [`Storage`] key-value store for the persisted copy ([`FileStorage`], [`MemoryStorage`])
//!   - a [`Notifier`] for user-facing error messages ([`LogNotifier`], [`MemoryNotifier`])
//! - Every operation returns a typed [`CartError`] and also notifies the user
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::{CartConfig, CartStore, FileStorage, HttpCatalog, LogNotifier};
//!
//! let config = CartConfig::from_env()?;
//! let catalog = HttpCatalog::new(&config)?;
//! let mut cart = CartStore::load(catalog, FileStorage::new(&config.cart_file), LogNotifier)?;
//!
//! cart.add_product(ProductId::new(1)).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod storage;
pub mod store;
pub mod summary;

pub use catalog::{Catalog, CatalogError, HttpCatalog};
pub use config::{CartConfig, ConfigError};
pub use error::{
    ADD_FAILED_MESSAGE, CartError, CartOperation, FailureCause, LOAD_FAILED_MESSAGE,
    REMOVE_FAILED_MESSAGE, STOCK_EXCEEDED_MESSAGE, UPDATE_FAILED_MESSAGE,
};
pub use notify::{LogNotifier, MemoryNotifier, Notifier};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{CART_STORAGE_KEY, CartStore, SharedCart, UpdateProductAmount};
pub use summary::CartSummary;
