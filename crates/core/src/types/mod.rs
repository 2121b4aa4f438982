//! Core types for RocketShoes.
//!
//! This module provides type-safe wrappers for the catalog and cart concepts.

pub mod id;
pub mod line_item;
pub mod price;
pub mod product;

pub use id::*;
pub use line_item::LineItem;
pub use price::Price;
pub use product::{Product, Stock};
