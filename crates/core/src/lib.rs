//! RocketShoes Core - Shared types library.
//!
//! This crate provides the domain types used across all RocketShoes components:
//! - `cart` - Cart state, persistence and catalog client
//! - `cli` - Command-line front end for a persisted cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe product IDs, prices, catalog entries and line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
