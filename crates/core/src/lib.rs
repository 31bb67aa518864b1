//! Domain logic for the Ataka Telugu-book storefront.
//!
//! This crate has no I/O: no database, no HTTP, no async. It holds the
//! error taxonomy, catalog vocabulary, order lifecycle rules, payment
//! signature math, and the WooCommerce-to-book transform, so that the
//! `db`, `woo`, and `api` crates can share one source of truth.

pub mod catalog;
pub mod error;
pub mod import;
pub mod order;
pub mod payment;
pub mod types;
