//! REST client for the WooCommerce Store API (wp-json/wc/v3).
//!
//! Wraps the endpoints the import pipeline needs: a connectivity probe,
//! lazily paginated product listing, and per-product retrieval. All
//! failures classify into [`WooError`] so callers can surface a stable,
//! human-readable cause without inspecting transport details.

mod api;

pub use api::{ProductPages, StoreStatus, WooClient, WooCredentials, WooError};
