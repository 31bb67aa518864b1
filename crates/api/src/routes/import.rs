//! Route definitions for the WooCommerce catalog import pipeline.
//!
//! Mounted at `/import`. All endpoints are admin-only.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::import;
use crate::state::AppState;

/// Routes mounted at `/import`.
///
/// ```text
/// POST   /test-connection        -> test_connection
/// POST   /fetch-products         -> fetch_products
/// POST   /products               -> start_import
/// GET    /progress/{import_id}   -> import_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/test-connection", post(import::test_connection))
        .route("/fetch-products", post(import::fetch_products))
        .route("/products", post(import::start_import))
        .route("/progress/{import_id}", get(import::import_progress))
}
