//! Route definitions for orders.
//!
//! Mounted at `/orders`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::orders;
use crate::state::AppState;

/// Routes mounted at `/orders`.
///
/// ```text
/// GET    /              -> list_my_orders
/// POST   /              -> create_order
/// GET    /all           -> list_all_orders (admin)
/// GET    /{id}          -> get_order (owner or admin)
/// GET    /{id}/track    -> track_order (owner or admin)
/// PUT    /{id}/status   -> update_order_status (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list_my_orders).post(orders::create_order))
        .route("/all", get(orders::list_all_orders))
        .route("/{id}", get(orders::get_order))
        .route("/{id}/track", get(orders::track_order))
        .route("/{id}/status", put(orders::update_order_status))
}
