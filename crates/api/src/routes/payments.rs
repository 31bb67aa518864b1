//! Route definitions for the payment gateway flow.
//!
//! Mounted at `/payments`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// GET    /config         -> get_config
/// POST   /create-order   -> create_payment_order
/// POST   /verify         -> verify_payment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/config", get(payments::get_config))
        .route("/create-order", post(payments::create_payment_order))
        .route("/verify", post(payments::verify_payment))
}
