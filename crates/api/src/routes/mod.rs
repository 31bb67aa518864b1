pub mod books;
pub mod health;
pub mod import;
pub mod orders;
pub mod payments;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /books                       list (filters), create (admin)
/// /books/search                title search
/// /books/featured              featured shelf
/// /books/bestsellers           bestsellers shelf (by sales count)
/// /books/category/{category}   category listing
/// /books/{id}                  get, update (admin), delete (admin)
///
/// /orders                      own orders (GET), create (POST)
/// /orders/all                  all orders (admin)
/// /orders/{id}                 get (owner or admin)
/// /orders/{id}/track           status + timeline (owner or admin)
/// /orders/{id}/status          update status (admin, PUT)
///
/// /payments/config             publishable key id
/// /payments/create-order       open hosted checkout (POST)
/// /payments/verify             verify checkout signature (POST)
///
/// /import/test-connection      probe store credentials (admin, POST)
/// /import/fetch-products       product listing preview (admin, POST)
/// /import/products             start import (admin, POST)
/// /import/progress/{id}        poll session progress (admin, GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog browsing and admin CRUD.
        .nest("/books", books::router())
        // Order lifecycle.
        .nest("/orders", orders::router())
        // Razorpay hosted-checkout flow.
        .nest("/payments", payments::router())
        // WooCommerce catalog import pipeline.
        .nest("/import", import::router())
}
