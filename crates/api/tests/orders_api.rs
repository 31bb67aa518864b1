//! HTTP-level integration tests for the order lifecycle.

mod common;

use axum::http::StatusCode;
use common::{
    admin_token, body_json, customer_token, get, get_auth, post_json_auth, put_json_auth,
    seed_book,
};
use sqlx::PgPool;

/// Place an order for `quantity` units of one book and return the order id.
async fn place_order(pool: &PgPool, user_id: i64, book_id: i64, quantity: i32, price: f64) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/orders",
        &customer_token(user_id),
        serde_json::json!({
            "items": [{
                "book_id": book_id,
                "quantity": quantity,
                "price": price,
            }],
            "shipping_address": { "city": "Vijayawada" },
            "order_summary": {
                "subtotal": price * f64::from(quantity),
                "shipping_cost": 0.0,
                "tax": 0.0,
                "discount": 0.0,
                "total": price * f64::from(quantity),
            },
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "order create failed");
    let json = body_json(response).await;
    json["data"]["id"].as_i64().expect("order id")
}

// ---------------------------------------------------------------------------
// Creation and stock side effects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_order_decrements_stock_and_bumps_sales(pool: PgPool) {
    let book_id = seed_book(&pool, "Stocked", 100.0, 5).await;

    place_order(&pool, 7, book_id, 2, 100.0).await;

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/books/{book_id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["stock_count"], 3);
    assert_eq!(json["data"]["sales_count"], 2);
    assert_eq!(json["data"]["in_stock"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ordering_last_units_marks_out_of_stock(pool: PgPool) {
    let book_id = seed_book(&pool, "Nearly Gone", 100.0, 2).await;

    place_order(&pool, 7, book_id, 2, 100.0).await;

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/books/{book_id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["stock_count"], 0);
    assert_eq!(json["data"]["in_stock"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stock_clamps_at_zero_on_overdraw(pool: PgPool) {
    let book_id = seed_book(&pool, "Oversold", 100.0, 1).await;

    // Order creation is best-effort about stock: the order goes through
    // and the count clamps rather than going negative.
    place_order(&pool, 7, book_id, 3, 100.0).await;

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/books/{book_id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["stock_count"], 0);
    assert_eq!(json["data"]["sales_count"], 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_order_rejects_empty_items(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/orders",
        &customer_token(7),
        serde_json::json!({
            "items": [],
            "shipping_address": {},
            "order_summary": {},
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_order_requires_auth(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::post_json(
        app,
        "/api/v1/orders",
        serde_json::json!({
            "items": [],
            "shipping_address": {},
            "order_summary": {},
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Ownership
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_users_cannot_read_an_order(pool: PgPool) {
    let book_id = seed_book(&pool, "Private", 100.0, 5).await;
    let order_id = place_order(&pool, 7, book_id, 1, 100.0).await;

    // The owner can read it.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/orders/{order_id}"),
        &customer_token(7),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // A stranger cannot.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/orders/{order_id}"),
        &customer_token(8),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // An admin can.
    let app = common::build_test_app(pool);
    let response = get_auth(app, &format!("/api/v1/orders/{order_id}"), &admin_token(1)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn listing_only_shows_own_orders(pool: PgPool) {
    let book_id = seed_book(&pool, "Mine", 100.0, 10).await;
    place_order(&pool, 7, book_id, 1, 100.0).await;
    place_order(&pool, 8, book_id, 1, 100.0).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/orders", &customer_token(7)).await;
    let json = body_json(response).await;
    let orders = json["data"]["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["user_id"], 7);
}

// ---------------------------------------------------------------------------
// Status timeline
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_update_appends_timeline_entry(pool: PgPool) {
    let book_id = seed_book(&pool, "Tracked", 100.0, 5).await;
    let order_id = place_order(&pool, 7, book_id, 1, 100.0).await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/orders/{order_id}/status"),
        &admin_token(1),
        serde_json::json!({ "status": "shipped", "admin_notes": "Courier handed over" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["order_status"], "shipped");

    // Track endpoint shows the full history: creation + transition.
    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/orders/{order_id}/track"),
        &customer_token(7),
    )
    .await;
    let json = body_json(response).await;
    let timeline = json["data"]["timeline"].as_array().unwrap();
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0]["status"], "pending");
    assert_eq!(timeline[1]["status"], "shipped");
    assert_eq!(timeline[1]["message"], "Order has been shipped");
    assert_eq!(timeline[1]["admin_notes"], "Courier handed over");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_update_rejects_unknown_status(pool: PgPool) {
    let book_id = seed_book(&pool, "Strict", 100.0, 5).await;
    let order_id = place_order(&pool, 7, book_id, 1, 100.0).await;

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/orders/{order_id}/status"),
        &admin_token(1),
        serde_json::json!({ "status": "teleported" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn status_update_requires_admin(pool: PgPool) {
    let book_id = seed_book(&pool, "Locked", 100.0, 5).await;
    let order_id = place_order(&pool, 7, book_id, 1, 100.0).await;

    let app = common::build_test_app(pool);
    let response = put_json_auth(
        app,
        &format!("/api/v1/orders/{order_id}/status"),
        &customer_token(7),
        serde_json::json!({ "status": "shipped" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_listing_sees_every_order(pool: PgPool) {
    let book_id = seed_book(&pool, "Everywhere", 100.0, 10).await;
    place_order(&pool, 7, book_id, 1, 100.0).await;
    place_order(&pool, 8, book_id, 1, 100.0).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/orders/all", &admin_token(1)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["orders"].as_array().unwrap().len(), 2);
}
