//! HTTP-level integration tests for the payment verification flow.
//!
//! The hosted-checkout order creation endpoint talks to the live provider
//! and is exercised only up to its validation boundary here; the
//! verification state machine is tested end-to-end against seeded orders.

mod common;

use axum::http::StatusCode;
use common::{body_json, customer_token, get, post_json_auth, seed_book, TEST_RAZORPAY_SECRET};
use sqlx::PgPool;

use ataka_core::order::TimelineEntry;
use ataka_core::payment::payment_signature;
use ataka_db::models::order::NewOrder;
use ataka_db::repositories::OrderRepo;

const RZP_ORDER_ID: &str = "order_test123";
const RZP_PAYMENT_ID: &str = "pay_test456";

/// Seed a pending gateway order the way `create_payment_order` would.
async fn seed_pending_payment_order(pool: &PgPool, user_id: i64, book_id: i64, total: f64) -> i64 {
    let now = chrono::Utc::now();
    let new_order = NewOrder {
        order_number: format!("ORD-{}-seedorder", now.timestamp_millis()),
        user_id,
        items: serde_json::json!([{
            "book_id": book_id,
            "quantity": 2,
            "price": total / 2.0,
            "title": "Seeded",
            "author": "A",
            "image": "",
        }]),
        shipping_address: serde_json::json!({ "city": "Guntur" }),
        billing_address: serde_json::json!({ "city": "Guntur" }),
        order_summary: serde_json::json!({
            "subtotal": total,
            "shipping_cost": 0.0,
            "tax": 0.0,
            "discount": 0.0,
            "total": total,
        }),
        payment_details: serde_json::json!({
            "method": "razorpay",
            "status": "pending",
            "razorpay_order_id": RZP_ORDER_ID,
        }),
        order_status: "pending".to_string(),
        is_gift: false,
        gift_message: String::new(),
        customer_notes: String::new(),
        timeline: serde_json::json!([TimelineEntry {
            status: "pending".to_string(),
            message: "Order created, awaiting payment".to_string(),
            timestamp: now,
            admin_notes: None,
        }]),
    };
    OrderRepo::create(pool, &new_order).await.unwrap().id
}

// ---------------------------------------------------------------------------
// Config endpoint
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn config_returns_publishable_key(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/payments/config").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["razorpay_key_id"], "rzp_test_key");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn config_is_503_when_gateway_unconfigured(pool: PgPool) {
    let mut config = common::test_config();
    config.razorpay = None;

    let app = common::build_test_app_with_config(pool, config);
    let response = get(app, "/api/v1/payments/config").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
}

// ---------------------------------------------------------------------------
// create-order validation boundary
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn checkout_rejects_insufficient_stock(pool: PgPool) {
    let book_id = seed_book(&pool, "Scarce", 100.0, 1).await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/payments/create-order",
        &customer_token(7),
        serde_json::json!({
            "amount": 200.0,
            "items": [{ "book_id": book_id, "quantity": 2 }],
            "shipping_address": {},
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Insufficient stock for Scarce");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn checkout_rejects_amount_mismatch(pool: PgPool) {
    let book_id = seed_book(&pool, "Repriced", 100.0, 5).await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/payments/create-order",
        &customer_token(7),
        serde_json::json!({
            // Claims a stale total; the server computes 200.
            "amount": 150.0,
            "items": [{ "book_id": book_id, "quantity": 2 }],
            "shipping_address": {},
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Amount mismatch");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn checkout_rejects_unknown_book(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/payments/create-order",
        &customer_token(7),
        serde_json::json!({
            "amount": 100.0,
            "items": [{ "book_id": 999999, "quantity": 1 }],
            "shipping_address": {},
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Verification state machine
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn tampered_signature_records_failure_without_stock_mutation(pool: PgPool) {
    let book_id = seed_book(&pool, "Guarded", 100.0, 5).await;
    let order_id = seed_pending_payment_order(&pool, 7, book_id, 200.0).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/payments/verify",
        &customer_token(7),
        serde_json::json!({
            "razorpay_order_id": RZP_ORDER_ID,
            "razorpay_payment_id": RZP_PAYMENT_ID,
            "razorpay_signature": "deadbeef".repeat(8),
            "order_id": order_id,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Payment verification failed");

    // The order is not confirmed; payment details record the failure and
    // exactly one timeline entry was appended.
    let order = OrderRepo::find_by_id(&pool, order_id).await.unwrap().unwrap();
    assert_eq!(order.order_status, "pending");
    assert_eq!(order.payment_details["status"], "failed");
    assert_eq!(order.payment_details["failure_reason"], "Invalid signature");
    assert_eq!(order.timeline.as_array().unwrap().len(), 2);

    // Stock untouched.
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/books/{book_id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["stock_count"], 5);
    assert_eq!(json["data"]["sales_count"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn valid_signature_confirms_order_and_moves_stock_once(pool: PgPool) {
    let book_id = seed_book(&pool, "Paid For", 100.0, 5).await;
    let order_id = seed_pending_payment_order(&pool, 7, book_id, 200.0).await;

    let signature = payment_signature(RZP_ORDER_ID, RZP_PAYMENT_ID, TEST_RAZORPAY_SECRET);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/payments/verify",
        &customer_token(7),
        serde_json::json!({
            "razorpay_order_id": RZP_ORDER_ID,
            "razorpay_payment_id": RZP_PAYMENT_ID,
            "razorpay_signature": signature,
            "order_id": order_id,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "confirmed");
    assert_eq!(json["data"]["total"], 200.0);

    let order = OrderRepo::find_by_id(&pool, order_id).await.unwrap().unwrap();
    assert_eq!(order.order_status, "confirmed");
    assert_eq!(order.payment_details["status"], "paid");
    assert_eq!(order.payment_details["payment_id"], RZP_PAYMENT_ID);
    assert_eq!(order.timeline.as_array().unwrap().len(), 2);

    // The gateway flow's single stock mutation happened here, once.
    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/books/{book_id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["stock_count"], 3);
    assert_eq!(json["data"]["sales_count"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn verify_rejects_other_users(pool: PgPool) {
    let book_id = seed_book(&pool, "Not Yours", 100.0, 5).await;
    let order_id = seed_pending_payment_order(&pool, 7, book_id, 200.0).await;

    let signature = payment_signature(RZP_ORDER_ID, RZP_PAYMENT_ID, TEST_RAZORPAY_SECRET);

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/payments/verify",
        &customer_token(8),
        serde_json::json!({
            "razorpay_order_id": RZP_ORDER_ID,
            "razorpay_payment_id": RZP_PAYMENT_ID,
            "razorpay_signature": signature,
            "order_id": order_id,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn verify_unknown_order_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/payments/verify",
        &customer_token(7),
        serde_json::json!({
            "razorpay_order_id": RZP_ORDER_ID,
            "razorpay_payment_id": RZP_PAYMENT_ID,
            "razorpay_signature": "00",
            "order_id": 999999,
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
