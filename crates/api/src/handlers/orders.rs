//! Handlers for the order lifecycle: creation, listing, tracking, and the
//! admin status surface.

use ataka_core::catalog::{clamp_limit, clamp_offset};
use ataka_core::error::CoreError;
use ataka_core::order::{
    generate_order_number, parse_timeline, OrderStatus, TimelineEntry,
};
use ataka_core::types::DbId;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use ataka_db::models::order::{NewOrder, Order, OrderItem};
use ataka_db::repositories::{BookRepo, OrderRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

// ── Request / query structs ──────────────────────────────────────────

/// Query parameters for order listings.
#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Request body for creating an order directly (non-gateway flow).
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItem>,
    pub shipping_address: serde_json::Value,
    #[serde(default)]
    pub billing_address: Option<serde_json::Value>,
    pub order_summary: serde_json::Value,
    #[serde(default)]
    pub payment_details: Option<serde_json::Value>,
    #[serde(default)]
    pub is_gift: bool,
    #[serde(default)]
    pub gift_message: String,
    #[serde(default)]
    pub customer_notes: String,
}

/// Request body for an admin status update.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub admin_notes: Option<String>,
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct OrderListData {
    pub orders: Vec<Order>,
}

/// Tracking view: current status plus the full timeline.
#[derive(Debug, Serialize)]
pub struct TrackOrderData {
    pub order_number: String,
    pub status: String,
    pub timeline: Vec<TimelineEntry>,
}

// ── Helpers ──────────────────────────────────────────────────────────

async fn ensure_order_exists(pool: &sqlx::PgPool, id: DbId) -> AppResult<Order> {
    OrderRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Order",
            id,
        }))
}

/// Deny access unless the caller owns the order or is an admin.
fn ensure_ownership(order: &Order, auth: &AuthUser) -> AppResult<()> {
    if order.user_id == auth.user_id || auth.is_admin() {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this order".into(),
        )))
    }
}

/// Move stock into sales for every line item, best-effort.
///
/// A failed adjustment is logged and skipped; the order itself has
/// already been persisted and must not be rolled back by a stock
/// bookkeeping problem.
async fn adjust_stock_for_items(pool: &sqlx::PgPool, order_id: DbId, items: &[OrderItem]) {
    for item in items {
        if let Err(e) = BookRepo::adjust_stock(pool, item.book_id, item.quantity).await {
            tracing::warn!(
                order_id,
                book_id = item.book_id,
                error = %e,
                "Failed to update book stock for order item",
            );
        }
    }
}

// ── Customer handlers ────────────────────────────────────────────────

/// GET /orders
///
/// The caller's own orders, newest first.
pub async fn list_my_orders(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListOrdersParams>,
) -> AppResult<Json<ApiResponse<OrderListData>>> {
    if let Some(ref status) = params.status {
        OrderStatus::parse(status)?;
    }
    let orders = OrderRepo::list_for_user(
        &state.pool,
        auth.user_id,
        params.status.as_deref(),
        clamp_limit(params.limit),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(ApiResponse::data(OrderListData { orders })))
}

/// POST /orders
///
/// Create an order and move stock for each line item. Stock bookkeeping
/// is deliberately at-least-once and non-atomic with order creation.
pub async fn create_order(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Order>>)> {
    if input.items.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Order must contain at least one item".into(),
        )));
    }

    let now = chrono::Utc::now();
    let billing = input
        .billing_address
        .clone()
        .unwrap_or_else(|| input.shipping_address.clone());

    let new_order = NewOrder {
        order_number: generate_order_number(now),
        user_id: auth.user_id,
        items: serde_json::to_value(&input.items)
            .map_err(|e| AppError::InternalError(e.to_string()))?,
        shipping_address: input.shipping_address,
        billing_address: billing,
        order_summary: input.order_summary,
        payment_details: input
            .payment_details
            .unwrap_or_else(|| serde_json::json!({})),
        order_status: OrderStatus::Pending.as_str().to_string(),
        is_gift: input.is_gift,
        gift_message: input.gift_message,
        customer_notes: input.customer_notes,
        timeline: serde_json::json!([TimelineEntry {
            status: OrderStatus::Pending.as_str().to_string(),
            message: "Order placed successfully".to_string(),
            timestamp: now,
            admin_notes: None,
        }]),
    };

    let order = OrderRepo::create(&state.pool, &new_order).await?;

    adjust_stock_for_items(&state.pool, order.id, &input.items).await;

    tracing::info!(
        user_id = auth.user_id,
        order_id = order.id,
        order_number = %order.order_number,
        "Order created",
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::data(order))))
}

/// GET /orders/{id}
pub async fn get_order(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = ensure_order_exists(&state.pool, id).await?;
    ensure_ownership(&order, &auth)?;
    Ok(Json(ApiResponse::data(order)))
}

/// GET /orders/{id}/track
///
/// Current status plus the full timeline. A malformed stored timeline
/// reads as empty rather than failing the request.
pub async fn track_order(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<TrackOrderData>>> {
    let order = ensure_order_exists(&state.pool, id).await?;
    ensure_ownership(&order, &auth)?;

    let timeline = parse_timeline(&order.timeline);

    Ok(Json(ApiResponse::data(TrackOrderData {
        order_number: order.order_number,
        status: order.order_status,
        timeline,
    })))
}

// ── Admin handlers ───────────────────────────────────────────────────

/// GET /orders/all (admin)
pub async fn list_all_orders(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListOrdersParams>,
) -> AppResult<Json<ApiResponse<OrderListData>>> {
    auth.require_admin()?;
    if let Some(ref status) = params.status {
        OrderStatus::parse(status)?;
    }
    let orders = OrderRepo::list_all(
        &state.pool,
        params.status.as_deref(),
        clamp_limit(params.limit),
        clamp_offset(params.offset),
    )
    .await?;
    Ok(Json(ApiResponse::data(OrderListData { orders })))
}

/// PUT /orders/{id}/status (admin)
///
/// Transition the order and append one timeline entry with the
/// status-specific message.
pub async fn update_order_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    auth.require_admin()?;

    let status = OrderStatus::parse(&input.status)?;

    let entry = TimelineEntry::for_status(status.as_str(), chrono::Utc::now())
        .with_admin_notes(input.admin_notes.clone());

    let order = OrderRepo::update_status(
        &state.pool,
        id,
        status.as_str(),
        input.admin_notes.as_deref(),
        &entry,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Order",
        id,
    }))?;

    tracing::info!(
        user_id = auth.user_id,
        order_id = id,
        status = %status,
        "Order status updated",
    );

    Ok(Json(ApiResponse::data(order)))
}
