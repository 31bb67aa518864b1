//! Handlers for the Razorpay hosted-checkout flow.
//!
//! Stock moves exactly once per flow: `create_payment_order` validates
//! availability but never mutates inventory; the decrement happens at
//! successful verification only.

use ataka_core::error::CoreError;
use ataka_core::order::{generate_order_number, OrderStatus, OrderSummary, TimelineEntry};
use ataka_core::payment::{
    amounts_match, to_minor_units, verify_payment_signature, PAYMENT_STATUS_FAILED,
    PAYMENT_STATUS_PAID, PAYMENT_STATUS_PENDING,
};
use ataka_core::types::{DbId, Timestamp};
use axum::extract::{Json, State};
use serde::{Deserialize, Serialize};

use ataka_db::models::order::{NewOrder, OrderItem, PaymentDetails};
use ataka_db::repositories::{BookRepo, OrderRepo};

use crate::config::RazorpayConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::razorpay::RazorpayClient;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Payment method tag stored in every gateway order's payment details.
const METHOD_RAZORPAY: &str = "razorpay";

// ── Request structs ──────────────────────────────────────────────────

/// One cart line in a checkout request. Prices are never trusted from
/// the client; only the id and quantity matter.
#[derive(Debug, Deserialize)]
pub struct CartItem {
    pub book_id: DbId,
    pub quantity: i32,
}

/// Request body for opening a hosted-checkout order.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentOrderRequest {
    /// Client-computed total, revalidated server-side.
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    pub items: Vec<CartItem>,
    pub shipping_address: serde_json::Value,
}

/// Request body for the post-checkout verification callback.
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    /// Local order id created by `create_payment_order`.
    pub order_id: DbId,
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PaymentConfigData {
    pub razorpay_key_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedOrderSummary {
    pub id: DbId,
    pub order_number: String,
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct ProviderOrderSummary {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct CreatePaymentOrderData {
    pub order: CreatedOrderSummary,
    pub razorpay_order: ProviderOrderSummary,
    pub razorpay_key_id: String,
}

#[derive(Debug, Serialize)]
pub struct VerifiedOrderData {
    pub id: DbId,
    pub order_number: String,
    pub status: String,
    pub total: f64,
    pub paid_at: Timestamp,
}

// ── Helpers ──────────────────────────────────────────────────────────

fn require_gateway(state: &AppState) -> AppResult<&RazorpayConfig> {
    state
        .config
        .razorpay
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable("Payment service not available".into()))
}

// ── Handlers ─────────────────────────────────────────────────────────

/// GET /payments/config
///
/// The publishable key id for the checkout frontend.
pub async fn get_config(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<PaymentConfigData>>> {
    let gateway = require_gateway(&state)?;
    Ok(Json(ApiResponse::data(PaymentConfigData {
        razorpay_key_id: gateway.key_id.clone(),
    })))
}

/// POST /payments/create-order
///
/// Re-price the cart from current catalog data, reject stock or total
/// mismatches, open a hosted-checkout order at the provider, and persist
/// a local pending order. Inventory is untouched here.
pub async fn create_payment_order(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePaymentOrderRequest>,
) -> AppResult<Json<ApiResponse<CreatePaymentOrderData>>> {
    let gateway = require_gateway(&state)?.clone();

    if input.items.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Cart must contain at least one item".into(),
        )));
    }

    // Server-side reprice and availability check.
    let mut computed_total = 0.0;
    let mut order_items = Vec::with_capacity(input.items.len());

    for item in &input.items {
        if item.quantity <= 0 {
            return Err(AppError::Core(CoreError::Validation(
                "Item quantity must be positive".into(),
            )));
        }

        let book = BookRepo::find_by_id(&state.pool, item.book_id)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!("Book with ID {} not found", item.book_id))
            })?;

        if !book.in_stock || book.stock_count < item.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                book.title
            )));
        }

        computed_total += book.price * f64::from(item.quantity);

        order_items.push(OrderItem {
            book_id: book.id,
            quantity: item.quantity,
            price: book.price,
            title: book.title,
            author: book.author,
            image: book.image,
        });
    }

    if !amounts_match(input.amount, computed_total) {
        return Err(AppError::BadRequest("Amount mismatch".into()));
    }

    let now = chrono::Utc::now();
    let currency = input.currency.as_deref().unwrap_or("INR");

    // Open the hosted-checkout order at the provider first; a failure
    // here must not leave a local order behind.
    let provider_order = RazorpayClient::new(gateway.clone())
        .create_order(
            to_minor_units(computed_total),
            currency,
            &format!("order_{}_{}", now.timestamp_millis(), auth.user_id),
            serde_json::json!({ "user_id": auth.user_id }),
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Razorpay order creation failed");
            AppError::ServiceUnavailable("Payment service not available".into())
        })?;

    let payment_details = PaymentDetails {
        method: METHOD_RAZORPAY.to_string(),
        status: PAYMENT_STATUS_PENDING.to_string(),
        razorpay_order_id: Some(provider_order.id.clone()),
        payment_id: None,
        signature: None,
        paid_at: None,
        failure_reason: None,
    };

    let new_order = NewOrder {
        order_number: generate_order_number(now),
        user_id: auth.user_id,
        items: serde_json::to_value(&order_items)
            .map_err(|e| AppError::InternalError(e.to_string()))?,
        shipping_address: input.shipping_address.clone(),
        billing_address: input.shipping_address,
        order_summary: serde_json::to_value(OrderSummary::from_subtotal(computed_total))
            .map_err(|e| AppError::InternalError(e.to_string()))?,
        payment_details: serde_json::to_value(&payment_details)
            .map_err(|e| AppError::InternalError(e.to_string()))?,
        order_status: OrderStatus::Pending.as_str().to_string(),
        is_gift: false,
        gift_message: String::new(),
        customer_notes: String::new(),
        timeline: serde_json::json!([TimelineEntry {
            status: OrderStatus::Pending.as_str().to_string(),
            message: "Order created, awaiting payment".to_string(),
            timestamp: now,
            admin_notes: None,
        }]),
    };

    let order = OrderRepo::create(&state.pool, &new_order).await?;

    tracing::info!(
        user_id = auth.user_id,
        order_id = order.id,
        razorpay_order_id = %provider_order.id,
        "Checkout order created",
    );

    Ok(Json(ApiResponse::with_message(
        CreatePaymentOrderData {
            order: CreatedOrderSummary {
                id: order.id,
                order_number: order.order_number,
                total: computed_total,
            },
            razorpay_order: ProviderOrderSummary {
                id: provider_order.id,
                amount: provider_order.amount,
                currency: provider_order.currency,
            },
            razorpay_key_id: gateway.key_id,
        },
        "Order created successfully",
    )))
}

/// POST /payments/verify
///
/// Recompute the checkout signature and either confirm the order (with
/// the single stock decrement of the gateway flow) or record the failure.
pub async fn verify_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<VerifyPaymentRequest>,
) -> AppResult<Json<ApiResponse<VerifiedOrderData>>> {
    let gateway = require_gateway(&state)?;

    let order = OrderRepo::find_by_id(&state.pool, input.order_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Order",
            id: input.order_id,
        }))?;

    if order.user_id != auth.user_id && !auth.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not have access to this order".into(),
        )));
    }

    let mut payment_details: PaymentDetails = serde_json::from_value(order.payment_details.clone())
        .map_err(|e| AppError::InternalError(format!("Malformed payment details: {e}")))?;

    let signature_valid = verify_payment_signature(
        &input.razorpay_order_id,
        &input.razorpay_payment_id,
        &gateway.key_secret,
        &input.razorpay_signature,
    );

    let now = chrono::Utc::now();

    if !signature_valid {
        payment_details.status = PAYMENT_STATUS_FAILED.to_string();
        payment_details.failure_reason = Some("Invalid signature".to_string());

        let entry = TimelineEntry {
            status: PAYMENT_STATUS_FAILED.to_string(),
            message: "Payment verification failed".to_string(),
            timestamp: now,
            admin_notes: None,
        };

        // The order status stays where it was; only the payment block and
        // timeline record the failure. No stock is touched.
        OrderRepo::update_payment(
            &state.pool,
            order.id,
            &serde_json::to_value(&payment_details)
                .map_err(|e| AppError::InternalError(e.to_string()))?,
            None,
            &entry,
        )
        .await?;

        tracing::warn!(
            order_id = order.id,
            razorpay_order_id = %input.razorpay_order_id,
            "Payment signature verification failed",
        );

        return Err(AppError::BadRequest("Payment verification failed".into()));
    }

    payment_details.status = PAYMENT_STATUS_PAID.to_string();
    payment_details.payment_id = Some(input.razorpay_payment_id.clone());
    payment_details.signature = Some(input.razorpay_signature.clone());
    payment_details.paid_at = Some(now);

    let entry = TimelineEntry {
        status: OrderStatus::Confirmed.as_str().to_string(),
        message: "Payment confirmed, order processing".to_string(),
        timestamp: now,
        admin_notes: None,
    };

    let updated = OrderRepo::update_payment(
        &state.pool,
        order.id,
        &serde_json::to_value(&payment_details)
            .map_err(|e| AppError::InternalError(e.to_string()))?,
        Some(OrderStatus::Confirmed.as_str()),
        &entry,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Order",
        id: order.id,
    }))?;

    // The gateway flow's single stock mutation: confirmed payment moves
    // inventory into sales, best-effort per line item.
    let items: Vec<OrderItem> = serde_json::from_value(updated.items.clone()).unwrap_or_default();
    for item in &items {
        if let Err(e) = BookRepo::adjust_stock(&state.pool, item.book_id, item.quantity).await {
            tracing::warn!(
                order_id = updated.id,
                book_id = item.book_id,
                error = %e,
                "Failed to update book stock after payment",
            );
        }
    }

    let total = serde_json::from_value::<OrderSummary>(updated.order_summary.clone())
        .map(|s| s.total)
        .unwrap_or(0.0);

    tracing::info!(order_id = updated.id, "Payment verified");

    Ok(Json(ApiResponse::with_message(
        VerifiedOrderData {
            id: updated.id,
            order_number: updated.order_number,
            status: updated.order_status,
            total,
            paid_at: now,
        },
        "Payment verified successfully",
    )))
}
