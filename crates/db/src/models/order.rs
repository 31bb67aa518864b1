//! Models for orders.
//!
//! Item lists, addresses, the money summary, payment details, and the
//! status timeline are stored as JSONB and surface as `serde_json::Value`
//! at the row level; typed views live in `ataka_core::order` and the
//! payment structs below.

use ataka_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ── Orders ───────────────────────────────────────────────────────────

/// A row from the `orders` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: DbId,
    pub order_number: String,
    pub user_id: DbId,
    pub items: serde_json::Value,
    pub shipping_address: serde_json::Value,
    pub billing_address: serde_json::Value,
    pub order_summary: serde_json::Value,
    pub payment_details: serde_json::Value,
    pub order_status: String,
    pub is_gift: bool,
    pub gift_message: String,
    pub customer_notes: String,
    pub admin_notes: String,
    pub timeline: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One line item inside an order's `items` payload. Price is a snapshot
/// of the unit price at order time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub book_id: DbId,
    pub quantity: i32,
    pub price: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub image: String,
}

/// The `payment_details` payload stored on every order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub method: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub razorpay_order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

/// Fully-assembled insert payload for a new order. Handlers build this
/// from validated input plus generated fields (order number, timeline).
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: DbId,
    pub items: serde_json::Value,
    pub shipping_address: serde_json::Value,
    pub billing_address: serde_json::Value,
    pub order_summary: serde_json::Value,
    pub payment_details: serde_json::Value,
    pub order_status: String,
    pub is_gift: bool,
    pub gift_message: String,
    pub customer_notes: String,
    pub timeline: serde_json::Value,
}
