//! Order lifecycle vocabulary: statuses, timeline entries, order numbers,
//! and order summary arithmetic.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ── Order status ─────────────────────────────────────────────────────

/// The fixed set of states an order moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// Parse a status name, rejecting anything outside the fixed set.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(CoreError::Validation(format!(
                "Unknown order status: \"{other}\""
            ))),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable timeline message for a status transition.
///
/// Unrecognised statuses get the generic fallback so a timeline entry is
/// always written.
pub fn status_message(status: &str) -> &'static str {
    match status {
        "pending" => "Order is being processed",
        "confirmed" => "Order confirmed and being prepared",
        "processing" => "Order is being prepared for shipment",
        "shipped" => "Order has been shipped",
        "delivered" => "Order has been delivered",
        "cancelled" => "Order has been cancelled",
        "refunded" => "Order has been refunded",
        _ => "Status updated",
    }
}

// ── Timeline ─────────────────────────────────────────────────────────

/// One append-only entry in an order's status timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: String,
    pub message: String,
    pub timestamp: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_notes: Option<String>,
}

impl TimelineEntry {
    /// Build an entry for a status transition, stamped with the given time.
    pub fn for_status(status: &str, timestamp: Timestamp) -> Self {
        Self {
            status: status.to_string(),
            message: status_message(status).to_string(),
            timestamp,
            admin_notes: None,
        }
    }

    pub fn with_admin_notes(mut self, notes: Option<String>) -> Self {
        self.admin_notes = notes.filter(|n| !n.is_empty());
        self
    }
}

/// Parse a stored timeline payload leniently.
///
/// Malformed or missing JSON yields an empty timeline rather than an error;
/// a broken history must never make the order unreadable.
pub fn parse_timeline(raw: &serde_json::Value) -> Vec<TimelineEntry> {
    serde_json::from_value(raw.clone()).unwrap_or_default()
}

// ── Order number ─────────────────────────────────────────────────────

/// Generate a human-readable order number: `ORD-{millis}-{suffix}`.
///
/// The suffix is 9 random lowercase alphanumerics. Uniqueness is
/// probabilistic (timestamp + entropy), not guaranteed; the orders table
/// carries no unique constraint on it.
pub fn generate_order_number(now: Timestamp) -> String {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("ORD-{}-{}", now.timestamp_millis(), suffix)
}

// ── Order summary ────────────────────────────────────────────────────

/// Monetary breakdown stored on every order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub subtotal: f64,
    pub shipping_cost: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
}

impl OrderSummary {
    /// Build a summary from a subtotal with no extra charges.
    pub fn from_subtotal(subtotal: f64) -> Self {
        Self {
            subtotal,
            shipping_cost: 0.0,
            tax: 0.0,
            discount: 0.0,
            total: subtotal,
        }
    }

    /// Recompute the total from the component fields.
    pub fn computed_total(&self) -> f64 {
        self.subtotal + self.shipping_cost + self.tax - self.discount
    }
}

// ── Tests ────────────────────────────────────────────────────────────
