//! Payment signature math for the Razorpay hosted-checkout flow.
//!
//! Razorpay returns `HMAC-SHA256(order_id + "|" + payment_id, key_secret)`
//! as a lowercase hex string after checkout; the server recomputes it to
//! decide whether the payment is genuine. Comparison is constant-time via
//! [`Mac::verify_slice`].

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Claimed and computed order totals may differ by at most this much
/// (one paisa) before the order is rejected as tampered.
pub const AMOUNT_EPSILON: f64 = 0.01;

/// Payment status values stored in an order's payment details block.
pub const PAYMENT_STATUS_PENDING: &str = "pending";
pub const PAYMENT_STATUS_PAID: &str = "paid";
pub const PAYMENT_STATUS_FAILED: &str = "failed";

/// Compute the checkout signature for a provider order/payment pair.
pub fn payment_signature(provider_order_id: &str, payment_id: &str, key_secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(key_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(provider_order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex_encode(&mac.finalize().into_bytes())
}

/// Verify a client-supplied signature in constant time.
///
/// The supplied signature is hex-decoded and checked against the freshly
/// computed MAC; anything that is not valid lowercase/uppercase hex of the
/// right length fails verification.
pub fn verify_payment_signature(
    provider_order_id: &str,
    payment_id: &str,
    key_secret: &str,
    supplied_signature: &str,
) -> bool {
    let Some(supplied) = hex_decode(supplied_signature) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(key_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(provider_order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&supplied).is_ok()
}

/// Whether a claimed total matches a server-computed total within
/// [`AMOUNT_EPSILON`].
pub fn amounts_match(claimed: f64, computed: f64) -> bool {
    (claimed - computed).abs() <= AMOUNT_EPSILON
}

/// Convert a currency amount in rupees to paise for the provider API.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

// ── Private helpers ──────────────────────────────────────────────────

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────
