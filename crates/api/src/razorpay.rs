//! Minimal client for the Razorpay Orders API.
//!
//! Only the hosted-checkout order creation endpoint is wrapped; signature
//! verification happens locally (see `ataka_core::payment`) and webhook
//! confirmation is out of scope.

use serde::Deserialize;

use crate::config::RazorpayConfig;

const ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";

/// A hosted-checkout order created at the provider.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayOrder {
    /// Provider-assigned order id (`order_...`), later echoed back in the
    /// checkout signature.
    pub id: String,
    /// Amount in minor units (paise).
    pub amount: i64,
    pub currency: String,
}

/// Errors from the Razorpay REST layer.
#[derive(Debug, thiserror::Error)]
pub enum RazorpayError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Razorpay returned a non-2xx status code.
    #[error("Razorpay API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// HTTP client bound to one Razorpay key pair.
pub struct RazorpayClient {
    client: reqwest::Client,
    config: RazorpayConfig,
}

impl RazorpayClient {
    pub fn new(config: RazorpayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create a hosted-checkout order.
    ///
    /// * `amount_minor` - order total in paise.
    /// * `receipt`      - caller-chosen receipt tag, stored by the provider.
    pub async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
        notes: serde_json::Value,
    ) -> Result<RazorpayOrder, RazorpayError> {
        let body = serde_json::json!({
            "amount": amount_minor,
            "currency": currency,
            "receipt": receipt,
            "notes": notes,
        });

        let response = self
            .client
            .post(ORDERS_URL)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(RazorpayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}
