//! HTTP client for the WooCommerce REST API.

use std::time::Duration;

use ataka_core::import::WooProduct;
use serde::Deserialize;

/// Products fetched per listing page.
pub const PAGE_SIZE: u32 = 100;

/// Hard ceiling on listing pages, bounding the walk against a
/// misbehaving endpoint that keeps reporting more pages.
pub const MAX_PAGES: u32 = 50;

/// Timeout for the connectivity probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for one listing page.
const PAGE_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for a single-product fetch.
const PRODUCT_TIMEOUT: Duration = Duration::from_secs(10);

/// WooCommerce REST credentials supplied by the store owner.
#[derive(Debug, Clone, Deserialize)]
pub struct WooCredentials {
    /// Store base URL, e.g. `https://books.example.com`.
    pub site_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
}

/// Result of a successful connectivity probe.
#[derive(Debug, Clone)]
pub struct StoreStatus {
    /// Total product count reported by the `X-WP-Total` header.
    pub total_products: i64,
}

/// Errors from the WooCommerce API layer, classified by transport signal.
#[derive(Debug, thiserror::Error)]
pub enum WooError {
    /// The store rejected the consumer key/secret (HTTP 401/403).
    #[error("Invalid API credentials")]
    InvalidCredentials,

    /// The REST route does not exist at that URL (HTTP 404).
    #[error("WooCommerce REST API not found. Please check the URL.")]
    ApiNotFound,

    /// DNS or TCP failure reaching the site.
    #[error("Site not found. Please check the URL.")]
    SiteUnreachable,

    /// The request timed out.
    #[error("Connection timeout. Please try again.")]
    Timeout,

    /// The store returned some other non-2xx status code.
    #[error("WooCommerce API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The HTTP request itself failed in an unclassified way.
    #[error("HTTP request failed: {0}")]
    Request(reqwest::Error),
}

impl WooError {
    /// Stable, user-facing explanation of the failure. Unclassified
    /// transport errors collapse into a generic message; the detail goes
    /// to the logs, not the caller.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid API credentials",
            Self::ApiNotFound => "WooCommerce REST API not found. Please check the URL.",
            Self::SiteUnreachable => "Site not found. Please check the URL.",
            Self::Timeout => "Connection timeout. Please try again.",
            Self::Api { .. } | Self::Request(_) => "Connection failed",
        }
    }
}

impl From<reqwest::Error> for WooError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::SiteUnreachable
        } else {
            Self::Request(err)
        }
    }
}

/// HTTP client for a single WooCommerce store.
pub struct WooClient {
    client: reqwest::Client,
    credentials: WooCredentials,
}

impl WooClient {
    /// Create a client for the given store credentials.
    pub fn new(credentials: WooCredentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            credentials,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across repeated imports).
    pub fn with_client(client: reqwest::Client, credentials: WooCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Probe the store with a minimal one-product listing request.
    ///
    /// Persists nothing; returns the store's total product count on
    /// success and a classified [`WooError`] on failure.
    pub async fn test_connection(&self) -> Result<StoreStatus, WooError> {
        let response = self
            .client
            .get(self.products_url())
            .query(&self.auth_query())
            .query(&[("per_page", "1")])
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let total_products = header_i64(&response, "x-wp-total").unwrap_or(0);

        tracing::debug!(
            site_url = %self.credentials.site_url,
            total_products,
            "WooCommerce store reachable",
        );

        Ok(StoreStatus { total_products })
    }

    /// Begin a lazy walk over the store's product listing.
    ///
    /// Pages are fetched on demand by [`ProductPages::next_page`]; nothing
    /// is buffered beyond the page in hand, so the caller decides how much
    /// of the catalog to hold.
    pub fn product_pages(&self) -> ProductPages<'_> {
        ProductPages {
            client: self,
            next_page: 1,
            total_pages: None,
        }
    }

    /// Fetch the full record for one product by its external id.
    pub async fn fetch_product(&self, product_id: i64) -> Result<WooProduct, WooError> {
        let response = self
            .client
            .get(format!("{}/{product_id}", self.products_url()))
            .query(&self.auth_query())
            .timeout(PRODUCT_TIMEOUT)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    // ---- private helpers ----

    /// Fetch one listing page. Returns the products plus the total page
    /// count reported by the `X-WP-TotalPages` header.
    async fn fetch_page(&self, page: u32) -> Result<(Vec<WooProduct>, u32), WooError> {
        let response = self
            .client
            .get(self.products_url())
            .query(&self.auth_query())
            .query(&[
                ("per_page", PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ])
            .timeout(PAGE_TIMEOUT)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let total_pages = header_i64(&response, "x-wp-totalpages").unwrap_or(1).max(1) as u32;
        let products: Vec<WooProduct> = response.json().await?;

        Ok((products, total_pages))
    }

    fn products_url(&self) -> String {
        format!(
            "{}/wp-json/wc/v3/products",
            self.credentials.site_url.trim_end_matches('/')
        )
    }

    fn auth_query(&self) -> [(&'static str, &str); 2] {
        [
            ("consumer_key", self.credentials.consumer_key.as_str()),
            ("consumer_secret", self.credentials.consumer_secret.as_str()),
        ]
    }

    /// Classify a non-2xx response into a [`WooError`]. Returns the
    /// response unchanged on success.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, WooError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status.as_u16() {
            401 | 403 => Err(WooError::InvalidCredentials),
            404 => Err(WooError::ApiNotFound),
            code => {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<unreadable body>".to_string());
                Err(WooError::Api { status: code, body })
            }
        }
    }
}

/// A restartable, finite walk over a store's product listing.
///
/// Yields pages in order until the store reports no further pages or
/// [`MAX_PAGES`] is reached, whichever comes first.
pub struct ProductPages<'a> {
    client: &'a WooClient,
    next_page: u32,
    total_pages: Option<u32>,
}

impl ProductPages<'_> {
    /// Fetch the next page, or `None` when the walk is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<WooProduct>>, WooError> {
        if self.is_exhausted() {
            return Ok(None);
        }

        let (products, total_pages) = self.client.fetch_page(self.next_page).await?;
        self.total_pages = Some(total_pages.min(MAX_PAGES));
        self.next_page += 1;

        if products.is_empty() {
            // Defensive: a store can report more pages than it serves.
            self.total_pages = Some(self.next_page - 1);
            return Ok(None);
        }

        Ok(Some(products))
    }

    fn is_exhausted(&self) -> bool {
        match self.total_pages {
            Some(total) => self.next_page > total,
            None => self.next_page > MAX_PAGES,
        }
    }
}

fn header_i64(response: &reqwest::Response, name: &str) -> Option<i64> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn client(site_url: &str) -> WooClient {
        WooClient::new(WooCredentials {
            site_url: site_url.to_string(),
            consumer_key: "ck_test".to_string(),
            consumer_secret: "cs_test".to_string(),
        })
    }

    #[test]
    fn products_url_handles_trailing_slash() {
        assert_eq!(
            client("https://store.example.com/").products_url(),
            "https://store.example.com/wp-json/wc/v3/products"
        );
        assert_eq!(
            client("https://store.example.com").products_url(),
            "https://store.example.com/wp-json/wc/v3/products"
        );
    }

    #[test]
    fn classified_errors_have_stable_messages() {
        assert_eq!(
            WooError::InvalidCredentials.user_message(),
            "Invalid API credentials"
        );
        assert_eq!(
            WooError::ApiNotFound.user_message(),
            "WooCommerce REST API not found. Please check the URL."
        );
        assert_eq!(
            WooError::SiteUnreachable.user_message(),
            "Site not found. Please check the URL."
        );
        assert_eq!(
            WooError::Timeout.user_message(),
            "Connection timeout. Please try again."
        );
        assert_eq!(
            WooError::Api {
                status: 500,
                body: String::new()
            }
            .user_message(),
            "Connection failed"
        );
    }

    #[test]
    fn fresh_walk_is_not_exhausted() {
        let c = client("https://store.example.com");
        let pages = c.product_pages();
        assert!(!pages.is_exhausted());
    }

    #[test]
    fn walk_exhausts_at_reported_total() {
        let c = client("https://store.example.com");
        let mut pages = c.product_pages();
        pages.total_pages = Some(3);
        pages.next_page = 4;
        assert!(pages.is_exhausted());
    }

    #[test]
    fn walk_exhausts_at_page_ceiling_without_total() {
        let c = client("https://store.example.com");
        let mut pages = c.product_pages();
        pages.next_page = MAX_PAGES + 1;
        assert!(pages.is_exhausted());
    }
}
