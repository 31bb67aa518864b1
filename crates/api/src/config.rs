use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token validation configuration.
    pub jwt: JwtConfig,
    /// Razorpay gateway credentials. `None` disables payment endpoints
    /// (they answer 503) without preventing the rest of the store from
    /// running.
    pub razorpay: Option<RazorpayConfig>,
}

/// Credentials for the Razorpay Orders API.
#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    /// Publishable key id, safe to hand to the checkout frontend.
    pub key_id: String,
    /// Server-held secret used for order creation and signature checks.
    pub key_secret: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `RAZORPAY_KEY_ID`      | unset (gateway disabled)   |
    /// | `RAZORPAY_KEY_SECRET`  | unset (gateway disabled)   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        let razorpay = match (
            std::env::var("RAZORPAY_KEY_ID"),
            std::env::var("RAZORPAY_KEY_SECRET"),
        ) {
            (Ok(key_id), Ok(key_secret)) if !key_id.is_empty() && !key_secret.is_empty() => {
                Some(RazorpayConfig { key_id, key_secret })
            }
            _ => {
                tracing::warn!("Razorpay credentials not configured, payment endpoints disabled");
                None
            }
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            razorpay,
        }
    }
}
