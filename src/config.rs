//! Configuration for OpenAlt
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

/// Fallback secret used when dev mode runs without JWT_SECRET
const DEV_JWT_SECRET: &str = "dev-only-insecure-secret-do-not-deploy";

/// OpenAlt - directory of open-source alternatives to proprietary software
#[derive(Parser, Debug, Clone)]
#[command(name = "openalt")]
#[command(about = "REST API for the open-source alternatives directory")]
pub struct Args {
    /// Unique identifier for this instance (reported by /health)
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Enable development mode (dev JWT secret, in-memory fallback store)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "openalt")]
    pub mongodb_db: String,

    /// JWT secret for token signing (required in production)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "86400")]
    pub jwt_expiry_seconds: u64,

    /// Comma-separated emails that receive admin permission on signup
    #[arg(long, env = "ADMIN_EMAILS")]
    pub admin_emails: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Timeout for outbound HTTP calls in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "10000")]
    pub request_timeout_ms: u64,

    /// Largest accepted request body in bytes
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "65536")]
    pub max_body_bytes: usize,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    pub github_api_url: String,

    /// GitHub token (optional, raises the rate limit)
    #[arg(long, env = "GITHUB_TOKEN")]
    pub github_token: Option<String>,

    /// Number of listing items between two interspersed ads
    #[arg(long, env = "AD_INTERVAL", default_value = "6")]
    pub ad_interval: usize,

    /// Maximum ads interspersed into one listing page
    #[arg(long, env = "AD_MAX_PER_PAGE", default_value = "3")]
    pub ad_max_per_page: usize,

    /// PayPal configuration
    #[command(flatten)]
    pub paypal: PayPalArgs,
}

/// PayPal and sponsor plan configuration
#[derive(Parser, Debug, Clone)]
pub struct PayPalArgs {
    /// PayPal REST API base URL
    #[arg(long, env = "PAYPAL_API_URL", default_value = "https://api-m.sandbox.paypal.com")]
    pub paypal_api_url: String,

    /// PayPal client ID (payments disabled when unset)
    #[arg(long, env = "PAYPAL_CLIENT_ID")]
    pub paypal_client_id: Option<String>,

    /// PayPal client secret
    #[arg(long, env = "PAYPAL_CLIENT_SECRET")]
    pub paypal_client_secret: Option<String>,

    /// Price of the sponsor plan, e.g. "49.00"
    #[arg(long, env = "SPONSOR_PRICE", default_value = "49.00")]
    pub sponsor_price: String,

    /// ISO currency code of the sponsor price
    #[arg(long, env = "SPONSOR_CURRENCY", default_value = "USD")]
    pub sponsor_currency: String,

    /// How long a captured sponsorship lasts
    #[arg(long, env = "SPONSOR_DAYS", default_value = "30")]
    pub sponsor_days: i64,
}

impl Args {
    /// Get effective JWT secret (uses a fixed secret in dev mode)
    pub fn jwt_secret(&self) -> Option<String> {
        match (&self.jwt_secret, self.dev_mode) {
            (Some(secret), _) => Some(secret.clone()),
            (None, true) => Some(DEV_JWT_SECRET.to_string()),
            (None, false) => None,
        }
    }

    /// Emails that are promoted to admin on signup, lowercased
    pub fn admin_email_list(&self) -> Vec<String> {
        self.admin_emails
            .as_deref()
            .map(|emails| {
                emails
                    .split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether both PayPal credentials are configured
    pub fn payments_enabled(&self) -> bool {
        self.paypal.paypal_client_id.is_some() && self.paypal.paypal_client_secret.is_some()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            match &self.jwt_secret {
                None => return Err("JWT_SECRET is required in production mode".to_string()),
                Some(s) if s.len() < 32 => {
                    return Err("JWT_SECRET must be at least 32 characters".to_string())
                }
                Some(_) => {}
            }
        }

        if self.ad_interval == 0 {
            return Err("AD_INTERVAL must be greater than zero".to_string());
        }

        if !is_valid_price(&self.paypal.sponsor_price) {
            return Err(format!(
                "SPONSOR_PRICE '{}' must be a positive amount with at most two decimals",
                self.paypal.sponsor_price
            ));
        }

        if self.paypal.sponsor_days <= 0 {
            return Err("SPONSOR_DAYS must be positive".to_string());
        }

        Ok(())
    }
}

/// Check a decimal amount as PayPal expects it ("49", "49.5", "49.00")
fn is_valid_price(price: &str) -> bool {
    let (whole, fraction) = match price.split_once('.') {
        Some((w, f)) => (w, f),
        None => (price, ""),
    };

    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() || !digits_only(whole) || !digits_only(fraction) || fraction.len() > 2 {
        return false;
    }
    if price.ends_with('.') {
        return false;
    }

    price.chars().any(|c| c.is_ascii_digit() && c != '0')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["openalt"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_dev_mode_gets_fallback_secret() {
        let a = args(&["--dev-mode"]);
        assert!(a.validate().is_ok());
        assert_eq!(a.jwt_secret().as_deref(), Some(DEV_JWT_SECRET));
    }

    #[test]
    fn test_production_requires_long_secret() {
        let a = args(&["--jwt-secret", "short"]);
        assert!(a.validate().is_err());

        let a = args(&["--jwt-secret", "0123456789abcdef0123456789abcdef"]);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_admin_email_list() {
        let a = args(&["--dev-mode", "--admin-emails", " Root@Example.org, ,ops@example.org"]);
        assert_eq!(
            a.admin_email_list(),
            vec!["root@example.org".to_string(), "ops@example.org".to_string()]
        );
    }

    #[test]
    fn test_price_validation() {
        assert!(is_valid_price("49.00"));
        assert!(is_valid_price("5"));
        assert!(is_valid_price("0.50"));
        assert!(!is_valid_price("0.00"));
        assert!(!is_valid_price("49.001"));
        assert!(!is_valid_price("49."));
        assert!(!is_valid_price("-3"));
        assert!(!is_valid_price(""));
    }

    #[test]
    fn test_zero_ad_interval_rejected() {
        let a = args(&["--dev-mode", "--ad-interval", "0"]);
        assert!(a.validate().is_err());
    }
}
