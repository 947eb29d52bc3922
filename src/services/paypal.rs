//! PayPal checkout for the sponsor plan
//!
//! Uses the Orders v2 REST API: an OAuth2 client-credentials token, then
//! `POST /v2/checkout/orders` to create an order and
//! `POST /v2/checkout/orders/{id}/capture` once the buyer approved it.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::types::{OpenAltError, Result};

/// PayPal reports a fully captured order with this status
pub const STATUS_COMPLETED: &str = "COMPLETED";

/// Refresh the access token this long before PayPal expires it
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// An order as created by the gateway
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrder {
    pub order_id: String,
    pub status: String,
    /// Where the buyer approves the payment
    pub approve_url: Option<String>,
}

/// Result of capturing an approved order
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedOrder {
    pub status: String,
    pub capture_id: Option<String>,
}

impl CapturedOrder {
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }
}

/// Payment processor used for sponsor plan checkout
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order for `amount` (decimal string) in `currency`.
    /// `reference` is echoed back by PayPal as the purchase unit reference.
    async fn create_order(&self, amount: &str, currency: &str, reference: &str)
        -> Result<CreatedOrder>;

    async fn capture_order(&self, order_id: &str) -> Result<CapturedOrder>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct LinkDescription {
    href: String,
    rel: String,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    status: String,
    #[serde(default)]
    links: Vec<LinkDescription>,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    status: String,
    #[serde(default)]
    purchase_units: Vec<CapturedUnit>,
}

#[derive(Debug, Deserialize)]
struct CapturedUnit {
    #[serde(default)]
    payments: Option<CapturedPayments>,
}

#[derive(Debug, Deserialize)]
struct CapturedPayments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
struct Capture {
    id: String,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// PayPal REST client
pub struct PayPalClient {
    base_url: String,
    client_id: String,
    client_secret: String,
    http_client: reqwest::Client,
    token: Mutex<Option<CachedToken>>,
}

impl PayPalClient {
    pub fn new(
        base_url: &str,
        client_id: String,
        client_secret: String,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OpenAltError::Config(format!("Failed to build PayPal HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
            http_client,
            token: Mutex::new(None),
        })
    }

    /// Bearer token, fetched again when the cached one is about to expire
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(ref token) = *cached {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let credentials = BASE64.encode(format!("{}:{}", self.client_id, self.client_secret));
        let response = self
            .http_client
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .header("Authorization", format!("Basic {}", credentials))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OpenAltError::Upstream(format!(
                "PayPal authentication failed with HTTP {}",
                response.status()
            )));
        }

        let token: TokenResponse = response.json().await?;
        debug!(expires_in = token.expires_in, "Obtained PayPal access token");

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let token = self.access_token().await?;
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(OpenAltError::Upstream(format!(
                "PayPal returned HTTP {} for {}: {}",
                status,
                path,
                detail.chars().take(200).collect::<String>()
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl PaymentGateway for PayPalClient {
    async fn create_order(
        &self,
        amount: &str,
        currency: &str,
        reference: &str,
    ) -> Result<CreatedOrder> {
        let body = json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "reference_id": reference,
                "description": format!("OpenAlt sponsor plan for {}", reference),
                "amount": { "currency_code": currency, "value": amount },
            }],
        });

        let order: OrderResponse = self.post_json("/v2/checkout/orders", body).await?;
        info!(order_id = %order.id, reference, "Created PayPal order");

        let approve_url = order
            .links
            .into_iter()
            .find(|l| l.rel == "approve" || l.rel == "payer-action")
            .map(|l| l.href);

        Ok(CreatedOrder {
            order_id: order.id,
            status: order.status,
            approve_url,
        })
    }

    async fn capture_order(&self, order_id: &str) -> Result<CapturedOrder> {
        let path = format!("/v2/checkout/orders/{}/capture", order_id);
        let capture: CaptureResponse = self.post_json(&path, json!({})).await?;

        let capture_id = capture
            .purchase_units
            .into_iter()
            .filter_map(|unit| unit.payments)
            .flat_map(|p| p.captures)
            .map(|c| c.id)
            .next();

        info!(order_id, status = %capture.status, "Captured PayPal order");

        Ok(CapturedOrder {
            status: capture.status,
            capture_id,
        })
    }
}

/// Whether `order_id` looks like a PayPal order id (uppercase alphanumerics)
pub fn is_valid_order_id(order_id: &str) -> bool {
    !order_id.is_empty()
        && order_id.len() <= 64
        && order_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_response_parsing() {
        let body = r#"{
            "id": "5O190127TN364715T",
            "status": "COMPLETED",
            "purchase_units": [{
                "reference_id": "penpot",
                "payments": { "captures": [{ "id": "3C679366HH908993F", "status": "COMPLETED" }] }
            }]
        }"#;
        let parsed: CaptureResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, STATUS_COMPLETED);
        let id = parsed
            .purchase_units
            .into_iter()
            .filter_map(|u| u.payments)
            .flat_map(|p| p.captures)
            .map(|c| c.id)
            .next();
        assert_eq!(id.as_deref(), Some("3C679366HH908993F"));
    }

    #[test]
    fn test_order_response_links() {
        let body = r#"{
            "id": "5O190127TN364715T",
            "status": "CREATED",
            "links": [
                { "href": "https://api.paypal.com/v2/checkout/orders/5O1", "rel": "self", "method": "GET" },
                { "href": "https://www.paypal.com/checkoutnow?token=5O1", "rel": "approve", "method": "GET" }
            ]
        }"#;
        let parsed: OrderResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.links.len(), 2);
        assert_eq!(parsed.links[1].rel, "approve");
    }

    #[test]
    fn test_order_id_validation() {
        assert!(is_valid_order_id("5O190127TN364715T"));
        assert!(!is_valid_order_id(""));
        assert!(!is_valid_order_id("../../admin"));
    }
}
