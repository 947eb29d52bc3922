//! Directory operations
//!
//! Everything the REST API does, independent of HTTP. Each operation takes
//! the caller's claims (when it needs them) and returns a JSON-ready view.

mod accounts;
mod alternatives;
mod community;
mod promotions;
mod taxonomy;
mod views;

pub use accounts::{AuthResponse, LoginRequest, SignupRequest};
pub use alternatives::{AlternativeInput, AlternativeUpdate, StatusUpdate};
pub use community::{DiscussionInput, MarkedRead, VoteRequest, VoteResponse};
pub use promotions::{
    AdEventRecorded, AdInput, AdQuery, CapturedSponsorship, OrderRequest, SponsorOrder,
};
pub use views::{
    AdView, AlternativeDetail, AlternativeView, LabelRef, Listing, Lookup, NotificationView,
    ProprietaryDetail, ProprietaryView, UserView,
};

use bson::oid::ObjectId;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::auth::{Claims, JwtValidator};
use crate::config::Args;
use crate::db::schemas::AlternativeDoc;
use crate::services::github::{GitHubClient, RepoStatsSource};
use crate::services::notifier::Notifier;
use crate::services::paypal::{PayPalClient, PaymentGateway};
use crate::store::DirectoryStore;
use crate::types::{OpenAltError, Result};

/// Tunables of the directory, taken from `Args`
#[derive(Debug, Clone)]
pub struct DirectorySettings {
    /// Signups with these (lowercased) emails become admins
    pub admin_emails: Vec<String>,
    pub ad_interval: usize,
    pub ad_max_per_page: usize,
    pub sponsor_price: String,
    pub sponsor_currency: String,
    pub sponsor_days: i64,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            admin_emails: Vec::new(),
            ad_interval: 6,
            ad_max_per_page: 3,
            sponsor_price: "49.00".into(),
            sponsor_currency: "USD".into(),
            sponsor_days: 30,
        }
    }
}

impl DirectorySettings {
    pub fn from_args(args: &Args) -> Self {
        Self {
            admin_emails: args.admin_email_list(),
            ad_interval: args.ad_interval,
            ad_max_per_page: args.ad_max_per_page,
            sponsor_price: args.paypal.sponsor_price.clone(),
            sponsor_currency: args.paypal.sponsor_currency.clone(),
            sponsor_days: args.paypal.sponsor_days,
        }
    }
}

/// The directory service
pub struct Directory {
    store: Arc<dyn DirectoryStore>,
    jwt: JwtValidator,
    github: Option<Arc<dyn RepoStatsSource>>,
    payments: Option<Arc<dyn PaymentGateway>>,
    notifier: Notifier,
    settings: DirectorySettings,
}

impl Directory {
    pub fn new(store: Arc<dyn DirectoryStore>, jwt: JwtValidator, settings: DirectorySettings) -> Self {
        Self {
            notifier: Notifier::new(Arc::clone(&store)),
            store,
            jwt,
            github: None,
            payments: None,
            settings,
        }
    }

    /// Directory wired to the integrations configured in `args`
    pub fn from_args(args: &Args, store: Arc<dyn DirectoryStore>) -> Result<Self> {
        let secret = args
            .jwt_secret()
            .ok_or_else(|| OpenAltError::Config("JWT_SECRET is required".into()))?;
        let jwt = JwtValidator::new(secret, args.jwt_expiry_seconds)?;
        let timeout = Duration::from_millis(args.request_timeout_ms);

        let github = GitHubClient::new(&args.github_api_url, args.github_token.clone(), timeout)?;
        let mut directory =
            Self::new(store, jwt, DirectorySettings::from_args(args)).with_github(Arc::new(github));

        let paypal = &args.paypal;
        if let (Some(id), Some(secret)) = (&paypal.paypal_client_id, &paypal.paypal_client_secret) {
            info!("PayPal checkout enabled against {}", paypal.paypal_api_url);
            directory = directory.with_payments(Arc::new(PayPalClient::new(
                &paypal.paypal_api_url,
                id.clone(),
                secret.clone(),
                timeout,
            )?));
        }

        Ok(directory)
    }

    /// Enable GitHub statistics
    pub fn with_github(mut self, github: Arc<dyn RepoStatsSource>) -> Self {
        self.github = Some(github);
        self
    }

    /// Enable sponsor plan checkout
    pub fn with_payments(mut self, payments: Arc<dyn PaymentGateway>) -> Self {
        self.payments = Some(payments);
        self
    }

    pub fn store(&self) -> &Arc<dyn DirectoryStore> {
        &self.store
    }

    pub fn github_enabled(&self) -> bool {
        self.github.is_some()
    }

    pub fn payments_enabled(&self) -> bool {
        self.payments.is_some()
    }

    /// Verify a bearer token
    pub fn authenticate(&self, token: &str) -> Result<Claims> {
        self.jwt.verify_token(token)
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// User id carried by a token
pub(crate) fn caller_id(claims: &Claims) -> Result<ObjectId> {
    ObjectId::parse_str(&claims.user_id)
        .map_err(|_| OpenAltError::Unauthorized("Token does not identify a user".into()))
}

pub(crate) fn require_admin(claims: &Claims) -> Result<()> {
    if claims.is_admin() {
        Ok(())
    } else {
        Err(OpenAltError::Forbidden("Administrator permission required".into()))
    }
}

/// Parse an id taken from a URL path
pub(crate) fn parse_id(value: &str, what: &str) -> Result<ObjectId> {
    ObjectId::parse_str(value).map_err(|_| OpenAltError::bad_request(format!("Invalid {what} id")))
}

/// Whether a viewer may see an alternative: approved entries are public,
/// others only to their submitter and admins.
pub(crate) fn can_view(alternative: &AlternativeDoc, viewer: Option<&Claims>) -> bool {
    if alternative.status == crate::db::schemas::ApprovalStatus::Approved {
        return true;
    }
    can_edit(alternative, viewer)
}

pub(crate) fn can_edit(alternative: &AlternativeDoc, viewer: Option<&Claims>) -> bool {
    match viewer {
        Some(claims) if claims.is_admin() => true,
        Some(claims) => caller_id(claims)
            .map(|id| alternative.is_owned_by(&id))
            .unwrap_or(false),
        None => false,
    }
}

/// Trimmed required text between 1 and `max` characters
pub(crate) fn required_text(field: &str, value: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(OpenAltError::bad_request(format!("{field} is required")));
    }
    if value.chars().count() > max {
        return Err(OpenAltError::bad_request(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

/// Trimmed optional text; blank means unset
pub(crate) fn optional_text(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => required_text(field, v, max).map(Some),
    }
}

/// Optional http(s) URL; blank means unset
pub(crate) fn optional_url(field: &str, value: Option<&str>) -> Result<Option<String>> {
    match optional_text(field, value, 2048)? {
        None => Ok(None),
        Some(url) => {
            let rest = url
                .strip_prefix("https://")
                .or_else(|| url.strip_prefix("http://"));
            match rest {
                Some(host) if !host.is_empty() && !host.starts_with('/') && !url.contains(' ') => {
                    Ok(Some(url))
                }
                _ => Err(OpenAltError::bad_request(format!(
                    "{field} must be an http(s) URL"
                ))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("Name", "  Gimp ", 10).unwrap(), "Gimp");
        assert!(required_text("Name", "   ", 10).is_err());
        assert!(required_text("Name", "abcdefghijk", 10).is_err());
    }

    #[test]
    fn test_optional_url() {
        assert_eq!(optional_url("Website", Some(" ")).unwrap(), None);
        assert_eq!(
            optional_url("Website", Some("https://www.gimp.org")).unwrap().as_deref(),
            Some("https://www.gimp.org")
        );
        assert!(optional_url("Website", Some("ftp://gimp.org")).is_err());
        assert!(optional_url("Website", Some("https://")).is_err());
        assert!(optional_url("Website", Some("javascript:alert(1)")).is_err());
    }
}
