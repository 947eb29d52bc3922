//! Advertisements and sponsor plan checkout

use bson::DateTime;
use chrono::{DateTime as ChronoDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::{
    caller_id, optional_text, optional_url, parse_id, require_admin, required_text, AdView,
    Directory, StatusUpdate,
};
use crate::auth::Claims;
use crate::catalog::is_active;
use crate::db::schemas::{
    AdEvent, AdFormat, AdvertisementDoc, ApprovalStatus, Metadata, PaymentOrderDoc, PaymentStatus,
};
use crate::services::paypal::{is_valid_order_id, PaymentGateway};
use crate::types::{OpenAltError, Result};

const MAX_TITLE_LEN: usize = 120;
const MAX_BODY_LEN: usize = 500;
const DAY_MILLIS: i64 = 86_400_000;

/// Query string of `GET /api/advertisements`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdQuery {
    pub format: Option<String>,
    /// Moderation status (admins only); without it only running ads are listed
    pub status: Option<String>,
}

impl AdQuery {
    pub fn from_query_string(query: Option<&str>) -> Result<Self> {
        serde_urlencoded::from_str(query.unwrap_or(""))
            .map_err(|e| OpenAltError::bad_request(format!("Invalid query string: {e}")))
    }
}

/// Body of `POST /api/advertisements`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdInput {
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub target_url: String,
    #[serde(default)]
    pub format: AdFormat,
    /// Defaults to now
    #[serde(default)]
    pub starts_at: Option<ChronoDateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<ChronoDateTime<Utc>>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdEventRecorded {
    /// False when the ad is not running
    pub recorded: bool,
    /// Where a click should lead
    pub target_url: Option<String>,
}

/// Body of `POST /api/payments/orders`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub alternative_slug: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorOrder {
    pub order_id: String,
    pub status: String,
    pub approve_url: Option<String>,
    pub amount: String,
    pub currency: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedSponsorship {
    pub order_id: String,
    pub alternative_slug: String,
    pub status: PaymentStatus,
    /// Milliseconds since the epoch
    pub sponsored_until: i64,
}

/// End of a sponsorship extended by `days`, counted from `now` or from the
/// running sponsorship's end, whichever is later
fn extend_sponsorship(current: Option<DateTime>, now: DateTime, days: i64) -> DateTime {
    let base = match current {
        Some(until) if until > now => until,
        _ => now,
    };
    DateTime::from_millis(base.timestamp_millis().saturating_add(days.saturating_mul(DAY_MILLIS)))
}

impl Directory {
    fn gateway(&self) -> Result<&dyn PaymentGateway> {
        self.payments
            .as_deref()
            .ok_or_else(|| OpenAltError::Upstream("Payments are not configured".into()))
    }

    // =========================================================================
    // Advertisements
    // =========================================================================

    /// Running ads, or (for admins) ads in a given moderation status
    pub async fn list_advertisements(
        &self,
        viewer: Option<&Claims>,
        query: AdQuery,
    ) -> Result<Vec<AdView>> {
        let format = match query.format.as_deref().filter(|s| !s.is_empty()) {
            None => None,
            Some(value) => Some(AdFormat::parse(value).ok_or_else(|| {
                OpenAltError::bad_request(format!("Unknown ad format '{value}'"))
            })?),
        };

        let now = DateTime::now();
        let mut ads = match query.status.as_deref().filter(|s| !s.is_empty()) {
            None => self
                .store
                .list_advertisements(Some(ApprovalStatus::Approved))
                .await?
                .into_iter()
                .filter(|ad| is_active(ad, now))
                .collect::<Vec<_>>(),
            Some(value) => {
                let claims = viewer.ok_or_else(|| {
                    OpenAltError::Unauthorized("Authentication required".into())
                })?;
                require_admin(claims)?;
                let status = ApprovalStatus::parse(value).ok_or_else(|| {
                    OpenAltError::bad_request(format!("Unknown status '{value}'"))
                })?;
                self.store.list_advertisements(Some(status)).await?
            }
        };

        if let Some(format) = format {
            ads.retain(|ad| ad.format == format);
        }
        ads.sort_by_key(|ad| (ad.metadata.created_millis(), ad.id));
        Ok(ads.iter().map(AdView::from).collect())
    }

    /// Submit an ad; it runs once an admin approves it
    pub async fn submit_ad(&self, claims: &Claims, input: AdInput) -> Result<AdView> {
        let advertiser_id = caller_id(claims)?;

        let title = required_text("Title", &input.title, MAX_TITLE_LEN)?;
        let body = optional_text("Body", input.body.as_deref(), MAX_BODY_LEN)?.unwrap_or_default();
        let image_url = optional_url("Image URL", input.image_url.as_deref())?;
        let target_url = optional_url("Target URL", Some(&input.target_url))?
            .ok_or_else(|| OpenAltError::bad_request("Target URL is required"))?;

        let starts_at = input
            .starts_at
            .map(DateTime::from_chrono)
            .unwrap_or_else(DateTime::now);
        let ends_at = input.ends_at.map(DateTime::from_chrono);
        if let Some(end) = ends_at {
            if end <= starts_at {
                return Err(OpenAltError::bad_request("The end date must be after the start date"));
            }
        }

        let mut ad = AdvertisementDoc {
            id: None,
            metadata: Metadata::new(),
            advertiser_id,
            title,
            body,
            image_url,
            target_url,
            format: input.format,
            starts_at,
            ends_at,
            status: ApprovalStatus::Pending,
            clicks: 0,
            impressions: 0,
        };
        ad.id = Some(self.store.insert_advertisement(ad.clone()).await?);

        info!(ad = ?ad.id, user = %advertiser_id, format = ?ad.format, "Advertisement submitted");
        Ok(AdView::from(&ad))
    }

    /// Approve or reject an ad (admin)
    pub async fn set_ad_status(&self, claims: &Claims, id: &str, update: StatusUpdate) -> Result<AdView> {
        require_admin(claims)?;
        let id = parse_id(id, "advertisement")?;
        let status = update.parse()?;

        let mut ad = self
            .store
            .find_advertisement(id)
            .await?
            .ok_or_else(|| OpenAltError::not_found("Advertisement not found"))?;

        if !self.store.set_advertisement_status(id, status).await? {
            return Err(OpenAltError::not_found("Advertisement not found"));
        }

        let changed = ad.status != status;
        ad.status = status;
        if changed {
            self.notifier.advertisement_decided(&ad, status).await;
        }
        Ok(AdView::from(&ad))
    }

    /// Count a click or impression of a running ad
    pub async fn record_ad_event(&self, id: &str, event: AdEvent) -> Result<AdEventRecorded> {
        let id = parse_id(id, "advertisement")?;
        let ad = self
            .store
            .find_advertisement(id)
            .await?
            .ok_or_else(|| OpenAltError::not_found("Advertisement not found"))?;

        let recorded = is_active(&ad, DateTime::now()) && self.store.record_ad_event(id, event).await?;

        Ok(AdEventRecorded {
            recorded,
            target_url: match event {
                AdEvent::Click => Some(ad.target_url),
                AdEvent::Impression => None,
            },
        })
    }

    // =========================================================================
    // Sponsor plan
    // =========================================================================

    /// Start checkout of the sponsor plan for an approved alternative
    pub async fn create_sponsor_order(&self, claims: &Claims, request: OrderRequest) -> Result<SponsorOrder> {
        let user_id = caller_id(claims)?;
        let gateway = self.gateway()?;

        let slug = request.alternative_slug.trim();
        let alternative = self.visible_alternative(Some(claims), slug).await?;
        if alternative.status != ApprovalStatus::Approved {
            return Err(OpenAltError::bad_request(
                "Only approved alternatives can be sponsored",
            ));
        }
        if !claims.is_admin() && !alternative.is_owned_by(&user_id) {
            return Err(OpenAltError::Forbidden(
                "Only the submitter or an administrator can sponsor this alternative".into(),
            ));
        }
        let alternative_id = alternative
            .id
            .ok_or_else(|| OpenAltError::Internal("Alternative has no id".into()))?;

        let amount = self.settings.sponsor_price.clone();
        let currency = self.settings.sponsor_currency.clone();
        let order = gateway
            .create_order(&amount, &currency, &alternative.slug)
            .await?;

        self.store
            .insert_payment(PaymentOrderDoc {
                id: None,
                metadata: Metadata::new(),
                order_id: order.order_id.clone(),
                alternative_id,
                user_id,
                amount: amount.clone(),
                currency: currency.clone(),
                status: PaymentStatus::Created,
                capture_id: None,
            })
            .await?;

        info!(order = %order.order_id, alternative = %alternative.slug, "Sponsor order created");

        Ok(SponsorOrder {
            order_id: order.order_id,
            status: order.status,
            approve_url: order.approve_url,
            amount,
            currency,
        })
    }

    /// Capture an approved order and activate the sponsor plan
    pub async fn capture_sponsor_order(
        &self,
        claims: &Claims,
        order_id: &str,
    ) -> Result<CapturedSponsorship> {
        let user_id = caller_id(claims)?;
        let gateway = self.gateway()?;

        if !is_valid_order_id(order_id) {
            return Err(OpenAltError::bad_request("Invalid order id"));
        }

        let payment = self
            .store
            .find_payment(order_id)
            .await?
            .ok_or_else(|| OpenAltError::not_found("Order not found"))?;

        if payment.user_id != user_id && !claims.is_admin() {
            return Err(OpenAltError::Forbidden("This order belongs to another user".into()));
        }
        if payment.status == PaymentStatus::Captured {
            return Err(OpenAltError::Conflict("Order was already captured".into()));
        }

        let alternative = self
            .store
            .find_alternative_by_id(payment.alternative_id)
            .await?
            .ok_or_else(|| OpenAltError::not_found("Sponsored alternative no longer exists"))?;
        let alternative_id = alternative
            .id
            .ok_or_else(|| OpenAltError::Internal("Alternative has no id".into()))?;

        let captured = gateway.capture_order(order_id).await?;
        if !captured.is_completed() {
            self.store
                .set_payment_status(order_id, PaymentStatus::Failed, None)
                .await?;
            warn!(order = %order_id, status = %captured.status, "Capture did not complete");
            return Err(OpenAltError::bad_request(format!(
                "Payment was not completed (status {})",
                captured.status
            )));
        }

        self.store
            .set_payment_status(order_id, PaymentStatus::Captured, captured.capture_id)
            .await?;

        let until = extend_sponsorship(
            alternative.sponsored_until,
            DateTime::now(),
            self.settings.sponsor_days,
        );
        let alternative = match self.store.set_sponsorship(alternative_id, until).await {
            Ok(alternative) => alternative,
            Err(e) => {
                error!(
                    order = %order_id,
                    alternative = %alternative.slug,
                    "Payment captured but sponsorship was not applied: {}",
                    e
                );
                return Err(e);
            }
        };

        info!(order = %order_id, alternative = %alternative.slug, "Sponsorship activated");
        self.notifier
            .sponsorship_activated(payment.user_id, &alternative, until)
            .await;

        Ok(CapturedSponsorship {
            order_id: order_id.to_string(),
            alternative_slug: alternative.slug,
            status: PaymentStatus::Captured,
            sponsored_until: until.timestamp_millis(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_from_now_when_expired() {
        let now = DateTime::from_millis(1_000_000);
        let expired = Some(DateTime::from_millis(10));
        assert_eq!(
            extend_sponsorship(expired, now, 30).timestamp_millis(),
            1_000_000 + 30 * DAY_MILLIS
        );
        assert_eq!(
            extend_sponsorship(None, now, 1).timestamp_millis(),
            1_000_000 + DAY_MILLIS
        );
    }

    #[test]
    fn test_extend_stacks_on_running_sponsorship() {
        let now = DateTime::from_millis(0);
        let running = Some(DateTime::from_millis(5 * DAY_MILLIS));
        assert_eq!(
            extend_sponsorship(running, now, 30).timestamp_millis(),
            35 * DAY_MILLIS
        );
    }

    #[test]
    fn test_ad_input_dates() {
        let input: AdInput = serde_json::from_str(
            r#"{"title":"Hosting","targetUrl":"https://example.org","format":"banner","startsAt":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(input.format, AdFormat::Banner);
        assert!(input.starts_at.is_some());
        assert!(input.ends_at.is_none());
    }
}
