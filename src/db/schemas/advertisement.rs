//! Advertisement document schema
//!
//! Ad creatives with a scheduling window and click/impression counters.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::{ApprovalStatus, Metadata};

/// Collection name for advertisements
pub const ADVERTISEMENT_COLLECTION: &str = "advertisements";

/// Placement format of an ad creative
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdFormat {
    Banner,
    /// Rendered inline between listing items
    #[default]
    Card,
    Popup,
}

impl AdFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "banner" => Some(AdFormat::Banner),
            "card" => Some(AdFormat::Card),
            "popup" => Some(AdFormat::Popup),
            _ => None,
        }
    }
}

/// Counter an ad event increments
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdEvent {
    Click,
    Impression,
}

impl AdEvent {
    pub fn field(self) -> &'static str {
        match self {
            AdEvent::Click => "clicks",
            AdEvent::Impression => "impressions",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AdvertisementDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub advertiser_id: ObjectId,

    pub title: String,

    #[serde(default)]
    pub body: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    pub target_url: String,

    #[serde(default)]
    pub format: AdFormat,

    pub starts_at: DateTime,

    /// Open-ended when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime>,

    #[serde(default)]
    pub status: ApprovalStatus,

    #[serde(default)]
    pub clicks: i64,

    #[serde(default)]
    pub impressions: i64,
}

impl IntoIndexes for AdvertisementDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "status": 1, "starts_at": 1 },
            Some(
                IndexOptions::builder()
                    .name("status_schedule_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for AdvertisementDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
