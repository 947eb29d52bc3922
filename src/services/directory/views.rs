//! JSON shapes returned by the directory API
//!
//! Stored documents reference taxonomy by id; views resolve those ids to
//! names and slugs. Timestamps are milliseconds since the epoch.

use bson::{oid::ObjectId, DateTime};
use serde::Serialize;
use std::collections::HashMap;

use crate::auth::PermissionLevel;
use crate::catalog::{FeedEntry, Page};
use crate::db::schemas::{
    AdFormat, AdvertisementDoc, AlternativeDoc, ApprovalStatus, LabelKind, NotificationDoc,
    NotificationKind, ProprietaryDoc, SubmissionPlan, UserDoc,
};
use crate::store::DirectoryStore;
use crate::types::Result;

fn hex(id: Option<ObjectId>) -> String {
    id.map(|id| id.to_hex()).unwrap_or_default()
}

fn millis(at: Option<DateTime>) -> Option<i64> {
    at.map(|t| t.timestamp_millis())
}

/// Name and slug of a referenced record
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LabelRef {
    pub name: String,
    pub slug: String,
}

/// Id → label maps for every kind of reference an alternative carries
#[derive(Debug, Default)]
pub struct Lookup {
    pub categories: HashMap<ObjectId, LabelRef>,
    pub tags: HashMap<ObjectId, LabelRef>,
    pub tech_stacks: HashMap<ObjectId, LabelRef>,
    pub proprietary: HashMap<ObjectId, LabelRef>,
}

impl Lookup {
    pub async fn load(store: &dyn DirectoryStore) -> Result<Self> {
        let categories = store
            .list_categories()
            .await?
            .into_iter()
            .filter_map(|c| Some((c.id?, LabelRef { name: c.name, slug: c.slug })))
            .collect();
        let tags = label_map(store, LabelKind::Tag).await?;
        let tech_stacks = label_map(store, LabelKind::TechStack).await?;
        let proprietary = store
            .list_proprietary()
            .await?
            .into_iter()
            .filter_map(|p| Some((p.id?, LabelRef { name: p.name, slug: p.slug })))
            .collect();

        Ok(Self {
            categories,
            tags,
            tech_stacks,
            proprietary,
        })
    }

    /// Id of the entry with `slug` in one of the maps
    pub fn id_by_slug(map: &HashMap<ObjectId, LabelRef>, slug: &str) -> Option<ObjectId> {
        map.iter()
            .find(|(_, label)| label.slug == slug)
            .map(|(id, _)| *id)
    }

    fn refs(map: &HashMap<ObjectId, LabelRef>, ids: &[ObjectId]) -> Vec<LabelRef> {
        ids.iter().filter_map(|id| map.get(id).cloned()).collect()
    }
}

async fn label_map(
    store: &dyn DirectoryStore,
    kind: LabelKind,
) -> Result<HashMap<ObjectId, LabelRef>> {
    Ok(store
        .list_labels(kind)
        .await?
        .into_iter()
        .filter_map(|l| Some((l.id?, LabelRef { name: l.name, slug: l.slug })))
        .collect())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub github_url: Option<String>,
    pub stars: i64,
    pub forks: i64,
    pub contributors: i64,
    pub last_commit_at: Option<i64>,
    pub stats_refreshed_at: Option<i64>,
    pub license: Option<String>,
    pub self_hosted: bool,
    pub health_score: i32,
    pub vote_score: i64,
    pub status: ApprovalStatus,
    pub plan: SubmissionPlan,
    /// Sponsor plan currently in effect
    pub sponsored: bool,
    pub sponsored_until: Option<i64>,
    pub categories: Vec<LabelRef>,
    pub tags: Vec<LabelRef>,
    pub tech_stacks: Vec<LabelRef>,
    pub alternative_to: Vec<LabelRef>,
    pub submitted_by: Option<String>,
    pub created_at: i64,
}

impl AlternativeView {
    pub fn new(doc: &AlternativeDoc, lookup: &Lookup, now: DateTime) -> Self {
        Self {
            id: hex(doc.id),
            name: doc.name.clone(),
            slug: doc.slug.clone(),
            description: doc.description.clone(),
            website: doc.website.clone(),
            github_url: doc.github_url.clone(),
            stars: doc.stars,
            forks: doc.forks,
            contributors: doc.contributors,
            last_commit_at: millis(doc.last_commit_at),
            stats_refreshed_at: millis(doc.stats_refreshed_at),
            license: doc.license.clone(),
            self_hosted: doc.self_hosted,
            health_score: doc.health_score,
            vote_score: doc.vote_score,
            status: doc.status,
            plan: doc.plan,
            sponsored: doc.is_sponsored(now),
            sponsored_until: millis(doc.sponsored_until),
            categories: Lookup::refs(&lookup.categories, &doc.categories),
            tags: Lookup::refs(&lookup.tags, &doc.tags),
            tech_stacks: Lookup::refs(&lookup.tech_stacks, &doc.tech_stacks),
            alternative_to: Lookup::refs(&lookup.proprietary, &doc.alternative_to),
            submitted_by: doc.submitted_by.map(|id| id.to_hex()),
            created_at: doc.metadata.created_millis(),
        }
    }
}

/// Single alternative as seen by one viewer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeDetail {
    #[serde(flatten)]
    pub alternative: AlternativeView,
    /// The viewer's vote, if any
    pub user_vote: Option<i32>,
    /// Whether the viewer may edit the entry
    pub can_edit: bool,
}

/// Listing response; ad slots only appear when they were requested
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Listing {
    Plain(Page<AlternativeView>),
    WithAds(Page<FeedEntry<AlternativeView, AdView>>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProprietaryView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub website: Option<String>,
    pub categories: Vec<LabelRef>,
}

impl ProprietaryView {
    pub fn new(doc: &ProprietaryDoc, lookup: &Lookup) -> Self {
        Self {
            id: hex(doc.id),
            name: doc.name.clone(),
            slug: doc.slug.clone(),
            description: doc.description.clone(),
            website: doc.website.clone(),
            categories: Lookup::refs(&lookup.categories, &doc.categories),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProprietaryDetail {
    #[serde(flatten)]
    pub software: ProprietaryView,
    /// Approved alternatives, best voted first
    pub alternatives: Vec<AlternativeView>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdView {
    pub id: String,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub target_url: String,
    pub format: AdFormat,
    pub starts_at: i64,
    pub ends_at: Option<i64>,
    pub status: ApprovalStatus,
    pub clicks: i64,
    pub impressions: i64,
}

impl From<&AdvertisementDoc> for AdView {
    fn from(doc: &AdvertisementDoc) -> Self {
        Self {
            id: hex(doc.id),
            title: doc.title.clone(),
            body: doc.body.clone(),
            image_url: doc.image_url.clone(),
            target_url: doc.target_url.clone(),
            format: doc.format,
            starts_at: doc.starts_at.timestamp_millis(),
            ends_at: millis(doc.ends_at),
            status: doc.status,
            clicks: doc.clicks,
            impressions: doc.impressions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub link: Option<String>,
    pub read: bool,
    pub created_at: i64,
}

impl From<&NotificationDoc> for NotificationView {
    fn from(doc: &NotificationDoc) -> Self {
        Self {
            id: hex(doc.id),
            kind: doc.kind,
            message: doc.message.clone(),
            link: doc.link.clone(),
            read: doc.read,
            created_at: doc.metadata.created_millis(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub name: String,
    pub permission_level: PermissionLevel,
    pub created_at: i64,
}

impl From<&UserDoc> for UserView {
    fn from(doc: &UserDoc) -> Self {
        Self {
            id: hex(doc.id),
            email: doc.email.clone(),
            name: doc.name.clone(),
            permission_level: doc.permission_level,
            created_at: doc.metadata.created_millis(),
        }
    }
}
