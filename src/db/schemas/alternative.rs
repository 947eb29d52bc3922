//! Alternative document schema
//!
//! An open-source project listed as a substitute for one or more
//! proprietary products.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for alternatives
pub const ALTERNATIVE_COLLECTION: &str = "alternatives";

/// Moderation state shared by alternatives and advertisements
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Some(ApprovalStatus::Pending),
            "approved" => Some(ApprovalStatus::Approved),
            "rejected" => Some(ApprovalStatus::Rejected),
            _ => None,
        }
    }
}

/// Listing tier
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionPlan {
    #[default]
    Free,
    /// Paid tier with priority placement
    Sponsor,
}

/// Alternative document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AlternativeDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    /// URL-safe unique key derived from the name
    pub slug: String,

    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,

    #[serde(default)]
    pub stars: i64,

    #[serde(default)]
    pub forks: i64,

    #[serde(default)]
    pub contributors: i64,

    /// Last push to the default branch, as reported by GitHub
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_commit_at: Option<DateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_refreshed_at: Option<DateTime>,

    /// SPDX identifier, e.g. "GPL-3.0"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default)]
    pub self_hosted: bool,

    /// 0-100 activity summary
    #[serde(default)]
    pub health_score: i32,

    /// Sum of signed votes
    #[serde(default)]
    pub vote_score: i64,

    #[serde(default)]
    pub status: ApprovalStatus,

    #[serde(default)]
    pub plan: SubmissionPlan,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsored_until: Option<DateTime>,

    #[serde(default)]
    pub categories: Vec<ObjectId>,

    #[serde(default)]
    pub tags: Vec<ObjectId>,

    #[serde(default)]
    pub tech_stacks: Vec<ObjectId>,

    /// Proprietary products this project replaces
    #[serde(default)]
    pub alternative_to: Vec<ObjectId>,

    /// User who submitted the entry (None for seeded entries)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<ObjectId>,
}

impl AlternativeDoc {
    /// Whether the sponsor tier is in effect at `now`
    pub fn is_sponsored(&self, now: DateTime) -> bool {
        self.plan == SubmissionPlan::Sponsor
            && self.sponsored_until.map(|until| until > now).unwrap_or(false)
    }

    /// Whether `user_id` submitted this entry
    pub fn is_owned_by(&self, user_id: &ObjectId) -> bool {
        self.submitted_by.as_ref() == Some(user_id)
    }
}

impl IntoIndexes for AlternativeDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            (
                doc! { "slug": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("slug_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "status": 1, "vote_score": -1 },
                Some(
                    IndexOptions::builder()
                        .name("status_votes_index".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "alternative_to": 1 },
                Some(
                    IndexOptions::builder()
                        .name("alternative_to_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for AlternativeDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sponsorship_expires() {
        let now = DateTime::now();
        let mut alt = AlternativeDoc {
            plan: SubmissionPlan::Sponsor,
            sponsored_until: Some(DateTime::from_millis(now.timestamp_millis() + 1_000)),
            ..Default::default()
        };
        assert!(alt.is_sponsored(now));

        alt.sponsored_until = Some(DateTime::from_millis(now.timestamp_millis() - 1_000));
        assert!(!alt.is_sponsored(now));

        alt.plan = SubmissionPlan::Free;
        alt.sponsored_until = None;
        assert!(!alt.is_sponsored(now));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(ApprovalStatus::parse("Approved"), Some(ApprovalStatus::Approved));
        assert_eq!(ApprovalStatus::parse("nope"), None);
        assert_eq!(ApprovalStatus::Rejected.as_str(), "rejected");
    }
}
