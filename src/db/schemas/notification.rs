//! Notification document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for notifications
pub const NOTIFICATION_COLLECTION: &str = "notifications";

/// What triggered a notification
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Someone replied to the user's comment
    #[default]
    DiscussionReply,
    /// A commenter asked the submitter of an alternative to respond
    CreatorResponseRequested,
    SubmissionApproved,
    SubmissionRejected,
    AdvertisementApproved,
    AdvertisementRejected,
    SponsorshipActivated,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct NotificationDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Recipient
    pub user_id: ObjectId,

    pub kind: NotificationKind,

    pub message: String,

    /// Client-side path the notification points at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default)]
    pub read: bool,
}

impl NotificationDoc {
    pub fn new(
        user_id: ObjectId,
        kind: NotificationKind,
        message: impl Into<String>,
        link: Option<String>,
    ) -> Self {
        Self {
            id: None,
            metadata: Metadata::new(),
            user_id,
            kind,
            message: message.into(),
            link,
            read: false,
        }
    }
}

impl IntoIndexes for NotificationDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "user_id": 1, "read": 1 },
            Some(
                IndexOptions::builder()
                    .name("user_read_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for NotificationDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
