//! Discussion document schema
//!
//! Comments on an alternative. A comment with a `parent_id` is a reply;
//! replies are one level deep.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for discussions
pub const DISCUSSION_COLLECTION: &str = "discussions";

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct DiscussionDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub alternative_id: ObjectId,

    pub author_id: ObjectId,

    /// Author display name at the time of posting
    pub author_name: String,

    pub body: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ObjectId>,

    /// Author asked the project's submitter to respond
    #[serde(default)]
    pub creator_response_requested: bool,

    /// Posted by the user who submitted the alternative
    #[serde(default)]
    pub is_creator: bool,
}

impl IntoIndexes for DiscussionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "alternative_id": 1, "metadata.created_at": -1 },
            Some(
                IndexOptions::builder()
                    .name("alternative_created_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for DiscussionDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
