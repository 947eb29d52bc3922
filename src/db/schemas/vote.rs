//! Vote document schema

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for votes
pub const VOTE_COLLECTION: &str = "votes";

/// One user's signed vote on one alternative
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct VoteDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub user_id: ObjectId,

    pub alternative_id: ObjectId,

    /// +1 or -1
    pub value: i32,
}

impl VoteDoc {
    pub fn new(user_id: ObjectId, alternative_id: ObjectId, value: i32) -> Self {
        Self {
            id: None,
            metadata: Metadata::new(),
            user_id,
            alternative_id,
            value,
        }
    }
}

impl IntoIndexes for VoteDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // At most one vote per user per alternative
            (
                doc! { "user_id": 1, "alternative_id": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("user_alternative_unique".to_string())
                        .build(),
                ),
            ),
            (
                doc! { "alternative_id": 1 },
                Some(
                    IndexOptions::builder()
                        .name("alternative_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for VoteDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
