//! Category and label document schemas
//!
//! Categories form a tree through an optional parent reference. Tags and
//! tech stacks are flat labels sharing one document shape.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for categories
pub const CATEGORY_COLLECTION: &str = "categories";

/// Collection name for tags
pub const TAG_COLLECTION: &str = "tags";

/// Collection name for tech stacks
pub const TECH_STACK_COLLECTION: &str = "tech_stacks";

/// Category document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CategoryDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    pub slug: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ObjectId>,
}

impl IntoIndexes for CategoryDoc {
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
                doc! { "parent": 1 },
                Some(
                    IndexOptions::builder()
                        .name("parent_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for CategoryDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

/// Which label collection a `LabelDoc` lives in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Tag,
    TechStack,
}

impl LabelKind {
    pub fn collection(self) -> &'static str {
        match self {
            LabelKind::Tag => TAG_COLLECTION,
            LabelKind::TechStack => TECH_STACK_COLLECTION,
        }
    }
}

/// Tag or tech stack document
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct LabelDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    pub slug: String,
}

impl IntoIndexes for LabelDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "slug": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("slug_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for LabelDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
