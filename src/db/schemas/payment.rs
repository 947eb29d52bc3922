//! Payment order document schema
//!
//! Tracks PayPal orders placed for the sponsor plan.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for payment orders
pub const PAYMENT_COLLECTION: &str = "payment_orders";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Created,
    Captured,
    Failed,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PaymentOrderDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Order id assigned by PayPal
    pub order_id: String,

    pub alternative_id: ObjectId,

    pub user_id: ObjectId,

    /// Decimal amount as sent to PayPal
    pub amount: String,

    pub currency: String,

    #[serde(default)]
    pub status: PaymentStatus,

    /// PayPal capture id once captured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_id: Option<String>,
}

impl IntoIndexes for PaymentOrderDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "order_id": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("order_id_unique".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for PaymentOrderDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}
