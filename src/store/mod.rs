//! Directory storage
//!
//! `DirectoryStore` is the query layer every handler delegates to. Two
//! backends implement it:
//! - `MongoStore` for deployments
//! - `MemoryStore` for dev mode without a database, dry-run seeding, and tests
//!
//! Both enforce the same uniqueness rules (slugs, emails, one vote per user
//! per alternative, order ids) and report violations as `Conflict`.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use bson::{oid::ObjectId, DateTime};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Args;
use crate::db::schemas::{
    AdEvent, AdvertisementDoc, AlternativeDoc, ApprovalStatus, CategoryDoc, DiscussionDoc,
    LabelDoc, LabelKind, NotificationDoc, PaymentOrderDoc, PaymentStatus, ProprietaryDoc, UserDoc,
    VoteDoc,
};
use crate::types::Result;

/// Database query layer of the directory
#[async_trait::async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Backend name reported by `/health`
    fn backend(&self) -> &'static str;

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a user; `Conflict` when the email is taken
    async fn insert_user(&self, user: UserDoc) -> Result<ObjectId>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>>;
    async fn find_user(&self, id: ObjectId) -> Result<Option<UserDoc>>;

    // =========================================================================
    // Taxonomy
    // =========================================================================

    /// Insert or update a category by slug, returning its id
    async fn upsert_category(&self, category: CategoryDoc) -> Result<ObjectId>;
    async fn list_categories(&self) -> Result<Vec<CategoryDoc>>;
    /// Insert or update a tag or tech stack by slug, returning its id
    async fn upsert_label(&self, kind: LabelKind, label: LabelDoc) -> Result<ObjectId>;
    async fn list_labels(&self, kind: LabelKind) -> Result<Vec<LabelDoc>>;

    // =========================================================================
    // Proprietary software
    // =========================================================================

    async fn upsert_proprietary(&self, software: ProprietaryDoc) -> Result<ObjectId>;
    async fn find_proprietary(&self, slug: &str) -> Result<Option<ProprietaryDoc>>;
    async fn list_proprietary(&self) -> Result<Vec<ProprietaryDoc>>;

    // =========================================================================
    // Alternatives
    // =========================================================================

    /// Insert a new alternative; `Conflict` when the slug is taken
    async fn insert_alternative(&self, alternative: AlternativeDoc) -> Result<ObjectId>;

    /// Insert or update by slug. An existing record keeps its id, creation
    /// time, vote score and submitter.
    async fn upsert_alternative(&self, alternative: AlternativeDoc) -> Result<ObjectId>;

    /// Overwrite a stored alternative (matched by id) and return it as stored.
    /// The vote score, sponsorship and submitter keep their stored values;
    /// `set_vote_score` and `set_sponsorship` own those. `NotFound` when gone.
    async fn replace_alternative(&self, alternative: AlternativeDoc) -> Result<AlternativeDoc>;

    /// Switch an alternative to the sponsor plan until `until`
    async fn set_sponsorship(&self, alternative_id: ObjectId, until: DateTime)
        -> Result<AlternativeDoc>;

    async fn find_alternative(&self, slug: &str) -> Result<Option<AlternativeDoc>>;
    async fn find_alternative_by_id(&self, id: ObjectId) -> Result<Option<AlternativeDoc>>;

    /// All alternatives, or only those with `status`
    async fn list_alternatives(&self, status: Option<ApprovalStatus>)
        -> Result<Vec<AlternativeDoc>>;

    // =========================================================================
    // Votes
    // =========================================================================

    async fn find_vote(&self, user_id: ObjectId, alternative_id: ObjectId)
        -> Result<Option<VoteDoc>>;

    /// Store a user's vote, replacing any previous one
    async fn put_vote(&self, user_id: ObjectId, alternative_id: ObjectId, value: i32)
        -> Result<()>;

    async fn delete_vote(&self, user_id: ObjectId, alternative_id: ObjectId) -> Result<()>;
    async fn list_votes(&self, alternative_id: ObjectId) -> Result<Vec<VoteDoc>>;

    /// Store the denormalized score on the alternative
    async fn set_vote_score(&self, alternative_id: ObjectId, score: i64) -> Result<()>;

    // =========================================================================
    // Discussions
    // =========================================================================

    async fn insert_discussion(&self, discussion: DiscussionDoc) -> Result<ObjectId>;
    async fn find_discussion(&self, id: ObjectId) -> Result<Option<DiscussionDoc>>;
    async fn list_discussions(&self, alternative_id: ObjectId) -> Result<Vec<DiscussionDoc>>;

    // =========================================================================
    // Notifications
    // =========================================================================

    async fn insert_notification(&self, notification: NotificationDoc) -> Result<ObjectId>;

    /// A user's notifications, newest first
    async fn list_notifications(&self, user_id: ObjectId, unread_only: bool)
        -> Result<Vec<NotificationDoc>>;

    /// Mark one of `user_id`'s notifications read; false when no such notification
    async fn mark_notification_read(&self, user_id: ObjectId, id: ObjectId) -> Result<bool>;

    /// Mark every unread notification of `user_id` read, returning how many changed
    async fn mark_all_notifications_read(&self, user_id: ObjectId) -> Result<u64>;

    // =========================================================================
    // Advertisements
    // =========================================================================

    async fn insert_advertisement(&self, ad: AdvertisementDoc) -> Result<ObjectId>;
    async fn find_advertisement(&self, id: ObjectId) -> Result<Option<AdvertisementDoc>>;
    async fn list_advertisements(&self, status: Option<ApprovalStatus>)
        -> Result<Vec<AdvertisementDoc>>;
    async fn set_advertisement_status(&self, id: ObjectId, status: ApprovalStatus)
        -> Result<bool>;

    /// Increment the click or impression counter
    async fn record_ad_event(&self, id: ObjectId, event: AdEvent) -> Result<bool>;

    // =========================================================================
    // Payment orders
    // =========================================================================

    /// Insert an order; `Conflict` when the order id is already recorded
    async fn insert_payment(&self, payment: PaymentOrderDoc) -> Result<ObjectId>;
    async fn find_payment(&self, order_id: &str) -> Result<Option<PaymentOrderDoc>>;
    async fn set_payment_status(
        &self,
        order_id: &str,
        status: PaymentStatus,
        capture_id: Option<String>,
    ) -> Result<bool>;
}

/// Open the configured store. Dev mode falls back to memory when MongoDB
/// cannot be reached; production treats that as fatal.
pub async fn open(args: &Args) -> Result<Arc<dyn DirectoryStore>> {
    match MongoStore::connect(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(store) => {
            info!("Connected to MongoDB database '{}'", args.mongodb_db);
            Ok(Arc::new(store))
        }
        Err(e) if args.dev_mode => {
            warn!("MongoDB unavailable ({}), using in-memory store", e);
            Ok(Arc::new(MemoryStore::new()))
        }
        Err(e) => Err(e),
    }
}
