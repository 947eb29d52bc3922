//! MongoDB directory store

use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use mongodb::options::ReturnDocument;
use tracing::debug;

use super::DirectoryStore;
use crate::db::schemas::{
    AdEvent, AdvertisementDoc, AlternativeDoc, ApprovalStatus, CategoryDoc, DiscussionDoc,
    LabelDoc, LabelKind, NotificationDoc, PaymentOrderDoc, PaymentStatus, ProprietaryDoc, UserDoc,
    VoteDoc, ADVERTISEMENT_COLLECTION, ALTERNATIVE_COLLECTION, CATEGORY_COLLECTION,
    DISCUSSION_COLLECTION, NOTIFICATION_COLLECTION, PAYMENT_COLLECTION, PROPRIETARY_COLLECTION,
    TAG_COLLECTION, TECH_STACK_COLLECTION, USER_COLLECTION, VOTE_COLLECTION,
};
use crate::db::{is_duplicate_key, MongoClient, MongoCollection};
use crate::types::{OpenAltError, Result};

/// Fields a replace never writes: identity and creation metadata, plus the
/// values `set_vote_score` and `set_sponsorship` maintain
const REPLACE_SKIPPED: &[&str] = &[
    "_id",
    "metadata",
    "vote_score",
    "plan",
    "sponsored_until",
    "submitted_by",
];

/// Optional fields omitted when `None`, cleared with `$unset`
const REPLACE_OPTIONAL: &[&str] = &[
    "website",
    "github_url",
    "last_commit_at",
    "stats_refreshed_at",
    "license",
];

/// Targeted update for an edited alternative
fn replacement_update(alternative: &AlternativeDoc) -> Result<Document> {
    let mut set = bson::to_document(alternative)?;
    for key in REPLACE_SKIPPED {
        set.remove(*key);
    }
    let unset: Document = REPLACE_OPTIONAL
        .iter()
        .filter(|key| !set.contains_key(**key))
        .map(|key| (key.to_string(), Bson::String(String::new())))
        .collect();
    set.insert("metadata.updated_at", DateTime::now());

    let mut update = doc! { "$set": set };
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    Ok(update)
}

/// MongoDB-backed store. Collections (and their indexes) are opened once.
pub struct MongoStore {
    client: MongoClient,
    users: MongoCollection<UserDoc>,
    categories: MongoCollection<CategoryDoc>,
    tags: MongoCollection<LabelDoc>,
    tech_stacks: MongoCollection<LabelDoc>,
    proprietary: MongoCollection<ProprietaryDoc>,
    alternatives: MongoCollection<AlternativeDoc>,
    votes: MongoCollection<VoteDoc>,
    discussions: MongoCollection<DiscussionDoc>,
    notifications: MongoCollection<NotificationDoc>,
    advertisements: MongoCollection<AdvertisementDoc>,
    payments: MongoCollection<PaymentOrderDoc>,
}

impl MongoStore {
    pub async fn new(client: MongoClient) -> Result<Self> {
        let store = Self {
            users: client.collection(USER_COLLECTION).await?,
            categories: client.collection(CATEGORY_COLLECTION).await?,
            tags: client.collection(TAG_COLLECTION).await?,
            tech_stacks: client.collection(TECH_STACK_COLLECTION).await?,
            proprietary: client.collection(PROPRIETARY_COLLECTION).await?,
            alternatives: client.collection(ALTERNATIVE_COLLECTION).await?,
            votes: client.collection(VOTE_COLLECTION).await?,
            discussions: client.collection(DISCUSSION_COLLECTION).await?,
            notifications: client.collection(NOTIFICATION_COLLECTION).await?,
            advertisements: client.collection(ADVERTISEMENT_COLLECTION).await?,
            payments: client.collection(PAYMENT_COLLECTION).await?,
            client,
        };
        debug!(db = store.client.db_name(), "MongoDB store ready");
        Ok(store)
    }

    /// Connect and open every collection
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        let client = MongoClient::new(uri, db_name).await?;
        Self::new(client).await
    }

    fn labels(&self, kind: LabelKind) -> &MongoCollection<LabelDoc> {
        match kind {
            LabelKind::Tag => &self.tags,
            LabelKind::TechStack => &self.tech_stacks,
        }
    }
}

fn by_name() -> Option<Document> {
    Some(doc! { "name": 1 })
}

fn newest_first() -> Option<Document> {
    Some(doc! { "metadata.created_at": -1 })
}

fn status_filter(status: Option<ApprovalStatus>) -> Document {
    match status {
        Some(status) => doc! { "status": status.as_str() },
        None => doc! {},
    }
}

fn payment_status(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Created => "created",
        PaymentStatus::Captured => "captured",
        PaymentStatus::Failed => "failed",
    }
}

#[async_trait::async_trait]
impl DirectoryStore for MongoStore {
    fn backend(&self) -> &'static str {
        "mongodb"
    }

    async fn insert_user(&self, user: UserDoc) -> Result<ObjectId> {
        self.users.insert_one(user).await.map_err(|e| match e {
            OpenAltError::Conflict(_) => {
                OpenAltError::Conflict("An account with this email already exists".into())
            }
            other => other,
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>> {
        self.users.find_one(doc! { "email": email }).await
    }

    async fn find_user(&self, id: ObjectId) -> Result<Option<UserDoc>> {
        self.users.find_one(doc! { "_id": id }).await
    }

    async fn upsert_category(&self, mut category: CategoryDoc) -> Result<ObjectId> {
        match self.categories.find_one(doc! { "slug": &category.slug }).await? {
            Some(stored) => {
                let id = stored
                    .id
                    .ok_or_else(|| OpenAltError::Database("Stored category has no _id".into()))?;
                category.id = Some(id);
                category.metadata.created_at = stored.metadata.created_at;
                self.categories.replace_by_id(id, category).await?;
                Ok(id)
            }
            None => {
                category.id = None;
                self.categories.insert_one(category).await
            }
        }
    }

    async fn list_categories(&self) -> Result<Vec<CategoryDoc>> {
        self.categories.find_many(doc! {}, by_name()).await
    }

    async fn upsert_label(&self, kind: LabelKind, mut label: LabelDoc) -> Result<ObjectId> {
        let collection = self.labels(kind);
        match collection.find_one(doc! { "slug": &label.slug }).await? {
            Some(stored) => {
                let id = stored
                    .id
                    .ok_or_else(|| OpenAltError::Database("Stored label has no _id".into()))?;
                label.id = Some(id);
                label.metadata.created_at = stored.metadata.created_at;
                collection.replace_by_id(id, label).await?;
                Ok(id)
            }
            None => {
                label.id = None;
                collection.insert_one(label).await
            }
        }
    }

    async fn list_labels(&self, kind: LabelKind) -> Result<Vec<LabelDoc>> {
        self.labels(kind).find_many(doc! {}, by_name()).await
    }

    async fn upsert_proprietary(&self, mut software: ProprietaryDoc) -> Result<ObjectId> {
        match self.proprietary.find_one(doc! { "slug": &software.slug }).await? {
            Some(stored) => {
                let id = stored.id.ok_or_else(|| {
                    OpenAltError::Database("Stored proprietary software has no _id".into())
                })?;
                software.id = Some(id);
                software.metadata.created_at = stored.metadata.created_at;
                self.proprietary.replace_by_id(id, software).await?;
                Ok(id)
            }
            None => {
                software.id = None;
                self.proprietary.insert_one(software).await
            }
        }
    }

    async fn find_proprietary(&self, slug: &str) -> Result<Option<ProprietaryDoc>> {
        self.proprietary.find_one(doc! { "slug": slug }).await
    }

    async fn list_proprietary(&self) -> Result<Vec<ProprietaryDoc>> {
        self.proprietary.find_many(doc! {}, by_name()).await
    }

    async fn insert_alternative(&self, mut alternative: AlternativeDoc) -> Result<ObjectId> {
        alternative.id = None;
        let slug = alternative.slug.clone();
        self.alternatives
            .insert_one(alternative)
            .await
            .map_err(|e| match e {
                OpenAltError::Conflict(_) => OpenAltError::Conflict(format!(
                    "An alternative with slug '{}' already exists",
                    slug
                )),
                other => other,
            })
    }

    async fn upsert_alternative(&self, mut alternative: AlternativeDoc) -> Result<ObjectId> {
        match self
            .alternatives
            .find_one(doc! { "slug": &alternative.slug })
            .await?
        {
            Some(stored) => {
                let id = stored
                    .id
                    .ok_or_else(|| OpenAltError::Database("Stored alternative has no _id".into()))?;
                alternative.id = Some(id);
                alternative.vote_score = stored.vote_score;
                alternative.submitted_by = stored.submitted_by;
                alternative.metadata.created_at = stored.metadata.created_at;
                self.alternatives.replace_by_id(id, alternative).await?;
                Ok(id)
            }
            None => self.insert_alternative(alternative).await,
        }
    }

    async fn replace_alternative(&self, alternative: AlternativeDoc) -> Result<AlternativeDoc> {
        let id = alternative
            .id
            .ok_or_else(|| OpenAltError::Internal("Cannot replace an alternative without id".into()))?;
        let update = replacement_update(&alternative)?;

        self.alternatives
            .inner()
            .find_one_and_update(doc! { "_id": id, "metadata.is_deleted": { "$ne": true } }, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    OpenAltError::Conflict(format!(
                        "An alternative with slug '{}' already exists",
                        alternative.slug
                    ))
                } else {
                    OpenAltError::Database(format!("Alternative update failed: {}", e))
                }
            })?
            .ok_or_else(|| OpenAltError::not_found("Alternative not found"))
    }

    async fn set_sponsorship(&self, alternative_id: ObjectId, until: DateTime) -> Result<AlternativeDoc> {
        self.alternatives
            .inner()
            .find_one_and_update(
                doc! { "_id": alternative_id, "metadata.is_deleted": { "$ne": true } },
                doc! {
                    "$set": {
                        "plan": "sponsor",
                        "sponsored_until": until,
                        "metadata.updated_at": DateTime::now(),
                    }
                },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| OpenAltError::Database(format!("Sponsorship update failed: {}", e)))?
            .ok_or_else(|| OpenAltError::not_found("Alternative not found"))
    }

    async fn find_alternative(&self, slug: &str) -> Result<Option<AlternativeDoc>> {
        self.alternatives.find_one(doc! { "slug": slug }).await
    }

    async fn find_alternative_by_id(&self, id: ObjectId) -> Result<Option<AlternativeDoc>> {
        self.alternatives.find_one(doc! { "_id": id }).await
    }

    async fn list_alternatives(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<AlternativeDoc>> {
        self.alternatives.find_many(status_filter(status), None).await
    }

    async fn find_vote(
        &self,
        user_id: ObjectId,
        alternative_id: ObjectId,
    ) -> Result<Option<VoteDoc>> {
        self.votes
            .find_one(doc! { "user_id": user_id, "alternative_id": alternative_id })
            .await
    }

    async fn put_vote(&self, user_id: ObjectId, alternative_id: ObjectId, value: i32) -> Result<()> {
        let now = DateTime::now();
        self.votes
            .inner()
            .update_one(
                doc! { "user_id": user_id, "alternative_id": alternative_id },
                doc! {
                    "$set": { "value": value, "metadata.updated_at": now },
                    "$setOnInsert": {
                        "metadata.created_at": now,
                        "metadata.is_deleted": false,
                    },
                },
            )
            .upsert(true)
            .await
            .map_err(|e| OpenAltError::Database(format!("Vote upsert failed: {}", e)))?;
        Ok(())
    }

    async fn delete_vote(&self, user_id: ObjectId, alternative_id: ObjectId) -> Result<()> {
        self.votes
            .delete_one(doc! { "user_id": user_id, "alternative_id": alternative_id })
            .await?;
        Ok(())
    }

    async fn list_votes(&self, alternative_id: ObjectId) -> Result<Vec<VoteDoc>> {
        self.votes
            .find_many(doc! { "alternative_id": alternative_id }, None)
            .await
    }

    async fn set_vote_score(&self, alternative_id: ObjectId, score: i64) -> Result<()> {
        let result = self
            .alternatives
            .update_one(
                doc! { "_id": alternative_id },
                doc! { "$set": { "vote_score": score } },
            )
            .await?;
        if result.matched_count == 0 {
            return Err(OpenAltError::not_found("Alternative not found"));
        }
        Ok(())
    }

    async fn insert_discussion(&self, mut discussion: DiscussionDoc) -> Result<ObjectId> {
        discussion.id = None;
        self.discussions.insert_one(discussion).await
    }

    async fn find_discussion(&self, id: ObjectId) -> Result<Option<DiscussionDoc>> {
        self.discussions.find_one(doc! { "_id": id }).await
    }

    async fn list_discussions(&self, alternative_id: ObjectId) -> Result<Vec<DiscussionDoc>> {
        self.discussions
            .find_many(doc! { "alternative_id": alternative_id }, None)
            .await
    }

    async fn insert_notification(&self, mut notification: NotificationDoc) -> Result<ObjectId> {
        notification.id = None;
        self.notifications.insert_one(notification).await
    }

    async fn list_notifications(
        &self,
        user_id: ObjectId,
        unread_only: bool,
    ) -> Result<Vec<NotificationDoc>> {
        let mut filter = doc! { "user_id": user_id };
        if unread_only {
            filter.insert("read", false);
        }
        self.notifications.find_many(filter, newest_first()).await
    }

    async fn mark_notification_read(&self, user_id: ObjectId, id: ObjectId) -> Result<bool> {
        let result = self
            .notifications
            .update_one(
                doc! { "_id": id, "user_id": user_id },
                doc! { "$set": { "read": true } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn mark_all_notifications_read(&self, user_id: ObjectId) -> Result<u64> {
        let result = self
            .notifications
            .update_many(
                doc! { "user_id": user_id, "read": false },
                doc! { "$set": { "read": true, "metadata.updated_at": DateTime::now() } },
            )
            .await?;
        Ok(result.modified_count)
    }

    async fn insert_advertisement(&self, mut ad: AdvertisementDoc) -> Result<ObjectId> {
        ad.id = None;
        self.advertisements.insert_one(ad).await
    }

    async fn find_advertisement(&self, id: ObjectId) -> Result<Option<AdvertisementDoc>> {
        self.advertisements.find_one(doc! { "_id": id }).await
    }

    async fn list_advertisements(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<AdvertisementDoc>> {
        self.advertisements
            .find_many(status_filter(status), Some(doc! { "metadata.created_at": 1 }))
            .await
    }

    async fn set_advertisement_status(&self, id: ObjectId, status: ApprovalStatus) -> Result<bool> {
        let result = self
            .advertisements
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "status": status.as_str() } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn record_ad_event(&self, id: ObjectId, event: AdEvent) -> Result<bool> {
        let mut inc = Document::new();
        inc.insert(event.field(), 1_i64);
        let result = self
            .advertisements
            .update_one(doc! { "_id": id }, doc! { "$inc": inc })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn insert_payment(&self, mut payment: PaymentOrderDoc) -> Result<ObjectId> {
        payment.id = None;
        self.payments.insert_one(payment).await
    }

    async fn find_payment(&self, order_id: &str) -> Result<Option<PaymentOrderDoc>> {
        self.payments.find_one(doc! { "order_id": order_id }).await
    }

    async fn set_payment_status(
        &self,
        order_id: &str,
        status: PaymentStatus,
        capture_id: Option<String>,
    ) -> Result<bool> {
        let mut set = doc! { "status": payment_status(status) };
        if let Some(capture_id) = capture_id {
            set.insert("capture_id", capture_id);
        }
        let result = self
            .payments
            .update_one(doc! { "order_id": order_id }, doc! { "$set": set })
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replacement_leaves_votes_and_sponsorship() {
        let alternative = AlternativeDoc {
            id: Some(ObjectId::new()),
            name: "Gimp".into(),
            slug: "gimp".into(),
            description: "Image editor".into(),
            license: Some("GPL-3.0".into()),
            vote_score: 4,
            ..Default::default()
        };
        let update = replacement_update(&alternative).unwrap();

        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("description").unwrap(), "Image editor");
        for key in REPLACE_SKIPPED {
            assert!(!set.contains_key(*key), "{key} must not be written");
        }
        assert!(set.contains_key("metadata.updated_at"));

        let unset = update.get_document("$unset").unwrap();
        assert!(unset.contains_key("github_url"));
        assert!(!unset.contains_key("license"));
    }
}
