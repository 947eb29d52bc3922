//! In-memory directory store
//!
//! Keeps every collection in a `Vec` behind one `RwLock`. Used when dev mode
//! runs without MongoDB, for `openalt-seed --dry-run`, and in tests.

use bson::{oid::ObjectId, DateTime};
use tokio::sync::RwLock;

use super::DirectoryStore;
use crate::db::schemas::{
    AdEvent, AdvertisementDoc, AlternativeDoc, ApprovalStatus, CategoryDoc, DiscussionDoc,
    LabelDoc, LabelKind, Metadata, NotificationDoc, PaymentOrderDoc, PaymentStatus,
    ProprietaryDoc, SubmissionPlan, UserDoc, VoteDoc,
};
use crate::types::{OpenAltError, Result};

#[derive(Default)]
struct Tables {
    users: Vec<UserDoc>,
    categories: Vec<CategoryDoc>,
    tags: Vec<LabelDoc>,
    tech_stacks: Vec<LabelDoc>,
    proprietary: Vec<ProprietaryDoc>,
    alternatives: Vec<AlternativeDoc>,
    votes: Vec<VoteDoc>,
    discussions: Vec<DiscussionDoc>,
    notifications: Vec<NotificationDoc>,
    advertisements: Vec<AdvertisementDoc>,
    payments: Vec<PaymentOrderDoc>,
}

impl Tables {
    fn labels(&self, kind: LabelKind) -> &Vec<LabelDoc> {
        match kind {
            LabelKind::Tag => &self.tags,
            LabelKind::TechStack => &self.tech_stacks,
        }
    }

    fn labels_mut(&mut self, kind: LabelKind) -> &mut Vec<LabelDoc> {
        match kind {
            LabelKind::Tag => &mut self.tags,
            LabelKind::TechStack => &mut self.tech_stacks,
        }
    }
}

/// Fresh metadata and id for a record about to be inserted
fn stamp(id: &mut Option<ObjectId>, metadata: &mut Metadata) -> ObjectId {
    let new_id = ObjectId::new();
    *id = Some(new_id);
    *metadata = Metadata::new();
    new_id
}

/// Keep creation time from the stored record, refresh the update time
fn carry_metadata(stored: &Metadata, incoming: &mut Metadata) {
    incoming.created_at = stored.created_at;
    incoming.is_deleted = false;
    incoming.deleted_at = None;
    incoming.updated_at = Some(DateTime::now());
}

fn sorted_by_name<T: Clone>(items: &[T], name: impl Fn(&T) -> &str) -> Vec<T> {
    let mut items = items.to_vec();
    items.sort_by_key(|item| name(item).to_lowercase());
    items
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DirectoryStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert_user(&self, mut user: UserDoc) -> Result<ObjectId> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(OpenAltError::Conflict(
                "An account with this email already exists".into(),
            ));
        }
        let id = stamp(&mut user.id, &mut user.metadata);
        tables.users.push(user);
        Ok(id)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserDoc>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user(&self, id: ObjectId) -> Result<Option<UserDoc>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == Some(id)).cloned())
    }

    async fn upsert_category(&self, mut category: CategoryDoc) -> Result<ObjectId> {
        let mut tables = self.tables.write().await;
        if let Some(stored) = tables.categories.iter_mut().find(|c| c.slug == category.slug) {
            let id = stored.id.unwrap_or_else(ObjectId::new);
            category.id = Some(id);
            carry_metadata(&stored.metadata, &mut category.metadata);
            *stored = category;
            return Ok(id);
        }
        let id = stamp(&mut category.id, &mut category.metadata);
        tables.categories.push(category);
        Ok(id)
    }

    async fn list_categories(&self) -> Result<Vec<CategoryDoc>> {
        let tables = self.tables.read().await;
        Ok(sorted_by_name(&tables.categories, |c| &c.name))
    }

    async fn upsert_label(&self, kind: LabelKind, mut label: LabelDoc) -> Result<ObjectId> {
        let mut tables = self.tables.write().await;
        let labels = tables.labels_mut(kind);
        if let Some(stored) = labels.iter_mut().find(|l| l.slug == label.slug) {
            let id = stored.id.unwrap_or_else(ObjectId::new);
            label.id = Some(id);
            carry_metadata(&stored.metadata, &mut label.metadata);
            *stored = label;
            return Ok(id);
        }
        let id = stamp(&mut label.id, &mut label.metadata);
        labels.push(label);
        Ok(id)
    }

    async fn list_labels(&self, kind: LabelKind) -> Result<Vec<LabelDoc>> {
        let tables = self.tables.read().await;
        Ok(sorted_by_name(tables.labels(kind), |l| &l.name))
    }

    async fn upsert_proprietary(&self, mut software: ProprietaryDoc) -> Result<ObjectId> {
        let mut tables = self.tables.write().await;
        if let Some(stored) = tables.proprietary.iter_mut().find(|p| p.slug == software.slug) {
            let id = stored.id.unwrap_or_else(ObjectId::new);
            software.id = Some(id);
            carry_metadata(&stored.metadata, &mut software.metadata);
            *stored = software;
            return Ok(id);
        }
        let id = stamp(&mut software.id, &mut software.metadata);
        tables.proprietary.push(software);
        Ok(id)
    }

    async fn find_proprietary(&self, slug: &str) -> Result<Option<ProprietaryDoc>> {
        let tables = self.tables.read().await;
        Ok(tables.proprietary.iter().find(|p| p.slug == slug).cloned())
    }

    async fn list_proprietary(&self) -> Result<Vec<ProprietaryDoc>> {
        let tables = self.tables.read().await;
        Ok(sorted_by_name(&tables.proprietary, |p| &p.name))
    }

    async fn insert_alternative(&self, mut alternative: AlternativeDoc) -> Result<ObjectId> {
        let mut tables = self.tables.write().await;
        if tables.alternatives.iter().any(|a| a.slug == alternative.slug) {
            return Err(OpenAltError::Conflict(format!(
                "An alternative with slug '{}' already exists",
                alternative.slug
            )));
        }
        let id = stamp(&mut alternative.id, &mut alternative.metadata);
        tables.alternatives.push(alternative);
        Ok(id)
    }

    async fn upsert_alternative(&self, mut alternative: AlternativeDoc) -> Result<ObjectId> {
        let mut tables = self.tables.write().await;
        if let Some(stored) = tables
            .alternatives
            .iter_mut()
            .find(|a| a.slug == alternative.slug)
        {
            let id = stored.id.unwrap_or_else(ObjectId::new);
            alternative.id = Some(id);
            alternative.vote_score = stored.vote_score;
            alternative.submitted_by = stored.submitted_by;
            carry_metadata(&stored.metadata, &mut alternative.metadata);
            *stored = alternative;
            return Ok(id);
        }
        let id = stamp(&mut alternative.id, &mut alternative.metadata);
        tables.alternatives.push(alternative);
        Ok(id)
    }

    async fn replace_alternative(&self, mut alternative: AlternativeDoc) -> Result<AlternativeDoc> {
        let id = alternative
            .id
            .ok_or_else(|| OpenAltError::Internal("Cannot replace an alternative without id".into()))?;

        let mut tables = self.tables.write().await;
        if tables
            .alternatives
            .iter()
            .any(|a| a.slug == alternative.slug && a.id != Some(id))
        {
            return Err(OpenAltError::Conflict(format!(
                "An alternative with slug '{}' already exists",
                alternative.slug
            )));
        }

        let stored = tables
            .alternatives
            .iter_mut()
            .find(|a| a.id == Some(id))
            .ok_or_else(|| OpenAltError::not_found("Alternative not found"))?;
        alternative.vote_score = stored.vote_score;
        alternative.plan = stored.plan;
        alternative.sponsored_until = stored.sponsored_until;
        alternative.submitted_by = stored.submitted_by;
        carry_metadata(&stored.metadata, &mut alternative.metadata);
        *stored = alternative;
        Ok(stored.clone())
    }

    async fn set_sponsorship(&self, alternative_id: ObjectId, until: DateTime) -> Result<AlternativeDoc> {
        let mut tables = self.tables.write().await;
        let alternative = tables
            .alternatives
            .iter_mut()
            .find(|a| a.id == Some(alternative_id))
            .ok_or_else(|| OpenAltError::not_found("Alternative not found"))?;
        alternative.plan = SubmissionPlan::Sponsor;
        alternative.sponsored_until = Some(until);
        alternative.metadata.touch();
        Ok(alternative.clone())
    }

    async fn find_alternative(&self, slug: &str) -> Result<Option<AlternativeDoc>> {
        let tables = self.tables.read().await;
        Ok(tables.alternatives.iter().find(|a| a.slug == slug).cloned())
    }

    async fn find_alternative_by_id(&self, id: ObjectId) -> Result<Option<AlternativeDoc>> {
        let tables = self.tables.read().await;
        Ok(tables.alternatives.iter().find(|a| a.id == Some(id)).cloned())
    }

    async fn list_alternatives(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<AlternativeDoc>> {
        let tables = self.tables.read().await;
        Ok(tables
            .alternatives
            .iter()
            .filter(|a| status.map(|s| a.status == s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn find_vote(
        &self,
        user_id: ObjectId,
        alternative_id: ObjectId,
    ) -> Result<Option<VoteDoc>> {
        let tables = self.tables.read().await;
        Ok(tables
            .votes
            .iter()
            .find(|v| v.user_id == user_id && v.alternative_id == alternative_id)
            .cloned())
    }

    async fn put_vote(&self, user_id: ObjectId, alternative_id: ObjectId, value: i32) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables
            .votes
            .iter_mut()
            .find(|v| v.user_id == user_id && v.alternative_id == alternative_id)
        {
            Some(vote) => {
                vote.value = value;
                vote.metadata.touch();
            }
            None => {
                let mut vote = VoteDoc::new(user_id, alternative_id, value);
                vote.id = Some(ObjectId::new());
                tables.votes.push(vote);
            }
        }
        Ok(())
    }

    async fn delete_vote(&self, user_id: ObjectId, alternative_id: ObjectId) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables
            .votes
            .retain(|v| !(v.user_id == user_id && v.alternative_id == alternative_id));
        Ok(())
    }

    async fn list_votes(&self, alternative_id: ObjectId) -> Result<Vec<VoteDoc>> {
        let tables = self.tables.read().await;
        Ok(tables
            .votes
            .iter()
            .filter(|v| v.alternative_id == alternative_id)
            .cloned()
            .collect())
    }

    async fn set_vote_score(&self, alternative_id: ObjectId, score: i64) -> Result<()> {
        let mut tables = self.tables.write().await;
        let alternative = tables
            .alternatives
            .iter_mut()
            .find(|a| a.id == Some(alternative_id))
            .ok_or_else(|| OpenAltError::not_found("Alternative not found"))?;
        alternative.vote_score = score;
        alternative.metadata.touch();
        Ok(())
    }

    async fn insert_discussion(&self, mut discussion: DiscussionDoc) -> Result<ObjectId> {
        let mut tables = self.tables.write().await;
        let id = stamp(&mut discussion.id, &mut discussion.metadata);
        tables.discussions.push(discussion);
        Ok(id)
    }

    async fn find_discussion(&self, id: ObjectId) -> Result<Option<DiscussionDoc>> {
        let tables = self.tables.read().await;
        Ok(tables.discussions.iter().find(|d| d.id == Some(id)).cloned())
    }

    async fn list_discussions(&self, alternative_id: ObjectId) -> Result<Vec<DiscussionDoc>> {
        let tables = self.tables.read().await;
        Ok(tables
            .discussions
            .iter()
            .filter(|d| d.alternative_id == alternative_id)
            .cloned()
            .collect())
    }

    async fn insert_notification(&self, mut notification: NotificationDoc) -> Result<ObjectId> {
        let mut tables = self.tables.write().await;
        let id = stamp(&mut notification.id, &mut notification.metadata);
        tables.notifications.push(notification);
        Ok(id)
    }

    async fn list_notifications(
        &self,
        user_id: ObjectId,
        unread_only: bool,
    ) -> Result<Vec<NotificationDoc>> {
        let tables = self.tables.read().await;
        // Insertion order is creation order, so reversing gives newest first
        Ok(tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id && !(unread_only && n.read))
            .cloned()
            .collect())
    }

    async fn mark_notification_read(&self, user_id: ObjectId, id: ObjectId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables
            .notifications
            .iter_mut()
            .find(|n| n.id == Some(id) && n.user_id == user_id)
        {
            Some(notification) => {
                notification.read = true;
                notification.metadata.touch();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&self, user_id: ObjectId) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for notification in tables
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.read)
        {
            notification.read = true;
            notification.metadata.touch();
            changed += 1;
        }
        Ok(changed)
    }

    async fn insert_advertisement(&self, mut ad: AdvertisementDoc) -> Result<ObjectId> {
        let mut tables = self.tables.write().await;
        let id = stamp(&mut ad.id, &mut ad.metadata);
        tables.advertisements.push(ad);
        Ok(id)
    }

    async fn find_advertisement(&self, id: ObjectId) -> Result<Option<AdvertisementDoc>> {
        let tables = self.tables.read().await;
        Ok(tables.advertisements.iter().find(|a| a.id == Some(id)).cloned())
    }

    async fn list_advertisements(
        &self,
        status: Option<ApprovalStatus>,
    ) -> Result<Vec<AdvertisementDoc>> {
        let tables = self.tables.read().await;
        Ok(tables
            .advertisements
            .iter()
            .filter(|a| status.map(|s| a.status == s).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn set_advertisement_status(&self, id: ObjectId, status: ApprovalStatus) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.advertisements.iter_mut().find(|a| a.id == Some(id)) {
            Some(ad) => {
                ad.status = status;
                ad.metadata.touch();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn record_ad_event(&self, id: ObjectId, event: AdEvent) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.advertisements.iter_mut().find(|a| a.id == Some(id)) {
            Some(ad) => {
                match event {
                    AdEvent::Click => ad.clicks += 1,
                    AdEvent::Impression => ad.impressions += 1,
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_payment(&self, mut payment: PaymentOrderDoc) -> Result<ObjectId> {
        let mut tables = self.tables.write().await;
        if tables.payments.iter().any(|p| p.order_id == payment.order_id) {
            return Err(OpenAltError::Conflict(format!(
                "Order {} is already recorded",
                payment.order_id
            )));
        }
        let id = stamp(&mut payment.id, &mut payment.metadata);
        tables.payments.push(payment);
        Ok(id)
    }

    async fn find_payment(&self, order_id: &str) -> Result<Option<PaymentOrderDoc>> {
        let tables = self.tables.read().await;
        Ok(tables.payments.iter().find(|p| p.order_id == order_id).cloned())
    }

    async fn set_payment_status(
        &self,
        order_id: &str,
        status: PaymentStatus,
        capture_id: Option<String>,
    ) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.payments.iter_mut().find(|p| p.order_id == order_id) {
            Some(payment) => {
                payment.status = status;
                if capture_id.is_some() {
                    payment.capture_id = capture_id;
                }
                payment.metadata.touch();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alternative(name: &str) -> AlternativeDoc {
        AlternativeDoc {
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: "test".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let store = MemoryStore::new();
        store.insert_alternative(alternative("Gimp")).await.unwrap();
        let err = store.insert_alternative(alternative("Gimp")).await.unwrap_err();
        assert!(matches!(err, OpenAltError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_upsert_keeps_id_and_votes() {
        let store = MemoryStore::new();
        let id = store.upsert_alternative(alternative("Krita")).await.unwrap();
        store.set_vote_score(id, 7).await.unwrap();

        let mut updated = alternative("Krita");
        updated.description = "Digital painting".into();
        let again = store.upsert_alternative(updated).await.unwrap();

        assert_eq!(id, again);
        let stored = store.find_alternative("krita").await.unwrap().unwrap();
        assert_eq!(stored.vote_score, 7);
        assert_eq!(stored.description, "Digital painting");
        assert_eq!(store.list_alternatives(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_keeps_votes_and_sponsorship() {
        let store = MemoryStore::new();
        let id = store.insert_alternative(alternative("Inkscape")).await.unwrap();
        let loaded = store.find_alternative_by_id(id).await.unwrap().unwrap();

        store.set_vote_score(id, 3).await.unwrap();
        let until = DateTime::from_millis(DateTime::now().timestamp_millis() + 86_400_000);
        store.set_sponsorship(id, until).await.unwrap();

        let mut edited = loaded;
        edited.description = "Vector graphics".into();
        let stored = store.replace_alternative(edited).await.unwrap();

        assert_eq!(stored.description, "Vector graphics");
        assert_eq!(stored.vote_score, 3);
        assert_eq!(stored.plan, SubmissionPlan::Sponsor);
        assert_eq!(stored.sponsored_until, Some(until));
        let reread = store.find_alternative("inkscape").await.unwrap().unwrap();
        assert_eq!(reread.vote_score, 3);
    }

    #[tokio::test]
    async fn test_one_vote_per_user() {
        let store = MemoryStore::new();
        let (user, alt) = (ObjectId::new(), ObjectId::new());
        store.put_vote(user, alt, 1).await.unwrap();
        store.put_vote(user, alt, -1).await.unwrap();

        let votes = store.list_votes(alt).await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].value, -1);

        store.delete_vote(user, alt).await.unwrap();
        assert!(store.find_vote(user, alt).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_notifications_scoped_to_user() {
        let store = MemoryStore::new();
        let (alice, bob) = (ObjectId::new(), ObjectId::new());
        let kind = crate::db::schemas::NotificationKind::DiscussionReply;
        let first = store
            .insert_notification(NotificationDoc::new(alice, kind, "one", None))
            .await
            .unwrap();
        store
            .insert_notification(NotificationDoc::new(alice, kind, "two", None))
            .await
            .unwrap();

        assert!(!store.mark_notification_read(bob, first).await.unwrap());
        assert!(store.mark_notification_read(alice, first).await.unwrap());

        let unread = store.list_notifications(alice, true).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].message, "two");
        assert_eq!(store.mark_all_notifications_read(alice).await.unwrap(), 1);
        assert_eq!(store.mark_all_notifications_read(alice).await.unwrap(), 0);
    }
}
