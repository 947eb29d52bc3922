//! Notification fan-out
//!
//! Notifications are a side effect of the action that caused them. A failed
//! notification is logged and never fails that action.

use bson::{oid::ObjectId, DateTime};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::db::schemas::{
    AdvertisementDoc, AlternativeDoc, ApprovalStatus, DiscussionDoc, NotificationDoc,
    NotificationKind,
};
use crate::store::DirectoryStore;

#[derive(Clone)]
pub struct Notifier {
    store: Arc<dyn DirectoryStore>,
}

fn alternative_link(alternative: &AlternativeDoc) -> Option<String> {
    Some(format!("/alternatives/{}", alternative.slug))
}

impl Notifier {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self { store }
    }

    async fn send(&self, user_id: ObjectId, kind: NotificationKind, message: String, link: Option<String>) {
        let notification = NotificationDoc::new(user_id, kind, message, link);
        match self.store.insert_notification(notification).await {
            Ok(id) => debug!(user = %user_id, notification = %id, ?kind, "Notification stored"),
            Err(e) => warn!(user = %user_id, ?kind, "Failed to store notification: {}", e),
        }
    }

    /// Tell the author of `parent` that `reply` answered them
    pub async fn discussion_reply(
        &self,
        alternative: &AlternativeDoc,
        parent: &DiscussionDoc,
        reply: &DiscussionDoc,
    ) {
        if parent.author_id == reply.author_id {
            return;
        }
        self.send(
            parent.author_id,
            NotificationKind::DiscussionReply,
            format!("{} replied to your comment on {}", reply.author_name, alternative.name),
            alternative_link(alternative),
        )
        .await;
    }

    /// Ask the submitter of `alternative` to respond to `comment`
    pub async fn creator_response_requested(
        &self,
        alternative: &AlternativeDoc,
        comment: &DiscussionDoc,
    ) {
        let Some(submitter) = alternative.submitted_by else {
            return;
        };
        if submitter == comment.author_id {
            return;
        }
        self.send(
            submitter,
            NotificationKind::CreatorResponseRequested,
            format!(
                "{} asked for your response on {}",
                comment.author_name, alternative.name
            ),
            alternative_link(alternative),
        )
        .await;
    }

    /// Tell the submitter about a moderation decision
    pub async fn submission_decided(&self, alternative: &AlternativeDoc) {
        let Some(submitter) = alternative.submitted_by else {
            return;
        };
        let (kind, message) = match alternative.status {
            ApprovalStatus::Approved => (
                NotificationKind::SubmissionApproved,
                format!("{} was approved and is now listed", alternative.name),
            ),
            ApprovalStatus::Rejected => (
                NotificationKind::SubmissionRejected,
                format!("{} was not accepted into the directory", alternative.name),
            ),
            ApprovalStatus::Pending => return,
        };
        self.send(submitter, kind, message, alternative_link(alternative))
            .await;
    }

    pub async fn advertisement_decided(&self, ad: &AdvertisementDoc, status: ApprovalStatus) {
        let (kind, message) = match status {
            ApprovalStatus::Approved => (
                NotificationKind::AdvertisementApproved,
                format!("Your advertisement \"{}\" was approved", ad.title),
            ),
            ApprovalStatus::Rejected => (
                NotificationKind::AdvertisementRejected,
                format!("Your advertisement \"{}\" was rejected", ad.title),
            ),
            ApprovalStatus::Pending => return,
        };
        self.send(ad.advertiser_id, kind, message, None).await;
    }

    pub async fn sponsorship_activated(
        &self,
        user_id: ObjectId,
        alternative: &AlternativeDoc,
        until: DateTime,
    ) {
        let until = until
            .try_to_rfc3339_string()
            .unwrap_or_else(|_| until.to_string());
        self.send(
            user_id,
            NotificationKind::SponsorshipActivated,
            format!("{} is sponsored until {}", alternative.name, until),
            alternative_link(alternative),
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn comment(author: ObjectId, name: &str) -> DiscussionDoc {
        DiscussionDoc {
            id: Some(ObjectId::new()),
            alternative_id: ObjectId::new(),
            author_id: author,
            author_name: name.into(),
            body: "hi".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_reply_notifies_parent_author_only() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Notifier::new(store.clone());
        let (ada, bob) = (ObjectId::new(), ObjectId::new());
        let alt = AlternativeDoc {
            name: "Zulip".into(),
            slug: "zulip".into(),
            ..Default::default()
        };

        let parent = comment(ada, "Ada");
        notifier.discussion_reply(&alt, &parent, &comment(bob, "Bob")).await;
        notifier.discussion_reply(&alt, &parent, &comment(ada, "Ada")).await;

        let inbox = store.list_notifications(ada, false).await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].message, "Bob replied to your comment on Zulip");
        assert_eq!(inbox[0].link.as_deref(), Some("/alternatives/zulip"));
    }

    #[tokio::test]
    async fn test_seeded_entries_have_no_submitter_to_notify() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Notifier::new(store.clone());
        let alt = AlternativeDoc {
            name: "Gimp".into(),
            status: ApprovalStatus::Approved,
            ..Default::default()
        };
        notifier.submission_decided(&alt).await;
        let author = ObjectId::new();
        notifier
            .creator_response_requested(&alt, &comment(author, "Eve"))
            .await;
        assert!(store.list_notifications(author, false).await.unwrap().is_empty());
    }
}
