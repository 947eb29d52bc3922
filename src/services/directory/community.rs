//! Votes, discussions and notifications

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{caller_id, parse_id, required_text, Directory, NotificationView};
use crate::auth::Claims;
use crate::catalog::{build_threads, resolve_vote, score, Comment, Thread, VoteOutcome, VoteValue};
use crate::db::schemas::{AlternativeDoc, ApprovalStatus, DiscussionDoc, Metadata};
use crate::types::{OpenAltError, Result};

const MAX_COMMENT_LEN: usize = 5000;

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub value: VoteValue,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub score: i64,
    /// The caller's vote after this request; `None` once cleared
    pub user_vote: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionInput {
    pub body: String,
    /// Comment being replied to
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub request_creator_response: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MarkedRead {
    pub updated: u64,
}

fn require_approved(alternative: &AlternativeDoc, action: &str) -> Result<()> {
    if alternative.status == ApprovalStatus::Approved {
        Ok(())
    } else {
        Err(OpenAltError::bad_request(format!(
            "Only approved alternatives can be {action}"
        )))
    }
}

impl Directory {
    // =========================================================================
    // Votes
    // =========================================================================

    /// Cast, switch or clear the caller's vote
    pub async fn vote(&self, claims: &Claims, slug: &str, request: VoteRequest) -> Result<VoteResponse> {
        let user_id = caller_id(claims)?;
        let alternative = self.visible_alternative(Some(claims), slug).await?;
        require_approved(&alternative, "voted on")?;
        let alt_id = alternative
            .id
            .ok_or_else(|| OpenAltError::Internal("Alternative has no id".into()))?;

        let existing = self
            .store
            .find_vote(user_id, alt_id)
            .await?
            .and_then(|v| VoteValue::try_from(v.value).ok());

        let outcome = resolve_vote(existing, request.value);
        match outcome {
            VoteOutcome::Cleared => self.store.delete_vote(user_id, alt_id).await?,
            VoteOutcome::Cast(value) => self.store.put_vote(user_id, alt_id, value.as_i32()).await?,
        }

        let votes = self.store.list_votes(alt_id).await?;
        let total = score(votes.iter().filter_map(|v| VoteValue::try_from(v.value).ok()));
        self.store.set_vote_score(alt_id, total).await?;

        debug!(alternative = %slug, user = %user_id, ?outcome, score = total, "Vote recorded");

        Ok(VoteResponse {
            score: total,
            user_vote: outcome.user_vote().map(VoteValue::as_i32),
        })
    }

    // =========================================================================
    // Discussions
    // =========================================================================

    pub async fn list_discussions(&self, viewer: Option<&Claims>, slug: &str) -> Result<Vec<Thread>> {
        let alternative = self.visible_alternative(viewer, slug).await?;
        let Some(alt_id) = alternative.id else {
            return Ok(Vec::new());
        };
        let discussions = self.store.list_discussions(alt_id).await?;
        Ok(build_threads(&discussions))
    }

    /// Post a comment or a reply to a top-level comment
    pub async fn post_discussion(
        &self,
        claims: &Claims,
        slug: &str,
        input: DiscussionInput,
    ) -> Result<Comment> {
        let user_id = caller_id(claims)?;
        let alternative = self.visible_alternative(Some(claims), slug).await?;
        require_approved(&alternative, "discussed")?;
        let alt_id = alternative
            .id
            .ok_or_else(|| OpenAltError::Internal("Alternative has no id".into()))?;

        let body = required_text("Comment", &input.body, MAX_COMMENT_LEN)?;

        let parent = match input.parent_id.as_deref().filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => {
                let parent_id = parse_id(raw, "comment")?;
                let parent = self
                    .store
                    .find_discussion(parent_id)
                    .await?
                    .filter(|p| p.alternative_id == alt_id)
                    .ok_or_else(|| OpenAltError::bad_request("Parent comment not found"))?;
                if parent.parent_id.is_some() {
                    return Err(OpenAltError::bad_request(
                        "Replies can only be made to top-level comments",
                    ));
                }
                Some(parent)
            }
        };

        let mut comment = DiscussionDoc {
            id: None,
            metadata: Metadata::new(),
            alternative_id: alt_id,
            author_id: user_id,
            author_name: claims.name.clone(),
            body,
            parent_id: parent.as_ref().and_then(|p| p.id),
            creator_response_requested: input.request_creator_response,
            is_creator: alternative.is_owned_by(&user_id),
        };
        comment.id = Some(self.store.insert_discussion(comment.clone()).await?);

        if let Some(ref parent) = parent {
            self.notifier
                .discussion_reply(&alternative, parent, &comment)
                .await;
        }
        if comment.creator_response_requested {
            self.notifier
                .creator_response_requested(&alternative, &comment)
                .await;
        }

        Ok(Comment::from(&comment))
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub async fn list_notifications(
        &self,
        claims: &Claims,
        unread_only: bool,
    ) -> Result<Vec<NotificationView>> {
        let user_id = caller_id(claims)?;
        Ok(self
            .store
            .list_notifications(user_id, unread_only)
            .await?
            .iter()
            .map(NotificationView::from)
            .collect())
    }

    pub async fn mark_notification_read(&self, claims: &Claims, id: &str) -> Result<MarkedRead> {
        let user_id = caller_id(claims)?;
        let id = parse_id(id, "notification")?;
        if !self.store.mark_notification_read(user_id, id).await? {
            return Err(OpenAltError::not_found("Notification not found"));
        }
        Ok(MarkedRead { updated: 1 })
    }

    pub async fn mark_all_read(&self, claims: &Claims) -> Result<MarkedRead> {
        let user_id = caller_id(claims)?;
        let updated = self.store.mark_all_notifications_read(user_id).await?;
        Ok(MarkedRead { updated })
    }
}
