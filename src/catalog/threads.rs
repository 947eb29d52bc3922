//! Discussion threads
//!
//! Comments are stored flat; a thread is one top-level comment plus its
//! replies. Replies only go one level deep.

use bson::oid::ObjectId;
use serde::Serialize;
use std::collections::HashMap;

use crate::db::schemas::DiscussionDoc;

/// One comment as returned by the API
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub author_name: String,
    pub body: String,
    pub creator_response_requested: bool,
    pub is_creator: bool,
    /// Milliseconds since the epoch
    pub created_at: i64,
}

impl From<&DiscussionDoc> for Comment {
    fn from(doc: &DiscussionDoc) -> Self {
        Self {
            id: doc.id.map(|id| id.to_hex()).unwrap_or_default(),
            author_id: doc.author_id.to_hex(),
            author_name: doc.author_name.clone(),
            body: doc.body.clone(),
            creator_response_requested: doc.creator_response_requested,
            is_creator: doc.is_creator,
            created_at: doc.metadata.created_millis(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Thread {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Group comments into threads: newest thread first, replies oldest first.
/// Replies whose parent is not a top-level comment in `discussions` are dropped.
pub fn build_threads(discussions: &[DiscussionDoc]) -> Vec<Thread> {
    let mut tops: Vec<&DiscussionDoc> = discussions
        .iter()
        .filter(|d| d.parent_id.is_none() && d.id.is_some())
        .collect();
    tops.sort_by(|a, b| {
        b.metadata
            .created_millis()
            .cmp(&a.metadata.created_millis())
            .then_with(|| b.id.cmp(&a.id))
    });

    let mut replies: HashMap<ObjectId, Vec<&DiscussionDoc>> = HashMap::new();
    for reply in discussions.iter().filter(|d| d.parent_id.is_some()) {
        if let Some(parent) = reply.parent_id {
            replies.entry(parent).or_default().push(reply);
        }
    }

    tops.into_iter()
        .map(|top| {
            let mut children = top
                .id
                .and_then(|id| replies.remove(&id))
                .unwrap_or_default();
            children.sort_by(|a, b| {
                a.metadata
                    .created_millis()
                    .cmp(&b.metadata.created_millis())
                    .then_with(|| a.id.cmp(&b.id))
            });
            Thread {
                comment: Comment::from(top),
                replies: children.into_iter().map(Comment::from).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::Metadata;
    use bson::DateTime;

    fn comment(body: &str, at: i64, parent: Option<ObjectId>) -> DiscussionDoc {
        DiscussionDoc {
            id: Some(ObjectId::new()),
            metadata: Metadata {
                created_at: Some(DateTime::from_millis(at)),
                ..Default::default()
            },
            alternative_id: ObjectId::new(),
            author_id: ObjectId::new(),
            author_name: "Grace".into(),
            body: body.into(),
            parent_id: parent,
            ..Default::default()
        }
    }

    #[test]
    fn test_threads_order() {
        let old = comment("first", 1_000, None);
        let new = comment("second", 2_000, None);
        let late_reply = comment("late", 5_000, old.id);
        let early_reply = comment("early", 3_000, old.id);

        let threads = build_threads(&[old, late_reply, new, early_reply]);
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].comment.body, "second");
        assert!(threads[0].replies.is_empty());

        let bodies: Vec<_> = threads[1].replies.iter().map(|r| r.body.as_str()).collect();
        assert_eq!(bodies, vec!["early", "late"]);
    }

    #[test]
    fn test_orphan_replies_dropped() {
        let top = comment("top", 1_000, None);
        let orphan = comment("orphan", 2_000, Some(ObjectId::new()));
        let threads = build_threads(&[top, orphan]);
        assert_eq!(threads.len(), 1);
        assert!(threads[0].replies.is_empty());
    }

    #[test]
    fn test_thread_json_is_flat() {
        let threads = build_threads(&[comment("hello", 1_000, None)]);
        let json = serde_json::to_value(&threads[0]).unwrap();
        assert_eq!(json["body"], "hello");
        assert_eq!(json["authorName"], "Grace");
        assert!(json["replies"].as_array().unwrap().is_empty());
    }
}
