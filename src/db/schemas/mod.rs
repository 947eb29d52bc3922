//! Database schemas for OpenAlt
//!
//! Defines the MongoDB document structures of the directory.

mod advertisement;
mod alternative;
mod category;
mod discussion;
mod metadata;
mod notification;
mod payment;
mod proprietary;
mod user;
mod vote;

pub use advertisement::{AdEvent, AdFormat, AdvertisementDoc, ADVERTISEMENT_COLLECTION};
pub use alternative::{AlternativeDoc, ApprovalStatus, SubmissionPlan, ALTERNATIVE_COLLECTION};
pub use category::{
    CategoryDoc, LabelDoc, LabelKind, CATEGORY_COLLECTION, TAG_COLLECTION, TECH_STACK_COLLECTION,
};
pub use discussion::{DiscussionDoc, DISCUSSION_COLLECTION};
pub use metadata::Metadata;
pub use notification::{NotificationDoc, NotificationKind, NOTIFICATION_COLLECTION};
pub use payment::{PaymentOrderDoc, PaymentStatus, PAYMENT_COLLECTION};
pub use proprietary::{ProprietaryDoc, PROPRIETARY_COLLECTION};
pub use user::{UserDoc, USER_COLLECTION};
pub use vote::{VoteDoc, VOTE_COLLECTION};
