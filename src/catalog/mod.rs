//! Directory domain logic
//!
//! Pure functions over documents already loaded into memory: slugs, vote
//! resolution, listing filters and pagination, ad interspersion, health
//! scores, the category tree and discussion threads. Nothing here touches
//! the database.

pub mod ads;
pub mod health;
pub mod listing;
pub mod slug;
pub mod taxonomy;
pub mod threads;
pub mod votes;

pub use ads::{intersperse, is_active, FeedEntry};
pub use health::health_score;
pub use listing::{paginate, ListQuery, Page, ResolvedFilter, SortKey};
pub use slug::slugify;
pub use taxonomy::{build_category_tree, descendant_ids, CategoryNode};
pub use threads::{build_threads, Comment, Thread};
pub use votes::{resolve_vote, score, VoteOutcome, VoteValue};
