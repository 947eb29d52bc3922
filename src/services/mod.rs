//! Services behind the REST API
//!
//! - **directory**: every directory operation, independent of HTTP
//! - **github**: repository statistics from the GitHub REST API
//! - **paypal**: sponsor plan checkout through PayPal Orders v2
//! - **notifier**: in-app notifications

pub mod directory;
pub mod github;
pub mod notifier;
pub mod paypal;

pub use directory::{Directory, DirectorySettings};
pub use github::{GitHubClient, RepoStats, RepoStatsSource};
pub use notifier::Notifier;
pub use paypal::{CapturedOrder, CreatedOrder, PayPalClient, PaymentGateway};
