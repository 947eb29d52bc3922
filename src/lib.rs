//! OpenAlt - directory of open-source alternatives to proprietary software
//!
//! A JSON REST API for browsing, submitting, voting on and discussing
//! open-source projects listed against the commercial products they
//! replace.
//!
//! ## Layers
//!
//! - **catalog**: pure domain logic (slugs, votes, listing, ads, health)
//! - **store**: the query layer, backed by MongoDB or memory
//! - **services**: directory operations plus GitHub and PayPal clients
//! - **routes** / **server**: hyper HTTP front end
//! - **seed**: curated taxonomy and entries for a fresh database

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod routes;
pub mod seed;
pub mod server;
pub mod services;
pub mod store;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{OpenAltError, Result};
