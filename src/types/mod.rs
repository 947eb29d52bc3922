//! Shared types

mod error;

pub use error::{OpenAltError, Result};
