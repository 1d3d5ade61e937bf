//! # Bill Split Backend
//!
//! Allocation engine and draft rules behind the new-bill screen. Shared
//! data types live in the `shared` crate so form glue can serialize them.

pub mod config;
pub mod domain;

pub use config::SplitConfig;
pub use domain::models::{Amount, CurrencyFormat, DraftError};
pub use domain::SplitBreakdownService;
