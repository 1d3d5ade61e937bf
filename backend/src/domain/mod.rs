//! # Domain Module
//!
//! Business logic for splitting a bill between participants.
//!
//! ## Module Organization
//!
//! - **allocation**: the pure allocation engine (sums, even splits, rebalancing)
//! - **allocation_status**: classifies a split (balanced, excess, deficit, invalid,
//!   below minimum)
//! - **split_breakdown_service**: draft-level operations used by the new-bill form
//! - **commands**: inputs to the service
//! - **models**: money and error types
//!
//! Nothing here renders UI, talks to the network or persists drafts.

pub mod allocation;
pub mod allocation_status;
pub mod commands;
pub mod models;
pub mod split_breakdown_service;

pub use allocation::*;
pub use allocation_status::*;
pub use commands::*;
pub use split_breakdown_service::*;
