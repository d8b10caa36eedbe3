//! Core domain types and utilities for modlog.
//!
//! This crate provides the identifiers and error handling foundation shared
//! by the access-control, query, and server crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ActionId, CommunityId, ParseIdError, UserId};
