//! Session persistence and field validation for the account flows.
//!
//! This module provides:
//! - `SessionStore`: token/profile persistence across the two storage
//!   lifetimes (durable vs. ephemeral)
//! - `validate`: pure field-level validators for the account forms

pub mod store;
pub mod validate;

pub use store::{FileStore, KeyValueStore, MemoryStore, SessionStore, StorageLifetime};
