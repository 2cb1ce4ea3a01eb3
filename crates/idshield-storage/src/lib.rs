//! Storage layer for ID Shield
//!
//! This crate provides:
//! - Loading and saving attribute trees (`.voa` snapshot files)
//! - Atomic replacement of existing files

pub mod error;
pub mod store;

pub use error::{Result, StorageError};
pub use store::{AttributeStore, AttributeTree};
