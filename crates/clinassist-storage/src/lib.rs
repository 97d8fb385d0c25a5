//! clinassist-storage
//!
//! Durable client-side key/value storage for session artifacts. Thin
//! file-backed store plus an in-memory store for tests and ephemeral runs.

pub mod error;
pub mod keys;
pub mod objects;
pub mod state;

pub use crate::error::StorageError;
pub use crate::objects::{FileStore, KeyValueStore, MemoryStore};
