//! Live-subscription document store.
//!
//! Abstraction over the hosted realtime database the clinic data lives in:
//! a JSON tree addressed by slash-separated paths, with full-overwrite
//! writes, shallow merges, and push-style child id generation. Subscriptions
//! deliver full-subtree snapshots and refire on any change under the
//! subscribed root.
//!
//! Consistency model is per-document last-write-wins. There is no
//! transaction primitive; multi-document transitions (relationship
//! accept/cancel) are sequential writes and can land half-applied.

pub mod memory;

pub use memory::MemoryStore;

use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::watch;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not an object at {0}")]
    NotAnObject(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Document store consumed by the services in this crate.
///
/// Implementations are expected to be cheap to share (`&self` methods) and
/// to tolerate concurrent callers. `subscribe` returns a last-snapshot-wins
/// channel: slow readers observe the newest state, never a backlog.
#[allow(async_fn_in_trait)]
pub trait DocumentStore: Send + Sync {
    /// One-shot read. `None` when nothing exists at `path`.
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Full overwrite of the document at `path`, creating parents as needed.
    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Shallow merge of `fields` into the object at `path`. The target is
    /// created as an empty object when absent.
    async fn patch(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError>;

    /// Remove the document at `path`. Removing a missing path is a no-op.
    async fn delete(&self, path: &str) -> Result<(), StoreError>;

    /// Generate a fresh child id for appends to a collection.
    fn push_id(&self) -> String;

    /// Subscribe to the subtree at `path`. The receiver starts at the
    /// current snapshot; a missing subtree is delivered as `Value::Null`.
    fn subscribe(&self, path: &str) -> watch::Receiver<Value>;
}

/// Split a document path into its segments, rejecting empty paths.
pub(crate) fn segments(path: &str) -> Result<Vec<&str>, StoreError> {
    let segs: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segs.is_empty() {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(segs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_rejects_empty_paths() {
        assert!(segments("").is_err());
        assert!(segments("///").is_err());
        assert_eq!(segments("users/u1").unwrap(), vec!["users", "u1"]);
        assert_eq!(segments("/users/").unwrap(), vec!["users"]);
    }
}
