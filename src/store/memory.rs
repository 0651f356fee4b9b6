//! In-process document store.
//!
//! Backs tests and local embedding. The whole dataset is one JSON tree
//! behind an `RwLock`; every mutation re-feeds each live watcher the
//! current snapshot of its subscribed subtree.

use std::sync::{Mutex, RwLock};

use serde_json::{Map, Value};
use tokio::sync::watch;
use uuid::Uuid;

use super::{segments, DocumentStore, StoreError};

struct Watcher {
    path: String,
    tx: watch::Sender<Value>,
}

#[derive(Default)]
pub struct MemoryStore {
    root: RwLock<Value>,
    watchers: Mutex<Vec<Watcher>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Value::Object(Map::new())),
            watchers: Mutex::new(Vec::new()),
        }
    }

    fn snapshot_at(root: &Value, path: &str) -> Value {
        let mut node = root;
        for seg in path.split('/').filter(|s| !s.is_empty()) {
            match node.get(seg) {
                Some(child) => node = child,
                None => return Value::Null,
            }
        }
        node.clone()
    }

    /// Push current snapshots to all watchers, dropping closed ones.
    fn notify(&self) {
        let root = self.root.read().unwrap_or_else(|e| e.into_inner());
        let mut watchers = self.watchers.lock().unwrap_or_else(|e| e.into_inner());
        watchers.retain(|w| w.tx.send(Self::snapshot_at(&root, &w.path)).is_ok());
    }

    fn with_parent<F>(&self, path: &str, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Map<String, Value>, &str) -> Result<(), StoreError>,
    {
        let segs = segments(path)?;
        let (leaf, parents) = segs.split_last().expect("segments is non-empty");
        let leaf = *leaf;
        {
            let mut root = self.root.write().unwrap_or_else(|e| e.into_inner());
            let mut node = &mut *root;
            for seg in parents {
                if !node.is_object() {
                    *node = Value::Object(Map::new());
                }
                node = node
                    .as_object_mut()
                    .expect("just coerced to object")
                    .entry(seg.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
            }
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            let parent = node.as_object_mut().expect("just coerced to object");
            f(parent, leaf)?;
        }
        self.notify();
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let root = self.root.read().unwrap_or_else(|e| e.into_inner());
        match Self::snapshot_at(&root, path) {
            Value::Null => Ok(None),
            v => Ok(Some(v)),
        }
    }

    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.with_parent(path, |parent, leaf| {
            parent.insert(leaf.to_string(), value);
            Ok(())
        })
    }

    async fn patch(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let target = path.to_string();
        self.with_parent(path, move |parent, leaf| {
            let slot = parent
                .entry(leaf.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            let obj = slot.as_object_mut().ok_or(StoreError::NotAnObject(target))?;
            for (k, v) in fields {
                obj.insert(k, v);
            }
            Ok(())
        })
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.with_parent(path, |parent, leaf| {
            parent.remove(leaf);
            Ok(())
        })
    }

    fn push_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn subscribe(&self, path: &str) -> watch::Receiver<Value> {
        let initial = {
            let root = self.root.read().unwrap_or_else(|e| e.into_inner());
            Self::snapshot_at(&root, path)
        };
        let (tx, rx) = watch::channel(initial);
        self.watchers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Watcher {
                path: path.to_string(),
                tx,
            });
        rx
    }
}
