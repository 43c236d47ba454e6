//! In-process store.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::trait_::{RemoteStore, Result};
use crate::tree;

/// Store backed by a JSON tree held in memory.
///
/// Each call locks the tree for its own duration only, so a read followed
/// by a write from the same caller is two separate operations, exactly like
/// a networked backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    root: Mutex<Value>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_root(Value::Object(Map::new()))
    }

    /// Create a store seeded with a document.
    pub fn with_root(root: Value) -> Self {
        Self { root: Mutex::new(root) }
    }

    /// Copy of the whole document.
    pub async fn snapshot(&self) -> Value {
        self.root.lock().await.clone()
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let root = self.root.lock().await;
        tree::get(&root, path)
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        let mut root = self.root.lock().await;
        tree::set(&mut root, path, value)
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<()> {
        let mut root = self.root.lock().await;
        tree::update(&mut root, path, fields)
    }
}
