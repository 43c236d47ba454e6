//! JSON file store implementation.
//!
//! Keeps the whole document in memory and rewrites the file after every
//! mutation. Writes go to a sibling temp file first and are renamed into
//! place, so a crash mid-write leaves the previous document intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::trait_::{RemoteStore, Result};
use crate::tree;

/// File-backed store holding a single JSON document.
pub struct JsonFileStore {
    path: PathBuf,
    root: Mutex<Value>,
}

impl JsonFileStore {
    /// Open the document at `path`. A missing file starts an empty document;
    /// parent directories are created on first write.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let root = match fs::read_to_string(&path).await {
            Ok(json) if json.trim().is_empty() => Value::Object(Map::new()),
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Value::Object(Map::new()),
            Err(e) => return Err(e.into()),
        };
        debug!("Opened JSON store at {}", path.display());
        Ok(Self {
            path,
            root: Mutex::new(root),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, root: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(root)?;
        fs::write(&tmp, json.as_bytes()).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for JsonFileStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let root = self.root.lock().await;
        tree::get(&root, path)
    }

    async fn set(&self, path: &str, value: Value) -> Result<()> {
        let mut root = self.root.lock().await;
        let mut next = root.clone();
        tree::set(&mut next, path, value)?;
        self.persist(&next).await?;
        *root = next;
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<()> {
        let mut root = self.root.lock().await;
        let mut next = root.clone();
        tree::update(&mut next, path, fields)?;
        self.persist(&next).await?;
        *root = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::open(temp.path().join("progress.json")).await.unwrap();
        assert_eq!(store.get("players").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("progress.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store
            .set("players/u1/habitats/Arctic/Penguin", json!({"timeTaken": 12.5, "pointsEarned": 20}))
            .await
            .unwrap();
        let fields = json!({"isCompleted": true}).as_object().cloned().unwrap();
        store.update("players/u1/habitats/Arctic/Penguin", fields).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("players/u1/habitats/Arctic/Penguin").await.unwrap(),
            Some(json!({"timeTaken": 12.5, "pointsEarned": 20, "isCompleted": true}))
        );
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_document_unchanged() {
        let temp = TempDir::new().unwrap();
        let store = JsonFileStore::open(temp.path().join("progress.json")).await.unwrap();
        store.set("a", json!(1)).await.unwrap();

        assert!(store.set("a/b", json!(2)).await.is_err());
        assert_eq!(store.get("a").await.unwrap(), Some(json!(1)));
    }
}
