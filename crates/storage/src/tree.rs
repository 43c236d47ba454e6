//! Path operations over an in-memory JSON tree.
//!
//! Shared by every backend that keeps the whole document in memory.

use serde_json::{Map, Value};

use crate::trait_::{Result, StoreError};

/// Split a slash path into segments. Leading/trailing slashes are ignored,
/// empty inner segments are rejected.
pub fn segments(path: &str) -> Result<Vec<&str>> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    let parts: Vec<&str> = trimmed.split('/').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(parts)
}

/// Value at `path`, cloned.
pub fn get(root: &Value, path: &str) -> Result<Option<Value>> {
    let mut node = root;
    for seg in segments(path)? {
        match node.get(seg) {
            Some(child) => node = child,
            None => return Ok(None),
        }
    }
    if node.is_null() {
        Ok(None)
    } else {
        Ok(Some(node.clone()))
    }
}

/// Replace the value at `path`; `null` removes it.
pub fn set(root: &mut Value, path: &str, value: Value) -> Result<()> {
    let segs = segments(path)?;
    let (last, parents) = segs
        .split_last()
        .ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;

    if value.is_null() {
        if let Some(parent) = walk_existing(root, parents) {
            if let Some(obj) = parent.as_object_mut() {
                obj.remove(*last);
            }
        }
        return Ok(());
    }

    let parent = walk_create(root, parents, path)?;
    parent.insert((*last).to_string(), value);
    Ok(())
}

/// Shallow merge `fields` into the object at `path`.
pub fn update(root: &mut Value, path: &str, fields: Map<String, Value>) -> Result<()> {
    let segs = segments(path)?;
    let target = walk_create(root, &segs, path)?;
    for (key, value) in fields {
        if value.is_null() {
            target.remove(&key);
        } else {
            target.insert(key, value);
        }
    }
    Ok(())
}

fn walk_existing<'a>(root: &'a mut Value, segs: &[&str]) -> Option<&'a mut Value> {
    let mut node = root;
    for seg in segs {
        node = node.get_mut(*seg)?;
    }
    Some(node)
}

/// Walk to the object at `segs`, creating empty objects on the way.
fn walk_create<'a>(
    root: &'a mut Value,
    segs: &[&str],
    path: &str,
) -> Result<&'a mut Map<String, Value>> {
    if root.is_null() {
        *root = Value::Object(Map::new());
    }
    let mut node = root;
    for seg in segs {
        let obj = node
            .as_object_mut()
            .ok_or_else(|| StoreError::NotAContainer(path.to_string()))?;
        let child = obj
            .entry((*seg).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if child.is_null() {
            *child = Value::Object(Map::new());
        }
        node = child;
    }
    node.as_object_mut()
        .ok_or_else(|| StoreError::NotAContainer(path.to_string()))
}
