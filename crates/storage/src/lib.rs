//! Remote store abstraction and implementations for Reefwarden.
//!
//! This crate provides a path-addressed store interface with an in-memory
//! and a JSON file implementation.

#![warn(missing_docs)]

pub mod json_storage;
pub mod memory;
pub mod trait_;
pub mod tree;

pub use json_storage::JsonFileStore;
pub use memory::MemoryStore;
pub use trait_::{RemoteStore, Result, StoreError};
