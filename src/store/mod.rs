//! Persistence layer: document store for todo items.

pub mod json;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::todos::model::{TodoId, TodoItem};

pub use json::{JsonStore, StoreHandle};

/// Backend-agnostic CRUD over todo items, keyed by document id.
///
/// Conditional operations report a miss as `Ok(false)` and never write.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All items, in ascending id order.
    async fn list_all(&self) -> Result<Vec<TodoItem>, StoreError>;

    /// Insert a new, incomplete item and return its assigned id.
    async fn insert(&mut self, title: &str) -> Result<TodoId, StoreError>;

    /// Replace an item's title.
    async fn update_title(&mut self, id: TodoId, title: &str) -> Result<bool, StoreError>;

    /// Set an item's `complete` flag.
    async fn mark_complete(&mut self, id: TodoId) -> Result<bool, StoreError>;

    /// Remove an item permanently.
    async fn delete(&mut self, id: TodoId) -> Result<bool, StoreError>;

    /// Whether an item with this id exists.
    async fn exists(&self, id: TodoId) -> Result<bool, StoreError>;
}
