//! Todo data model and input parsing.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Document identifier, assigned by the store at insert time.
pub type TodoId = u64;

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Store-assigned id.
    pub id: TodoId,
    /// Short title, never empty.
    pub title: String,
    /// One-way flag: false until completed.
    pub complete: bool,
}

impl TodoItem {
    pub fn new(id: TodoId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            complete: false,
        }
    }
}

/// Trim a submitted title, rejecting empty and whitespace-only input.
pub fn parse_title(raw: Option<&str>) -> Result<String, ValidationError> {
    match raw.map(str::trim) {
        Some(title) if !title.is_empty() => Ok(title.to_string()),
        _ => Err(ValidationError::EmptyTitle),
    }
}

/// Parse a submitted id. Ids are positive integers.
pub fn parse_todo_id(raw: Option<&str>) -> Result<TodoId, ValidationError> {
    let raw = raw.unwrap_or_default();
    match raw.trim().parse::<TodoId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::InvalidId(raw.to_string())),
    }
}
