//! JSON-file document store.
//!
//! The file uses the TinyDB table layout, with document ids as object keys:
//!
//! ```json
//! {"_default": {"1": {"title": "Buy milk", "complete": false}}}
//! ```
//!
//! `JsonStore` is shared application state. Each request calls
//! [`JsonStore::open`] to get a [`StoreHandle`], which holds the store-wide
//! lock and a fresh read of the file until it is dropped.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::fs;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use super::TodoStore;
use crate::error::StoreError;
use crate::todos::model::{TodoId, TodoItem};

/// Table holding the todo documents.
const DEFAULT_TABLE: &str = "_default";

/// A stored record. The id lives in the table key, not the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Document {
    title: String,
    complete: bool,
}

/// Parsed contents of the store file.
#[derive(Debug, Default)]
struct StoreFile {
    todos: BTreeMap<TodoId, Document>,
    /// Any other tables, written back untouched.
    other_tables: Map<String, Value>,
}

#[derive(Serialize)]
struct StoreFileRef<'a> {
    #[serde(rename = "_default")]
    todos: &'a BTreeMap<TodoId, Document>,
    #[serde(flatten)]
    other_tables: &'a Map<String, Value>,
}

impl StoreFile {
    async fn read(path: &Path) -> Result<Self, StoreError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(StoreError::io(path, e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let corrupt = |source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        };

        let mut other_tables: Map<String, Value> =
            serde_json::from_slice(&bytes).map_err(corrupt)?;
        let todos: BTreeMap<TodoId, Document> = match other_tables.remove(DEFAULT_TABLE) {
            Some(table) => {
                let raw: BTreeMap<String, Document> =
                    serde_json::from_value(table).map_err(corrupt)?;
                raw.into_iter()
                    .map(|(key, doc)| match key.parse::<TodoId>() {
                        Ok(id) if id > 0 => Ok((id, doc)),
                        _ => Err(StoreError::InvalidDocumentId {
                            path: path.to_path_buf(),
                            key,
                        }),
                    })
                    .collect::<Result<_, _>>()?
            }
            None => BTreeMap::new(),
        };

        Ok(Self {
            todos,
            other_tables,
        })
    }

    /// Write to a sibling temp file, then rename over the store file.
    async fn write(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let json = serde_json::to_vec_pretty(&StoreFileRef {
            todos: &self.todos,
            other_tables: &self.other_tables,
        })?;

        let tmp = tmp_path(path);
        fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| StoreError::io(path, e))?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("store.json"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Shared handle factory for one store file.
///
/// Cloning is cheap; all clones share the lock and the id high-water mark.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    /// Highest id issued by this process. Guarded by the store-wide lock.
    high_water: Arc<Mutex<TodoId>>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            high_water: Arc::new(Mutex::new(0)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the store lock and read the file.
    ///
    /// Waits while another handle is open. A missing file reads as an empty
    /// store; malformed JSON is an error.
    pub async fn open(&self) -> Result<StoreHandle, StoreError> {
        let high_water = Arc::clone(&self.high_water).lock_owned().await;
        let file = StoreFile::read(&self.path).await?;
        debug!(path = %self.path.display(), todos = file.todos.len(), "Store handle opened");
        Ok(StoreHandle {
            path: self.path.clone(),
            high_water,
            file,
            opened_at: Instant::now(),
        })
    }
}

/// Request-scoped store access. Dropping it releases the store lock.
///
/// Every mutation is written through to disk before returning. If a write
/// fails the handle's view is ahead of the file and should be discarded.
pub struct StoreHandle {
    path: PathBuf,
    high_water: OwnedMutexGuard<TodoId>,
    file: StoreFile,
    opened_at: Instant,
}

impl StoreHandle {
    fn next_id(&mut self) -> Result<TodoId, StoreError> {
        let highest_on_disk = self.file.todos.keys().next_back().copied().unwrap_or(0);
        let id = highest_on_disk
            .max(*self.high_water)
            .checked_add(1)
            .ok_or_else(|| StoreError::IdExhausted {
                path: self.path.clone(),
            })?;
        *self.high_water = id;
        Ok(id)
    }

    async fn persist(&self) -> Result<(), StoreError> {
        self.file.write(&self.path).await
    }
}

#[async_trait]
impl TodoStore for StoreHandle {
    async fn list_all(&self) -> Result<Vec<TodoItem>, StoreError> {
        Ok(self
            .file
            .todos
            .iter()
            .map(|(id, doc)| TodoItem {
                id: *id,
                title: doc.title.clone(),
                complete: doc.complete,
            })
            .collect())
    }

    async fn insert(&mut self, title: &str) -> Result<TodoId, StoreError> {
        let id = self.next_id()?;
        self.file.todos.insert(
            id,
            Document {
                title: title.to_string(),
                complete: false,
            },
        );
        self.persist().await?;
        info!(id, title, "Todo inserted");
        Ok(id)
    }

    async fn update_title(&mut self, id: TodoId, title: &str) -> Result<bool, StoreError> {
        let Some(doc) = self.file.todos.get_mut(&id) else {
            return Ok(false);
        };
        doc.title = title.to_string();
        self.persist().await?;
        info!(id, title, "Todo title updated");
        Ok(true)
    }

    async fn mark_complete(&mut self, id: TodoId) -> Result<bool, StoreError> {
        let Some(doc) = self.file.todos.get_mut(&id) else {
            return Ok(false);
        };
        if !doc.complete {
            doc.complete = true;
            self.persist().await?;
            info!(id, "Todo marked complete");
        }
        Ok(true)
    }

    async fn delete(&mut self, id: TodoId) -> Result<bool, StoreError> {
        if self.file.todos.remove(&id).is_none() {
            return Ok(false);
        }
        self.persist().await?;
        info!(id, "Todo deleted");
        Ok(true)
    }

    async fn exists(&self, id: TodoId) -> Result<bool, StoreError> {
        Ok(self.file.todos.contains_key(&id))
    }
}

impl Drop for StoreHandle {
    fn drop(&mut self) {
        debug!(
            path = %self.path.display(),
            held_ms = self.opened_at.elapsed().as_millis() as u64,
            "Store handle closed"
        );
    }
}
