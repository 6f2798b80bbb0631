//! Todo operations behind the HTTP handlers: validate, delegate to the
//! store, report an outcome.

use std::fmt;

use tracing::{debug, warn};

use super::model::{TodoId, TodoItem, parse_title, parse_todo_id};
use crate::error::{StoreError, ValidationError};
use crate::store::TodoStore;

/// A successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added { id: TodoId, title: String },
    Updated(TodoId),
    Completed(TodoId),
    Deleted(TodoId),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added { title, .. } => write!(f, "Added \"{title}\"."),
            Self::Updated(id) => write!(f, "Updated todo {id}."),
            Self::Completed(id) => write!(f, "Marked todo {id} complete."),
            Self::Deleted(id) => write!(f, "Deleted todo {id}."),
        }
    }
}

/// Why a mutation did not happen.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Todo {0} not found.")]
    NotFound(TodoId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub async fn list<S: TodoStore + ?Sized>(store: &S) -> Result<Vec<TodoItem>, StoreError> {
    store.list_all().await
}

pub async fn add<S: TodoStore + ?Sized>(
    store: &mut S,
    title: Option<&str>,
) -> Result<Outcome, ActionError> {
    let title = parse_title(title)?;
    let id = store.insert(&title).await?;
    Ok(Outcome::Added { id, title })
}

pub async fn update<S: TodoStore + ?Sized>(
    store: &mut S,
    raw_id: Option<&str>,
    title: Option<&str>,
) -> Result<Outcome, ActionError> {
    let id = parse_todo_id(raw_id)?;
    let title = parse_title(title)?;
    require_existing(store, id).await?;
    if !store.update_title(id, &title).await? {
        return Err(ActionError::NotFound(id));
    }
    Ok(Outcome::Updated(id))
}

pub async fn complete<S: TodoStore + ?Sized>(
    store: &mut S,
    raw_id: &str,
) -> Result<Outcome, ActionError> {
    let id = parse_todo_id(Some(raw_id))?;
    require_existing(store, id).await?;
    if !store.mark_complete(id).await? {
        return Err(ActionError::NotFound(id));
    }
    Ok(Outcome::Completed(id))
}

pub async fn delete<S: TodoStore + ?Sized>(
    store: &mut S,
    raw_id: &str,
) -> Result<Outcome, ActionError> {
    let id = parse_todo_id(Some(raw_id))?;
    require_existing(store, id).await?;
    if !store.delete(id).await? {
        return Err(ActionError::NotFound(id));
    }
    Ok(Outcome::Deleted(id))
}

async fn require_existing<S: TodoStore + ?Sized>(store: &S, id: TodoId) -> Result<(), ActionError> {
    if store.exists(id).await? {
        debug!(id, "Todo found");
        Ok(())
    } else {
        warn!(id, "Todo not found");
        Err(ActionError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::JsonStore;

    async fn with_store<F, Fut>(f: F)
    where
        F: FnOnce(JsonStore) -> Fut,
        Fut: std::future::Future<Output = ()>,
    {
        let tmp = tempfile::tempdir().unwrap();
        f(JsonStore::new(tmp.path().join("db.json"))).await;
    }

    #[tokio::test]
    async fn add_trims_and_inserts() {
        with_store(|store| async move {
            let mut db = store.open().await.unwrap();
            let outcome = add(&mut db, Some("  Buy milk  ")).await.unwrap();
            assert_eq!(
                outcome,
                Outcome::Added {
                    id: 1,
                    title: "Buy milk".into()
                }
            );
            assert_eq!(outcome.to_string(), "Added \"Buy milk\".");
            assert_eq!(list(&db).await.unwrap(), vec![TodoItem::new(1, "Buy milk")]);
        })
        .await;
    }

    #[tokio::test]
    async fn add_rejects_blank_titles_without_mutation() {
        with_store(|store| async move {
            let mut db = store.open().await.unwrap();
            for title in [Some(""), Some("   "), None] {
                let err = add(&mut db, title).await.unwrap_err();
                assert!(matches!(err, ActionError::Invalid(ValidationError::EmptyTitle)));
            }
            assert!(list(&db).await.unwrap().is_empty());
            assert!(!store.path().exists());
        })
        .await;
    }

    #[tokio::test]
    async fn update_validates_id_before_title() {
        with_store(|store| async move {
            let mut db = store.open().await.unwrap();
            let err = update(&mut db, Some("abc"), Some("")).await.unwrap_err();
            assert!(matches!(
                err,
                ActionError::Invalid(ValidationError::InvalidId(ref raw)) if raw == "abc"
            ));
            assert_eq!(err.to_string(), "Invalid todo id: abc");
        })
        .await;
    }

    #[tokio::test]
    async fn update_rejects_empty_title() {
        with_store(|store| async move {
            let mut db = store.open().await.unwrap();
            add(&mut db, Some("Buy milk")).await.unwrap();

            let err = update(&mut db, Some("1"), Some(" ")).await.unwrap_err();
            assert!(matches!(err, ActionError::Invalid(ValidationError::EmptyTitle)));
            assert_eq!(list(&db).await.unwrap()[0].title, "Buy milk");
        })
        .await;
    }

    #[tokio::test]
    async fn update_missing_todo_is_not_found() {
        with_store(|store| async move {
            let mut db = store.open().await.unwrap();
            let err = update(&mut db, Some("999"), Some("x")).await.unwrap_err();
            assert!(matches!(err, ActionError::NotFound(999)));
            assert_eq!(err.to_string(), "Todo 999 not found.");
            assert!(list(&db).await.unwrap().is_empty());
        })
        .await;
    }

    #[tokio::test]
    async fn update_replaces_title() {
        with_store(|store| async move {
            let mut db = store.open().await.unwrap();
            add(&mut db, Some("Buy milk")).await.unwrap();
            let outcome = update(&mut db, Some("1"), Some(" Buy bread ")).await.unwrap();
            assert_eq!(outcome, Outcome::Updated(1));
            assert_eq!(list(&db).await.unwrap()[0].title, "Buy bread");
        })
        .await;
    }

    #[tokio::test]
    async fn complete_twice_keeps_one_completed_record() {
        with_store(|store| async move {
            let mut db = store.open().await.unwrap();
            add(&mut db, Some("Buy milk")).await.unwrap();

            assert_eq!(complete(&mut db, "1").await.unwrap(), Outcome::Completed(1));
            assert_eq!(complete(&mut db, "1").await.unwrap(), Outcome::Completed(1));

            let todos = list(&db).await.unwrap();
            assert_eq!(todos.len(), 1);
            assert!(todos[0].complete);
        })
        .await;
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        with_store(|store| async move {
            let mut db = store.open().await.unwrap();
            add(&mut db, Some("Buy milk")).await.unwrap();

            assert_eq!(delete(&mut db, "1").await.unwrap(), Outcome::Deleted(1));
            assert!(matches!(
                delete(&mut db, "1").await.unwrap_err(),
                ActionError::NotFound(1)
            ));
            assert!(list(&db).await.unwrap().is_empty());
        })
        .await;
    }

    #[tokio::test]
    async fn path_ids_are_validated() {
        with_store(|store| async move {
            let mut db = store.open().await.unwrap();
            assert!(matches!(
                complete(&mut db, "0").await.unwrap_err(),
                ActionError::Invalid(ValidationError::InvalidId(_))
            ));
            assert!(matches!(
                delete(&mut db, "x1").await.unwrap_err(),
                ActionError::Invalid(ValidationError::InvalidId(_))
            ));
        })
        .await;
    }
}
