//! HTTP handlers for the todo list.
//!
//! Every handler that touches the store holds one [`StoreHandle`], so the
//! store is opened once per request and closed when the handler returns,
//! whichever path it returns on. Handlers with a form body open the store
//! only after the body has been read.

use axum::extract::rejection::FormRejection;
use axum::extract::{FromRef, FromRequestParts, Path, State};
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::actions::{self, ActionError, Outcome};
use super::model::TodoItem;
use super::view;
use crate::AppState;
use crate::error::{StoreError, ValidationError};
use crate::flash::{CLEAR_COOKIE, Flash, FlashKey, IncomingFlash};
use crate::store::{JsonStore, StoreHandle};

/// Build the Axum router for the todo pages.
pub fn todo_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/add", post(add))
        .route("/update", post(update))
        .route("/complete/{id}", get(complete).post(complete))
        .route("/delete/{id}", get(delete).post(delete))
        .route("/api/todos", get(list_todos))
        .route("/health", get(health))
        .with_state(state)
}

/// Store failure surfaced as a 500.
#[derive(Debug)]
pub struct AppError(StoreError);

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Todo store failure");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "The todo store is unavailable.",
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for StoreHandle
where
    JsonStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = JsonStore::from_ref(state);
        Ok(store.open().await?)
    }
}

#[derive(Debug, Deserialize)]
struct AddForm {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateForm {
    #[serde(alias = "hiddenField")]
    todo_id: Option<String>,
    #[serde(alias = "inputField")]
    title: Option<String>,
}

// ── Pages ───────────────────────────────────────────────────────────────

async fn index(flash: IncomingFlash, db: StoreHandle) -> Result<Response, AppError> {
    let todos = actions::list(&db).await?;
    let page = Html(view::render_index(&todos, flash.flash.as_ref()));
    if flash.present {
        Ok(([(SET_COOKIE, CLEAR_COOKIE)], page).into_response())
    } else {
        Ok(page.into_response())
    }
}

async fn add(
    State(key): State<FlashKey>,
    State(store): State<JsonStore>,
    form: Result<Form<AddForm>, FormRejection>,
) -> Result<Response, AppError> {
    let result = match form {
        Ok(Form(form)) => {
            let mut db = store.open().await?;
            actions::add(&mut db, form.title.as_deref()).await
        }
        Err(rejection) => Err(unreadable_form(rejection)),
    };
    redirect_with(&key, result)
}

async fn update(
    State(key): State<FlashKey>,
    State(store): State<JsonStore>,
    form: Result<Form<UpdateForm>, FormRejection>,
) -> Result<Response, AppError> {
    let result = match form {
        Ok(Form(form)) => {
            let mut db = store.open().await?;
            actions::update(&mut db, form.todo_id.as_deref(), form.title.as_deref()).await
        }
        Err(rejection) => Err(unreadable_form(rejection)),
    };
    redirect_with(&key, result)
}

async fn complete(
    State(key): State<FlashKey>,
    Path(id): Path<String>,
    mut db: StoreHandle,
) -> Result<Response, AppError> {
    let result = actions::complete(&mut db, &id).await;
    redirect_with(&key, result)
}

async fn delete(
    State(key): State<FlashKey>,
    Path(id): Path<String>,
    mut db: StoreHandle,
) -> Result<Response, AppError> {
    let result = actions::delete(&mut db, &id).await;
    redirect_with(&key, result)
}

/// Redirect to the list page, carrying the outcome as a flash.
fn redirect_with(key: &FlashKey, result: Result<Outcome, ActionError>) -> Result<Response, AppError> {
    let flash = match result {
        Ok(outcome) => {
            info!(outcome = %outcome, "Todo action applied");
            Flash::success(outcome.to_string())
        }
        Err(ActionError::Store(e)) => return Err(e.into()),
        Err(e) => {
            warn!(error = %e, "Todo action rejected");
            Flash::error(e.to_string())
        }
    };
    let redirect = Redirect::to("/");
    match key.set_cookie(&flash) {
        Ok(cookie) => Ok(([(SET_COOKIE, cookie)], redirect).into_response()),
        Err(e) => {
            error!(error = %e, "Failed to sign flash cookie");
            Ok(redirect.into_response())
        }
    }
}

fn unreadable_form(rejection: FormRejection) -> ActionError {
    debug!(status = %rejection.status(), error = %rejection.body_text(), "Form body rejected");
    ValidationError::MalformedForm.into()
}

// ── JSON ────────────────────────────────────────────────────────────────

async fn list_todos(db: StoreHandle) -> Result<Json<Vec<TodoItem>>, AppError> {
    Ok(Json(actions::list(&db).await?))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "todo-list"
    }))
}
