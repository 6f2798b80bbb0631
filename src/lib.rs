//! Todo List: a small web to-do manager over a JSON document store.

pub mod config;
pub mod error;
pub mod flash;
pub mod store;
pub mod todos;

use axum::Router;
use axum::extract::FromRef;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::error::Result;
use crate::flash::FlashKey;
use crate::store::JsonStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: JsonStore,
    pub flash_key: FlashKey,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: JsonStore::new(config.db_path.clone()),
            flash_key: FlashKey::new(&config.secret_key),
        }
    }
}

impl FromRef<AppState> for JsonStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for FlashKey {
    fn from_ref(state: &AppState) -> Self {
        state.flash_key.clone()
    }
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    todos::todo_routes(state).layer(TraceLayer::new_for_http())
}

/// Bind to the configured address and serve until Ctrl-C.
pub async fn serve(config: AppConfig) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, db = %config.db_path.display(), "Todo server started");

    axum::serve(listener, app(AppState::new(&config)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Todo server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
