//! HTTP surface.
//!
//! Records live under `/records`, identity pass-through operations under `/identity`.
//! Every error body is a JSON object of the form `{"error": "..."}`.

/// Identity pass-through handlers.
pub mod identity;

/// Record handlers.
pub mod records;

use crate::{
    Error,
    config::Config,
    identity::IdentityProvider,
    store::{self, RecordStore},
};

use axum::{
    Json, Router,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared, immutable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Where records are kept.
    pub store: Arc<dyn RecordStore>,
    /// Where identity operations are forwarded.
    pub identity: Arc<dyn IdentityProvider>,
    /// Process configuration.
    pub config: Arc<Config>,
}

impl AppState {
    /// Bundle the collaborators.
    pub fn new(
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityProvider>,
        config: Config,
    ) -> Self {
        Self {
            store,
            identity,
            config: Arc::new(config),
        }
    }
}

/// The complete application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/records", get(records::scan).post(records::create))
        .route(
            "/records/:key",
            get(records::get)
                .put(records::update)
                .delete(records::delete),
        )
        .nest("/identity", identity::router())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Not Found"})))
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Error::AliasCollision { .. }
            | Error::EmptyUpdate { .. }
            | Error::InvalidAttributeName(_)
            | Error::ReadOnlyAttribute(_)
            | Error::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::Store(store::Error::NotFound(_)) => (StatusCode::NOT_FOUND, self.to_string()),
            Error::Store(err) => {
                tracing::error!(error = %err, "store request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "the record store request failed".to_string(),
                )
            }
            Error::Identity(err) => {
                tracing::error!(error = %err, "identity provider request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "the identity provider could not be reached".to_string(),
                )
            }
        };
        (status, Json(json!({"error": message}))).into_response()
    }
}
