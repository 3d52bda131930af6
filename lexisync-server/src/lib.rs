//! HTTP API for lexisync.
//!
//! Reader clients keep their vocabulary locally and push it here; the
//! `/api/v1/sync` route reconciles the push and answers with the full set.

pub mod config;
mod error;
mod handlers;

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use lexisync_storage::Store;
use lexisync_sync::{SyncConfig, SyncEngine};

pub use config::Args;
pub use error::{ApiError, ErrorResponse};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub engine: Arc<SyncEngine>,
}

impl AppState {
    pub fn new(store: Arc<Store>, config: SyncConfig) -> Self {
        let engine = Arc::new(SyncEngine::new(Arc::clone(&store), config));
        Self { store, engine }
    }
}

/// Build the HTTP API router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/v1/vocabulary",
            get(handlers::list_vocabulary).post(handlers::create_vocabulary),
        )
        .route(
            "/api/v1/vocabulary/{id}",
            put(handlers::update_vocabulary).delete(handlers::delete_vocabulary),
        )
        .route(
            "/api/v1/progress/{book_id}",
            get(handlers::get_progress).put(handlers::put_progress),
        )
        .route("/api/v1/sync", post(handlers::sync))
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

/// Permissive CORS: any origin, method and header. Preflights end here.
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    response
}
