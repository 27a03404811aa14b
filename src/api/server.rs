//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::handlers::{self, RefetchError};
use super::models::{ErrorResponse, RefetchRequest};
use crate::config::Config;
use crate::fetch::MetadataFetcher;
use crate::state::ResultsStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: ResultsStore,
    pub config: Arc<Config>,
    pub fetcher: Arc<dyn MetadataFetcher>,
}

/// Build the router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/eps", get(list_episodes_handler))
        .route("/eps/re-fetch", post(refetch_handler))
        .route("/status", get(status_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Configure and start the HTTP server
pub async fn start_http_server(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 API server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    match handlers::health_check().await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(e))).into_response(),
    }
}

/// List episodes handler
async fn list_episodes_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(handlers::list_episodes(&state).await)
}

/// Service status handler
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(handlers::service_status(&state).await)
}

/// Re-fetch handler
async fn refetch_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RefetchRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(rejection.body_text()))).into_response();
        }
    };

    match handlers::refetch(&state, &request).await {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => {
            warn!("Re-fetch rejected: {}", e);
            let status = match e {
                RefetchError::Busy => StatusCode::CONFLICT,
                RefetchError::InvalidKey | RefetchError::Failed(_) => StatusCode::BAD_REQUEST,
            };
            (status, Json(ErrorResponse::new(e))).into_response()
        }
    }
}
