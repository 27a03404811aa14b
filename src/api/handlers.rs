//! API request handlers

use anyhow::Result;
use serde_json::Value;

use super::models::{RefetchRequest, RefetchResponse, ServiceStatus};
use super::server::AppState;
use crate::episodes::Episode;
use crate::processing;

/// Reasons a re-fetch request is turned down
#[derive(Debug, thiserror::Error)]
pub enum RefetchError {
    #[error("Invalid key")]
    InvalidKey,

    #[error("A fetch is already in progress")]
    Busy,

    #[error("{0}")]
    Failed(String),
}

/// Handle health check requests
pub async fn health_check() -> Result<Value> {
    Ok(serde_json::json!({
        "status": "healthy",
        "service": "aka-timestamps",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Handle episode listing requests
pub async fn list_episodes(state: &AppState) -> Vec<Episode> {
    state.store.get().await
}

/// Handle service status requests
pub async fn service_status(state: &AppState) -> ServiceStatus {
    let episodes = state.store.get().await;
    ServiceStatus {
        downloading: state.store.is_downloading(),
        episodes: episodes.len(),
        analyzed: episodes.iter().filter(|ep| ep.found_results.is_some()).count(),
    }
}

/// Fetch new episode metadata and analyze it, if the key is allowed
pub async fn refetch(state: &AppState, request: &RefetchRequest) -> std::result::Result<RefetchResponse, RefetchError> {
    if !state.config.access.is_allowed(&request.key) {
        return Err(RefetchError::InvalidKey);
    }

    let _guard = state.store.try_begin_fetch().ok_or(RefetchError::Busy)?;

    processing::refresh(
        state.fetcher.as_ref(),
        false,
        &state.config.fetch.meta_dir,
        &state.config.episodes,
        &state.store,
    )
    .await
    .map_err(|e| RefetchError::Failed(e.to_string()))?;

    Ok(RefetchResponse { ok: true })
}
