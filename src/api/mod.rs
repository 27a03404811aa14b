//! API module for the question timestamp service
//!
//! Exposes the cached episode results and a keyed endpoint that triggers a new
//! fetch-and-analyze cycle.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::fetch::MetadataFetcher;
use crate::state::ResultsStore;

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{router, AppState};

/// API Server for handling REST requests
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(store: ResultsStore, config: Arc<Config>, fetcher: Arc<dyn MetadataFetcher>) -> Self {
        Self {
            state: AppState {
                store,
                config,
                fetcher,
            },
        }
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        info!("🚀 Starting API server on port {}", self.state.config.server.port);
        server::start_http_server(self.state).await
    }
}
