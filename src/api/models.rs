//! API data models

use serde::{Deserialize, Serialize};

/// Body of `POST /eps/re-fetch`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefetchRequest {
    pub key: String,
}

/// Success body of `POST /eps/re-fetch`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefetchResponse {
    pub ok: bool,
}

/// Error body shared by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl ToString) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

/// Body of `GET /status`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub downloading: bool,
    pub episodes: usize,
    pub analyzed: usize,
}
