use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Headline shown to users for every failed NeoWs sync.
pub const SYNC_FAILED: &str = "Planetary Intelligence Sync Failed";

/// Failures while fetching or decoding NeoWs data.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration Error: NASA API Key is missing")]
    MissingApiKey,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Invalid data structure received from NASA")]
    MalformedPayload,

    #[error("Request to NASA failed: {0}")]
    Transport(reqwest::Error),
}

// Request URLs carry the api_key query parameter, so they never reach the message.
impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::Transport(e.without_url())
    }
}

impl From<JsonRejection> for SyncError {
    fn from(rejection: JsonRejection) -> Self {
        SyncError::InvalidRequest(rejection.body_text())
    }
}

impl SyncError {
    /// Builds an upstream error from a non-2xx response body.
    ///
    /// NeoWs reports failures as `{"error_message": ...}` on the feed and as
    /// `{"error": {"message": ...}}` on the API gateway.
    pub fn upstream(status: u16, body: &[u8]) -> Self {
        let parsed: Option<Value> = serde_json::from_slice(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|v| {
                v.get("error_message")
                    .or_else(|| v.pointer("/error/message"))
                    .and_then(Value::as_str)
            })
            .map(str::to_string)
            .unwrap_or_else(|| {
                StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Internal Server Error")
                    .to_string()
            });

        SyncError::Upstream { status, message }
    }

    /// HTTP-style status to report for this failure.
    pub fn status(&self) -> u16 {
        match self {
            SyncError::InvalidRequest(_) => 400,
            SyncError::Upstream { status, .. } => *status,
            SyncError::MissingApiKey | SyncError::MalformedPayload | SyncError::Transport(_) => 500,
        }
    }

    pub fn to_failure(&self) -> SyncFailure {
        SyncFailure {
            error: SYNC_FAILED,
            details: self.to_string(),
        }
    }
}

/// Body returned to clients when a sync fails.
#[derive(Debug, Serialize)]
pub struct SyncFailure {
    pub error: &'static str,
    pub details: String,
}

impl IntoResponse for SyncError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(self.to_failure())).into_response()
    }
}
