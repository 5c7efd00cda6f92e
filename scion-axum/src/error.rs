//! Error types for the bridge crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use scion_core::EngineError;

/// Errors that can occur while attaching the bridge or delegating a request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BridgeError {
    /// No bootstrapper was registered in the host scope and none was
    /// supplied through the options callback.
    #[error("no engine bootstrapper registered in the host scope")]
    BootstrapperMissing,

    /// An error propagated from the engine, unmodified.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The request body could not be read from the host stream.
    #[error("failed to read request body: {0}")]
    BodyRead(String),
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = match &self {
            BridgeError::BootstrapperMissing | BridgeError::Engine(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            BridgeError::BodyRead(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}
