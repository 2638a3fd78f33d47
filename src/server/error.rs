//! HTTP error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Message returned for every analysis failure, whatever its cause
pub const ANALYSIS_FAILED: &str = "Could not analyze code.";

/// Errors surfaced by the HTTP API
#[derive(Error, Debug)]
pub enum ApiError {
    /// The code could not be turned into features (400)
    #[error("{}", ANALYSIS_FAILED)]
    Analysis,

    /// Anything else that went wrong while serving the request (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Analysis => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
