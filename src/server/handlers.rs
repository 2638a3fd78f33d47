//! Route handlers

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::error::ApiError;
use super::state::AppState;
use crate::prediction::{PredictError, PredictionResponse};

const INDEX_HTML: &str = include_str!("../../templates/index.html");

/// Message for request bodies that are valid JSON but not an object
pub const BODY_NOT_OBJECT: &str = "request body must be a JSON object";

/// `GET /`
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `POST /api/predict`
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!(status = %rejection.status(), "rejected request body: {}", rejection.body_text());
        ApiError::Internal(rejection.body_text())
    })?;

    let Value::Object(fields) = body else {
        warn!("rejected request body: {}", BODY_NOT_OBJECT);
        return Err(ApiError::Internal(BODY_NOT_OBJECT.to_string()));
    };

    // Anything other than a string is treated as unanalyzable
    let Some(code) = fields.get("code").and_then(Value::as_str).map(str::to_owned) else {
        debug!("request has no string 'code' field");
        return Err(ApiError::Analysis);
    };

    // Parsing and inference are CPU-bound; a panic here becomes a JoinError.
    let service = Arc::clone(&state.service);
    let outcome = tokio::task::spawn_blocking(move || service.predict(&code))
        .await
        .map_err(|e| {
            error!("prediction task failed: {}", e);
            ApiError::Internal(e.to_string())
        })?;

    match outcome {
        Ok(prediction) => Ok(Json(PredictionResponse::from(&prediction))),
        Err(PredictError::Analysis(cause)) => {
            debug!("could not analyze code: {}", cause);
            Err(ApiError::Analysis)
        }
        Err(e @ PredictError::Classifier(_)) => {
            error!("classification failed: {}", e);
            Err(ApiError::Internal(e.to_string()))
        }
    }
}
