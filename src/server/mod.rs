//! HTTP API
//!
//! # Routes
//!
//! - `GET /` - landing page with a form for pasting code
//! - `POST /api/predict` - `{"code": "..."}` in,
//!   `{"needs_refactor": 0|1, "confidence": "NN.NN"}` out
//!
//! Failures answer `{"error": "..."}` with 400 when the code cannot be
//! analyzed and 500 for anything else.

mod error;
mod handlers;
mod state;
mod transport;

pub use error::{ApiError, ANALYSIS_FAILED};
pub use handlers::BODY_NOT_OBJECT;
pub use state::AppState;
pub use transport::{serve_http, serve_on};

use axum::routing::{get, post};
use axum::Router;

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/predict", post(handlers::predict))
        .with_state(state)
}
