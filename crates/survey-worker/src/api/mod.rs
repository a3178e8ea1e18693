//! API module for the survey worker
//!
//! | Method | Path | Response |
//! |---|---|---|
//! | POST | `/` | always `200 OK` |
//! | POST | `/create-survey-key/{identifier}` | survey key, or `404 Not Found` |
//! | POST | anything else | `404 Not Found` |
//! | other | anything | `405 Method Not Allowed`, `Allow: POST` |

pub mod error;
pub mod handlers;
pub mod state;

use axum::{http::Method, response::Response, routing::post, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use error::{method_not_allowed, not_found};
use state::AppState;

/// Unmatched path: 404 for POST, 405 for everything else
async fn fallback(method: Method) -> Response {
    if method == Method::POST {
        not_found()
    } else {
        method_not_allowed()
    }
}

/// Matched path, wrong method
async fn wrong_method() -> Response {
    method_not_allowed()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::submit_survey).fallback(wrong_method))
        .route(
            "/create-survey-key/{*identifier}",
            post(handlers::create_survey_key).fallback(wrong_method),
        )
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
