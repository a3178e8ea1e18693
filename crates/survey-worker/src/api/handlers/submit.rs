//! Survey Submission Handler
//!
//! Always answers `200 OK`, whatever was posted. Classification and storage
//! run afterwards on the state's task tracker, so neither their outcome nor
//! their latency is visible to the client.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use crate::api::error::OK_BODY;
use crate::api::state::AppState;
use crate::core::record_submission;

/// Accept a survey submission
///
/// POST /
pub async fn submit_survey(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> &'static str {
    let received_at = Utc::now();

    match body {
        Ok(body) => {
            let task_state = Arc::clone(&state);
            state.tasks.spawn(async move {
                record_submission(
                    &body,
                    &task_state.secrets,
                    task_state.store.as_ref(),
                    received_at,
                )
                .await;
            });
        }
        Err(rejection) => {
            debug!(reason = %rejection, "Submission body could not be read");
        }
    }

    OK_BODY
}
