//! API route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::{debug, info, warn};

use crate::error::{ApiError, Result};
use crate::models::{CommentRequest, HealthResponse, SentimentResponse};
use crate::state::AppState;

/// POST /comment - Classify the sentiment of a customer comment.
pub async fn analyze_comment(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CommentRequest>, JsonRejection>,
) -> Result<Json<SentimentResponse>> {
    let Json(req) = payload.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "Rejected comment body");
        ApiError::from(rejection)
    })?;

    debug!(comment_len = req.comment.len(), "Analyzing comment");

    let classification = match state.classifier.classify(&req.comment).await {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Comment analysis failed");
            return Err(e.into());
        }
    };

    info!(
        sentiment = %classification.result.sentiment,
        rating = classification.result.rating,
        source = classification.source.name(),
        remote_error = ?classification.remote_error,
        latency_ms = classification.duration_us / 1000,
        "Comment analyzed"
    );

    Ok(Json(classification.result.into()))
}

/// GET /health - Report service status.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let classifier = &state.classifier;

    Json(HealthResponse {
        status: "ok",
        mode: classifier.mode(),
        rubric: classifier.rubric(),
        remote_configured: classifier.remote().is_configured(),
    })
}
