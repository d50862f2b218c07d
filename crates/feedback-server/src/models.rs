//! API request and response models.

use feedback_core::{Mode, Rubric, Sentiment, SentimentResult};
use serde::{Deserialize, Serialize};

/// Request body for POST /comment.
#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    /// The customer comment. A missing field reads as empty.
    #[serde(default)]
    pub comment: String,
}

/// Response body for POST /comment.
#[derive(Debug, Serialize)]
pub struct SentimentResponse {
    pub sentiment: Sentiment,
    pub rating: u8,
}

impl From<SentimentResult> for SentimentResponse {
    fn from(result: SentimentResult) -> Self {
        Self {
            sentiment: result.sentiment,
            rating: result.rating,
        }
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub mode: Mode,
    pub rubric: Rubric,
    /// Whether the remote model has a credential.
    pub remote_configured: bool,
}
