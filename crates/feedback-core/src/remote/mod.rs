//! Remote sentiment model contract.
//!
//! A remote model receives the comment (plus an optional system
//! instruction) together with a strict output schema, and answers with
//! either a schema-conformant [`SentimentResult`] or a failure. Failures are
//! values, not panics: callers pick between the success and fallback paths
//! by matching on [`RemoteOutcome`].

mod openai;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::classifier::{Sentiment, SentimentResult, MAX_RATING, MIN_RATING};

pub use openai::{
    OpenAiConfig, OpenAiModel, API_KEY_ENV, DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};

/// Name of the output schema sent to the remote model.
pub const SCHEMA_NAME: &str = "sentiment_result";

/// Default system instruction describing the rating rubric.
pub const DEFAULT_INSTRUCTIONS: &str = "You classify customer feedback. \
Return the overall sentiment (positive, negative or neutral) and a rating \
from 1 to 5: 5 = very positive, 4 = positive, 3 = neutral or mixed, \
2 = negative, 1 = very negative.";

/// Why a remote call produced no usable result.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// No credential was configured, so no call was made.
    #[error("no API key configured")]
    MissingCredential,

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// Connection or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The model declined to answer.
    #[error("model refused: {0}")]
    Refusal(String),

    /// The response contained no structured output.
    #[error("no structured output in response")]
    EmptyOutput,

    /// The structured output did not match the schema.
    #[error("malformed structured output: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout
        } else if err.is_decode() {
            RemoteError::Malformed(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

/// Tagged result of a remote classification attempt.
#[derive(Debug)]
pub enum RemoteOutcome {
    Success(SentimentResult),
    Failure(RemoteError),
}

impl From<Result<SentimentResult, RemoteError>> for RemoteOutcome {
    fn from(result: Result<SentimentResult, RemoteError>) -> Self {
        match result {
            Ok(result) => RemoteOutcome::Success(result),
            Err(err) => RemoteOutcome::Failure(err),
        }
    }
}

/// A remote service that classifies comment sentiment.
///
/// Implementations must not panic on service errors; every problem is
/// reported as [`RemoteOutcome::Failure`].
#[async_trait]
pub trait SentimentModel: Send + Sync {
    /// Classifies `text`, optionally guided by a system instruction.
    async fn classify(&self, text: &str, instructions: Option<&str>) -> RemoteOutcome;

    /// Returns the name of this model for logging.
    fn name(&self) -> &str;

    /// Returns false if the model cannot possibly succeed (e.g. no credential).
    fn is_configured(&self) -> bool {
        true
    }
}

/// JSON schema constraining the remote output to exactly `sentiment` and
/// `rating`.
pub fn output_schema() -> Value {
    let labels: Vec<&str> = Sentiment::all().iter().map(|s| s.as_str()).collect();

    json!({
        "type": "object",
        "properties": {
            "sentiment": {
                "type": "string",
                "enum": labels
            },
            "rating": {
                "type": "integer",
                "minimum": MIN_RATING,
                "maximum": MAX_RATING
            }
        },
        "required": ["sentiment", "rating"],
        "additionalProperties": false
    })
}

/// Parses structured output text into a result, enforcing the schema.
pub fn parse_structured_output(text: &str) -> Result<SentimentResult, RemoteError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RemoteError::EmptyOutput);
    }

    let result: SentimentResult =
        serde_json::from_str(text).map_err(|e| RemoteError::Malformed(e.to_string()))?;

    if !result.rating_in_range() {
        return Err(RemoteError::Malformed(format!(
            "rating {} outside {}-{}",
            result.rating, MIN_RATING, MAX_RATING
        )));
    }

    Ok(result)
}
