//! Two-step comment classification.
//!
//! 1. Validate the comment (see [`crate::validate`])
//! 2. Ask the remote model for structured output
//! 3. On failure, either fall back to the keyword classifier (lenient) or
//!    report the failure (strict)

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, warn};

use super::{KeywordClassifier, ResultSource, Rubric, SentimentResult};
use crate::remote::{RemoteError, RemoteOutcome, SentimentModel, DEFAULT_INSTRUCTIONS};
use crate::validate::{validate, Mode, Validated, ValidationError};

/// Why a comment could not be classified. Only produced in strict mode.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("invalid comment: {0}")]
    Validation(#[from] ValidationError),

    #[error("sentiment analysis failed: {0}")]
    Remote(#[from] RemoteError),
}

/// Configuration for [`CommentClassifier`].
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Lenient or strict failure handling.
    pub mode: Mode,
    /// Keyword rubric used by the fallback.
    pub rubric: Rubric,
    /// System instruction sent with each remote request.
    pub instructions: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Lenient,
            rubric: Rubric::TwoTier,
            instructions: Some(DEFAULT_INSTRUCTIONS.to_string()),
        }
    }
}

impl ClassifierConfig {
    /// Strict mode with default rubric and instructions.
    pub fn strict() -> Self {
        Self {
            mode: Mode::Strict,
            ..Self::default()
        }
    }

    /// Sets the mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the fallback rubric.
    pub fn with_rubric(mut self, rubric: Rubric) -> Self {
        self.rubric = rubric;
        self
    }

    /// Sets or clears the system instruction.
    pub fn with_instructions(mut self, instructions: Option<String>) -> Self {
        self.instructions = instructions;
        self
    }
}

/// A classified comment.
#[derive(Debug, Clone)]
pub struct Classification {
    pub result: SentimentResult,
    pub source: ResultSource,
    /// Remote failure that triggered the fallback, if any.
    pub remote_error: Option<String>,
    /// Total duration in microseconds.
    pub duration_us: u64,
}

/// Remote-first comment classifier with a keyword fallback.
///
/// Holds no per-request state, so one instance is shared by all requests.
pub struct CommentClassifier {
    remote: Arc<dyn SentimentModel>,
    fallback: KeywordClassifier,
    config: ClassifierConfig,
}

impl CommentClassifier {
    /// Creates a classifier around the given remote model.
    pub fn new(remote: Arc<dyn SentimentModel>, config: ClassifierConfig) -> Self {
        Self {
            remote,
            fallback: KeywordClassifier::new(config.rubric),
            config,
        }
    }

    /// Returns the failure-handling mode.
    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Returns the fallback rubric.
    pub fn rubric(&self) -> Rubric {
        self.fallback.rubric()
    }

    /// Returns the remote model.
    pub fn remote(&self) -> &dyn SentimentModel {
        self.remote.as_ref()
    }

    /// Classifies with the keyword fallback only.
    pub fn fallback(&self, text: &str) -> SentimentResult {
        self.fallback.classify(text)
    }

    /// Asks the remote model only.
    pub async fn classify_remote(&self, text: &str) -> RemoteOutcome {
        self.remote
            .classify(text, self.config.instructions.as_deref())
            .await
    }

    /// Validates and classifies a raw comment.
    ///
    /// In lenient mode this never returns an error.
    pub async fn classify(&self, comment: &str) -> Result<Classification, ClassifyError> {
        let start = Instant::now();

        let text = match validate(comment, self.config.mode)? {
            Validated::Empty => {
                debug!("Empty comment, returning neutral");
                return Ok(Classification {
                    result: SentimentResult::neutral(),
                    source: ResultSource::EmptyInput,
                    remote_error: None,
                    duration_us: start.elapsed().as_micros() as u64,
                });
            }
            Validated::Text(text) => text,
        };

        let (result, source, remote_error) = match self.classify_remote(text).await {
            RemoteOutcome::Success(result) => {
                if !result.is_consistent() {
                    warn!(
                        sentiment = %result.sentiment,
                        rating = result.rating,
                        "Remote model returned inconsistent sentiment/rating pair"
                    );
                }
                (result, ResultSource::Remote, None)
            }
            RemoteOutcome::Failure(err) => match self.config.mode {
                Mode::Strict => return Err(ClassifyError::Remote(err)),
                Mode::Lenient => {
                    let m = self.fallback.classify_detailed(text);
                    debug!(
                        error = %err,
                        keyword = ?m.keyword,
                        rubric = %self.fallback.rubric(),
                        "Using keyword fallback"
                    );
                    (m.result, ResultSource::Fallback, Some(err.to_string()))
                }
            },
        };

        Ok(Classification {
            result,
            source,
            remote_error,
            duration_us: start.elapsed().as_micros() as u64,
        })
    }
}
