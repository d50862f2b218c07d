//! Feedback Core - sentiment classification for customer comments.
//!
//! This crate provides comment validation, the remote structured-output
//! model client, and the deterministic keyword fallback used by the
//! feedback API server.

pub mod classifier;
pub mod remote;
pub mod validate;

pub use classifier::{
    Classification, ClassifierConfig, ClassifyError, CommentClassifier, KeywordClassifier,
    ResultSource, Rubric, Sentiment, SentimentResult,
};
pub use remote::{OpenAiConfig, OpenAiModel, RemoteError, RemoteOutcome, SentimentModel};
pub use validate::{Mode, ValidationError};
