//! Application state for the API server.

use std::sync::Arc;

use feedback_core::{ClassifierConfig, CommentClassifier, SentimentModel};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Comment classifier (remote model plus keyword fallback).
    pub classifier: Arc<CommentClassifier>,
}

impl AppState {
    /// Creates state around an existing classifier.
    pub fn new(classifier: CommentClassifier) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }

    /// Creates state for the given remote model and classifier settings.
    pub fn with_model(remote: Arc<dyn SentimentModel>, config: ClassifierConfig) -> Self {
        Self::new(CommentClassifier::new(remote, config))
    }
}
