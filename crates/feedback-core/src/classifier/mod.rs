//! Comment sentiment classification.
//!
//! Remote structured-output classification with a deterministic keyword
//! fallback.

mod keyword;
mod sentiment;
mod tiered;

pub use keyword::{KeywordClassifier, KeywordMatch, Rubric};
pub use sentiment::{
    ResultSource, Sentiment, SentimentResult, MAX_RATING, MIN_RATING, NEUTRAL_RATING,
};
pub use tiered::{Classification, ClassifierConfig, ClassifyError, CommentClassifier};
