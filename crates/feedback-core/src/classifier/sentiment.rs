//! Sentiment labels and the result returned for every comment.

use serde::{Deserialize, Serialize};

/// Lowest rating a result may carry.
pub const MIN_RATING: u8 = 1;

/// Highest rating a result may carry.
pub const MAX_RATING: u8 = 5;

/// Rating used for neutral results.
pub const NEUTRAL_RATING: u8 = 3;

/// Overall sentiment of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Returns all sentiment labels.
    pub fn all() -> &'static [Sentiment] {
        &[Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral]
    }

    /// Returns the wire name of this label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Returns true if `rating` falls on the expected side of the scale.
    ///
    /// Positive expects 4-5, negative 1-2, neutral exactly 3.
    pub fn agrees_with(&self, rating: u8) -> bool {
        match self {
            Sentiment::Positive => rating > NEUTRAL_RATING,
            Sentiment::Negative => rating < NEUTRAL_RATING,
            Sentiment::Neutral => rating == NEUTRAL_RATING,
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment label plus a 1-5 rating.
///
/// The pair is not required to be consistent: a remote model may legally
/// return `positive` with rating 1. Use [`SentimentResult::is_consistent`]
/// to detect that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    pub rating: u8,
}

impl SentimentResult {
    /// Creates a result. Returns `None` if `rating` is outside 1-5.
    pub fn new(sentiment: Sentiment, rating: u8) -> Option<Self> {
        (MIN_RATING..=MAX_RATING)
            .contains(&rating)
            .then_some(Self { sentiment, rating })
    }

    /// The `{neutral, 3}` result.
    pub fn neutral() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            rating: NEUTRAL_RATING,
        }
    }

    pub(crate) const fn fixed(sentiment: Sentiment, rating: u8) -> Self {
        Self { sentiment, rating }
    }

    /// Returns true if the rating is within 1-5.
    pub fn rating_in_range(&self) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&self.rating)
    }

    /// Returns true if the rating agrees with the sentiment label.
    pub fn is_consistent(&self) -> bool {
        self.sentiment.agrees_with(self.rating)
    }
}

impl Default for SentimentResult {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Comment was empty after trimming; nothing was classified.
    EmptyInput,
    /// Structured output from the remote model.
    Remote,
    /// Local keyword classifier.
    Fallback,
}

impl ResultSource {
    /// Returns a short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ResultSource::EmptyInput => "empty_input",
            ResultSource::Remote => "remote",
            ResultSource::Fallback => "fallback",
        }
    }
}
