//! Comment validation.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// How failures are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Empty comments become `{neutral, 3}`, remote failures use the
    /// keyword fallback. Every request gets a result.
    #[default]
    Lenient,
    /// Empty comments are rejected and remote failures are reported to the
    /// caller without a fallback.
    Strict,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Lenient => "lenient",
            Mode::Strict => "strict",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(Mode::Lenient),
            "strict" => Ok(Mode::Strict),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

/// Validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("comment must not be empty")]
    EmptyComment,
}

/// A comment that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validated<'a> {
    /// Nothing to classify; the answer is `{neutral, 3}`.
    Empty,
    /// Text to hand to the classifier.
    Text(&'a str),
}

/// Validates a raw comment.
///
/// Lenient mode trims first and maps blank input to [`Validated::Empty`].
/// Strict mode checks the raw length before any trimming and forwards the
/// text untouched.
pub fn validate(comment: &str, mode: Mode) -> Result<Validated<'_>, ValidationError> {
    match mode {
        Mode::Lenient => {
            let trimmed = comment.trim();
            if trimmed.is_empty() {
                Ok(Validated::Empty)
            } else {
                Ok(Validated::Text(trimmed))
            }
        }
        Mode::Strict => {
            if comment.is_empty() {
                Err(ValidationError::EmptyComment)
            } else {
                Ok(Validated::Text(comment))
            }
        }
    }
}
