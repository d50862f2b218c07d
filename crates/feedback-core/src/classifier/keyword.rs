//! Deterministic keyword fallback classifier.
//!
//! Used whenever the remote model is unavailable or returns nothing usable.
//! Matching is case-insensitive substring matching on the lower-cased
//! comment, so "awesomeness" matches "awesome". Tiers are checked in a fixed
//! order and the first tier with any hit decides the result.

use regex::RegexSet;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{Sentiment, SentimentResult};

const POSITIVE: &[&str] = &["good", "great", "excellent", "amazing", "love", "awesome"];
const NEGATIVE: &[&str] = &["bad", "worst", "terrible", "hate", "poor", "awful"];

const STRONG_POSITIVE: &[&str] = &[
    "phenomenal",
    "amazing",
    "excellent",
    "outstanding",
    "fantastic",
    "love",
    "awesome",
    "perfect",
];
const MILD_POSITIVE: &[&str] = &[
    "good",
    "great",
    "happy",
    "nice",
    "pleased",
    "satisfied",
    "helpful",
];
const STRONG_NEGATIVE: &[&str] = &[
    "horrible",
    "terrible",
    "worst",
    "awful",
    "hate",
    "disgusting",
    "unacceptable",
];
const MILD_NEGATIVE: &[&str] = &[
    "bad",
    "poor",
    "delay",
    "slow",
    "disappointed",
    "problem",
    "issue",
];

/// Which keyword rubric the fallback uses.
///
/// The two rubrics give different ratings for the same text, so exactly one
/// is active per classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rubric {
    /// positive -> 5, negative -> 1, otherwise neutral 3.
    #[default]
    TwoTier,
    /// strong-positive 5, mild-positive 4, strong-negative 1, mild-negative 2.
    FourTier,
}

impl Rubric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rubric::TwoTier => "two-tier",
            Rubric::FourTier => "four-tier",
        }
    }
}

impl std::fmt::Display for Rubric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rubric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "two-tier" | "two_tier" | "2" => Ok(Rubric::TwoTier),
            "four-tier" | "four_tier" | "4" => Ok(Rubric::FourTier),
            other => Err(format!("unknown rubric: {}", other)),
        }
    }
}

/// Keywords for one tier and the result they map to.
struct KeywordTier {
    result: SentimentResult,
    keywords: &'static [&'static str],
    /// One literal pattern per keyword, in keyword order.
    set: RegexSet,
}

impl KeywordTier {
    fn new(sentiment: Sentiment, rating: u8, keywords: &'static [&'static str]) -> Self {
        let patterns = keywords.iter().map(|k| regex::escape(k));
        let set = RegexSet::new(patterns).expect("Invalid keyword patterns");

        Self {
            result: SentimentResult::fixed(sentiment, rating),
            keywords,
            set,
        }
    }

    /// Returns the first keyword (in list order) found in `text`.
    fn first_hit(&self, text: &str) -> Option<&'static str> {
        self.set
            .matches(text)
            .iter()
            .next()
            .map(|idx| self.keywords[idx])
    }
}

/// Outcome of a fallback classification with the keyword that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    pub result: SentimentResult,
    /// `None` when no tier matched and the result is neutral.
    pub keyword: Option<&'static str>,
}

/// Keyword-substring sentiment classifier.
///
/// Pure and deterministic: the same text always yields the same result.
pub struct KeywordClassifier {
    rubric: Rubric,
    tiers: Vec<KeywordTier>,
}

impl KeywordClassifier {
    /// Creates a classifier for the given rubric.
    pub fn new(rubric: Rubric) -> Self {
        let tiers = match rubric {
            Rubric::TwoTier => vec![
                KeywordTier::new(Sentiment::Positive, 5, POSITIVE),
                KeywordTier::new(Sentiment::Negative, 1, NEGATIVE),
            ],
            Rubric::FourTier => vec![
                KeywordTier::new(Sentiment::Positive, 5, STRONG_POSITIVE),
                KeywordTier::new(Sentiment::Positive, 4, MILD_POSITIVE),
                KeywordTier::new(Sentiment::Negative, 1, STRONG_NEGATIVE),
                KeywordTier::new(Sentiment::Negative, 2, MILD_NEGATIVE),
            ],
        };

        Self { rubric, tiers }
    }

    /// Returns the active rubric.
    pub fn rubric(&self) -> Rubric {
        self.rubric
    }

    /// Classifies `text`.
    pub fn classify(&self, text: &str) -> SentimentResult {
        self.classify_detailed(text).result
    }

    /// Classifies `text` and reports which keyword decided the result.
    pub fn classify_detailed(&self, text: &str) -> KeywordMatch {
        let text_lower = text.to_lowercase();

        for tier in &self.tiers {
            if let Some(keyword) = tier.first_hit(&text_lower) {
                return KeywordMatch {
                    result: tier.result,
                    keyword: Some(keyword),
                };
            }
        }

        KeywordMatch {
            result: SentimentResult::neutral(),
            keyword: None,
        }
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(Rubric::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tier() -> KeywordClassifier {
        KeywordClassifier::new(Rubric::TwoTier)
    }

    fn four_tier() -> KeywordClassifier {
        KeywordClassifier::new(Rubric::FourTier)
    }

    fn result(sentiment: Sentiment, rating: u8) -> SentimentResult {
        SentimentResult::new(sentiment, rating).unwrap()
    }

    // === Two-tier ===

    #[test]
    fn two_tier_positive() {
        assert_eq!(
            two_tier().classify("This is an amazing product"),
            result(Sentiment::Positive, 5)
        );
    }

    #[test]
    fn two_tier_negative() {
        assert_eq!(
            two_tier().classify("Worst experience ever"),
            result(Sentiment::Negative, 1)
        );
    }

    #[test]
    fn two_tier_neutral() {
        assert_eq!(two_tier().classify("It was okay"), SentimentResult::neutral());
    }

    #[test]
    fn two_tier_positive_wins_mixed() {
        let m = two_tier().classify_detailed("Great food but terrible service");
        assert_eq!(m.result, result(Sentiment::Positive, 5));
        assert_eq!(m.keyword, Some("great"));
    }

    // === Four-tier ===

    #[test]
    fn four_tier_strong_positive() {
        assert_eq!(
            four_tier().classify("Phenomenal service"),
            result(Sentiment::Positive, 5)
        );
    }

    #[test]
    fn four_tier_mild_positive() {
        assert_eq!(
            four_tier().classify("Good job, pretty happy"),
            result(Sentiment::Positive, 4)
        );
    }

    #[test]
    fn four_tier_mild_negative() {
        assert_eq!(
            four_tier().classify("There was a long delay"),
            result(Sentiment::Negative, 2)
        );
    }

    #[test]
    fn four_tier_strong_negative() {
        assert_eq!(
            four_tier().classify("Absolutely horrible"),
            result(Sentiment::Negative, 1)
        );
    }

    #[test]
    fn four_tier_neutral() {
        assert_eq!(four_tier().classify("It was okay"), SentimentResult::neutral());
    }

    #[test]
    fn four_tier_mild_positive_beats_strong_negative() {
        let m = four_tier().classify_detailed("Nice staff, horrible parking");
        assert_eq!(m.result, result(Sentiment::Positive, 4));
        assert_eq!(m.keyword, Some("nice"));
    }

    #[test]
    fn four_tier_strong_negative_beats_mild_negative() {
        assert_eq!(
            four_tier().classify("Slow and disgusting"),
            result(Sentiment::Negative, 1)
        );
    }

    // === Matching semantics ===

    #[test]
    fn case_insensitive() {
        assert_eq!(
            two_tier().classify("AMAZING"),
            result(Sentiment::Positive, 5)
        );
        assert_eq!(
            four_tier().classify("ABSOLUTELY HORRIBLE"),
            result(Sentiment::Negative, 1)
        );
    }

    #[test]
    fn substring_matches_inside_words() {
        let m = two_tier().classify_detailed("The awesomeness is real");
        assert_eq!(m.result, result(Sentiment::Positive, 5));
        assert_eq!(m.keyword, Some("awesome"));

        // "badge" contains "bad"
        assert_eq!(
            two_tier().classify("I got a badge"),
            result(Sentiment::Negative, 1)
        );
    }

    #[test]
    fn no_keyword_reported_for_neutral() {
        let m = two_tier().classify_detailed("Delivered on Tuesday");
        assert_eq!(m.result, SentimentResult::neutral());
        assert!(m.keyword.is_none());
    }

    #[test]
    fn deterministic() {
        for classifier in [two_tier(), four_tier()] {
            let text = "Good product, slow shipping";
            assert_eq!(classifier.classify(text), classifier.classify(text));
        }
    }

    #[test]
    fn results_always_in_range() {
        let texts = [
            "",
            "love it",
            "hate it",
            "meh",
            "a long delay",
            "pretty nice",
            "😀 emoji only",
        ];
        for classifier in [two_tier(), four_tier()] {
            for text in texts {
                assert!(classifier.classify(text).rating_in_range());
            }
        }
    }

    #[test]
    fn rubric_parsing() {
        assert_eq!("two-tier".parse::<Rubric>().unwrap(), Rubric::TwoTier);
        assert_eq!("FOUR_TIER".parse::<Rubric>().unwrap(), Rubric::FourTier);
        assert!("three-tier".parse::<Rubric>().is_err());
        assert_eq!(Rubric::default(), Rubric::TwoTier);
        assert_eq!(KeywordClassifier::default().rubric(), Rubric::TwoTier);
    }
}
