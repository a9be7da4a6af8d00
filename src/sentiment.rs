//! Keyword-based sentiment annotator.
//!
//! Lowercases the text, splits on non-alphabetic characters and counts hits
//! against fixed positive/negative word lists, flipping a hit when the
//! preceding word is a negator ("not satisfied" counts against the product).
//! Polarity is the smoothed hit ratio in [-1, 1]; labels bucket around zero
//! with a neutral dead-zone. No external ML dependencies.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use utoipa::ToSchema;

/// Polarity band around zero treated as neutral.
pub const NEUTRAL_BAND: f32 = 0.1;

// Common positive words in product reviews
static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "good", "great", "excellent", "amazing", "wonderful", "fantastic", "superb",
        "outstanding", "brilliant", "love", "loved", "loving", "best", "better",
        "happy", "beautiful", "perfect", "awesome", "incredible", "delightful",
        "pleasant", "satisfying", "satisfied", "recommend", "recommended",
        "impressive", "exceptional", "remarkable", "efficient", "effective",
        "helpful", "reliable", "trustworthy", "quality", "valuable", "sturdy",
        "durable", "comfortable", "solid", "fast", "smooth", "worth", "bargain",
    ]
    .into_iter()
    .collect()
});

// Common negative words in product reviews
static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "bad", "terrible", "awful", "horrible", "poor", "worst", "worse", "hate",
        "hated", "dislike", "disappointing", "disappointed", "disappoints",
        "failure", "failed", "fail", "failing", "sad", "unhappy", "angry",
        "annoyed", "frustrated", "frustrating", "problem", "problems", "issue",
        "issues", "broken", "crash", "crashed", "error", "errors", "mistake",
        "mistakes", "wrong", "useless", "waste", "scam", "fraud", "fake",
        "unreliable", "unstable", "slow", "difficult", "confusing", "expensive",
        "overpriced", "worthless", "garbage", "trash", "rubbish", "pathetic",
        "mediocre", "subpar", "inferior", "average", "cheap", "flimsy",
        "defective", "refund", "noisy", "laggy",
    ]
    .into_iter()
    .collect()
});

// Words that flip the hit immediately after them. Split on non-alphabetic
// chars turns "doesn't" into "doesn", so the bare stems are listed too.
static NEGATORS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    vec![
        "not", "never", "hardly", "barely", "cannot", "cant", "don", "dont",
        "doesn", "doesnt", "didn", "didnt", "won", "wont", "wouldn", "wouldnt",
        "isn", "isnt", "wasn", "wasnt", "aren", "arent", "couldn", "couldnt",
        "shouldn", "shouldnt", "nothing",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Bucket a polarity score: above the neutral band is positive, below is
    /// negative, anything inside the band is neutral.
    pub fn from_polarity(polarity: f32) -> Self {
        if polarity > NEUTRAL_BAND {
            Sentiment::Positive
        } else if polarity < -NEUTRAL_BAND {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of sentiment analysis
#[derive(Debug, Clone, Copy)]
pub struct SentimentResult {
    pub label: Sentiment,
    pub polarity: f32,
}

/// Analyzes the sentiment of the provided text. Total: any string, including
/// the empty one, yields a result (no hits means neutral at polarity 0.0).
pub fn analyze(text: &str) -> SentimentResult {
    let lowercase_text = text.to_lowercase();
    let words: Vec<&str> = lowercase_text
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| w.len() > 2)
        .collect();

    let mut positive = 0i32;
    let mut negative = 0i32;
    for (i, word) in words.iter().enumerate() {
        let negated = i > 0 && NEGATORS.contains(words[i - 1]);
        if POSITIVE_WORDS.contains(*word) {
            if negated {
                negative += 1;
            } else {
                positive += 1;
            }
        } else if NEGATIVE_WORDS.contains(*word) {
            if negated {
                positive += 1;
            } else {
                negative += 1;
            }
        }
    }

    // +1 smoothing so a lone hit does not read as full-strength polarity
    let hits = positive + negative;
    let polarity = (positive - negative) as f32 / (hits + 1) as f32;

    SentimentResult {
        label: Sentiment::from_polarity(polarity),
        polarity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_text_scores_positive() {
        let text = "This product is amazing and wonderful. I love it so much. Best purchase ever!";
        let result = analyze(text);
        assert_eq!(result.label, Sentiment::Positive);
        assert!(result.polarity > NEUTRAL_BAND);
    }

    #[test]
    fn negative_text_scores_negative() {
        let text = "This is terrible and horrible. I hate it. Worst experience ever, total failure.";
        let result = analyze(text);
        assert_eq!(result.label, Sentiment::Negative);
        assert!(result.polarity < -NEUTRAL_BAND);
    }

    #[test]
    fn plain_text_scores_neutral() {
        let text = "The item arrived on time. It works as described in the listing.";
        let result = analyze(text);
        assert_eq!(result.label, Sentiment::Neutral);
    }

    #[test]
    fn negated_praise_counts_against() {
        let text = "I'm not satisfied with this phone. The quality is poor and it \
                    doesn't meet my expectations. Would not recommend.";
        let result = analyze(text);
        assert_eq!(result.label, Sentiment::Negative);
    }

    #[test]
    fn empty_text_is_neutral() {
        let result = analyze("");
        assert_eq!(result.label, Sentiment::Neutral);
        assert_eq!(result.polarity, 0.0);
    }

    #[test]
    fn analysis_is_deterministic() {
        let text = "Great battery, terrible screen, decent price overall.";
        let a = analyze(text);
        let b = analyze(text);
        assert_eq!(a.label, b.label);
        assert_eq!(a.polarity, b.polarity);
    }

    #[test]
    fn label_matches_polarity_bucketing() {
        for text in [
            "excellent quality, highly recommend",
            "broken and useless garbage",
            "it is a thing that exists",
            "",
        ] {
            let result = analyze(text);
            assert_eq!(result.label, Sentiment::from_polarity(result.polarity));
        }
    }
}
