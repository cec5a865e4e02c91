//! Reduce neighbor labels to a sentiment score.
//!
//! Labels use the ternary encoding `-1 / 0 / 1`. A neighbor mean is classed
//! positive above 0, neutral at exactly 0, and negative below 0.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SentimentError;
use crate::similarity::NeighborSet;

/// Discrete sentiment class of a corpus sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    /// Numeric encoding: `-1`, `0`, or `1`.
    #[must_use]
    pub fn value(self) -> i8 {
        match self {
            SentimentLabel::Negative => -1,
            SentimentLabel::Neutral => 0,
            SentimentLabel::Positive => 1,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
            SentimentLabel::Positive => write!(f, "positive"),
        }
    }
}

impl FromStr for SentimentLabel {
    type Err = SentimentError;

    /// Accepts `-1/0/1` (optionally written as floats, e.g. `1.0`) or the
    /// class names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "-1" | "-1.0" | "negative" => Ok(SentimentLabel::Negative),
            "0" | "0.0" | "neutral" => Ok(SentimentLabel::Neutral),
            "1" | "1.0" | "positive" => Ok(SentimentLabel::Positive),
            _ => Err(SentimentError::InvalidLabel(trimmed.to_string())),
        }
    }
}

/// Mean label value of the neighbors.
///
/// # Errors
///
/// Returns [`SentimentError::EmptyNeighborSet`] when there are no neighbors,
/// and [`SentimentError::NeighborOutOfRange`] when an index has no label.
pub fn aggregate(
    neighbors: &NeighborSet,
    labels: &[SentimentLabel],
) -> Result<f32, SentimentError> {
    if neighbors.is_empty() {
        return Err(SentimentError::EmptyNeighborSet);
    }

    let mut sum = 0_i64;
    for &index in neighbors.indices() {
        let label = labels
            .get(index)
            .ok_or(SentimentError::NeighborOutOfRange {
                index,
                len: labels.len(),
            })?;
        sum += i64::from(label.value());
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = sum as f32 / neighbors.len() as f32;
    Ok(mean)
}

/// Discrete class for a neighbor mean.
#[must_use]
pub fn classify(mean: f32) -> SentimentLabel {
    if mean > 0.0 {
        SentimentLabel::Positive
    } else if mean < 0.0 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}
