//! Lexicon scorer for financial news text.
//!
//! Each word found in [`LEXICON`] contributes a valence on a `[-4, 4]` scale,
//! adjusted by nearby negations, intensity boosters, ALL-CAPS emphasis, a
//! contrastive "but", and trailing punctuation. The summed valence is
//! squashed into a `[-1, 1]` compound score.

use serde::{Deserialize, Serialize};

/// Word valences. Keys are lowercase tokens.
pub(crate) const LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 2.7),
    ("best", 3.2),
    ("better", 1.9),
    ("positive", 2.6),
    ("strong", 2.3),
    ("stronger", 2.2),
    ("strength", 2.2),
    ("growth", 1.8),
    ("grow", 1.5),
    ("growing", 1.6),
    ("gain", 2.0),
    ("gains", 2.0),
    ("profit", 1.9),
    ("profits", 1.9),
    ("profitable", 2.1),
    ("surge", 1.8),
    ("surges", 1.8),
    ("soar", 2.2),
    ("soars", 2.2),
    ("rally", 1.9),
    ("rallies", 1.9),
    ("beat", 1.6),
    ("beats", 1.6),
    ("outperform", 2.1),
    ("outperforms", 2.1),
    ("upgrade", 2.0),
    ("upgraded", 2.0),
    ("record", 1.2),
    ("boost", 1.7),
    ("boosts", 1.7),
    ("bullish", 2.4),
    ("optimistic", 2.4),
    ("optimism", 2.3),
    ("success", 2.7),
    ("successful", 2.8),
    ("win", 2.8),
    ("wins", 2.7),
    ("approved", 1.8),
    ("approval", 2.0),
    ("innovative", 2.0),
    ("robust", 1.8),
    ("recover", 1.6),
    ("recovery", 1.5),
    ("rebound", 1.5),
    ("love", 3.2),
    ("happy", 2.7),
    ("confident", 2.2),
    ("impressive", 2.3),
    ("exceed", 1.4),
    ("exceeds", 1.4),
    ("opportunity", 1.8),
    ("winner", 2.8),
    // Negative signals
    ("bad", -2.5),
    ("worst", -3.1),
    ("worse", -2.1),
    ("terrible", -2.5),
    ("poor", -2.1),
    ("weak", -1.9),
    ("weaker", -1.9),
    ("weakness", -1.8),
    ("loss", -1.3),
    ("losses", -1.7),
    ("lose", -1.7),
    ("lost", -1.3),
    ("decline", -1.5),
    ("declines", -1.5),
    ("drop", -1.1),
    ("drops", -1.1),
    ("fall", -1.4),
    ("falls", -1.4),
    ("plunge", -2.3),
    ("plunges", -2.3),
    ("crash", -2.6),
    ("slump", -2.0),
    ("tumble", -1.9),
    ("tumbles", -1.9),
    ("miss", -1.2),
    ("misses", -1.2),
    ("downgrade", -2.0),
    ("downgraded", -2.0),
    ("bearish", -2.4),
    ("risk", -1.1),
    ("risks", -1.1),
    ("fear", -2.2),
    ("fears", -2.2),
    ("concern", -1.4),
    ("concerns", -1.4),
    ("lawsuit", -1.8),
    ("fraud", -3.0),
    ("scandal", -2.6),
    ("investigation", -1.2),
    ("fined", -1.6),
    ("recall", -1.6),
    ("bankrupt", -2.8),
    ("bankruptcy", -2.8),
    ("layoffs", -2.0),
    ("cut", -1.1),
    ("cuts", -1.1),
    ("warning", -1.4),
    ("warns", -1.4),
    ("volatile", -1.4),
    ("uncertainty", -1.4),
    ("debt", -1.5),
    ("failed", -2.3),
    ("failure", -2.6),
    ("ban", -2.6),
    ("banned", -2.0),
    ("illegal", -2.6),
    ("problem", -1.7),
    ("problems", -1.7),
    ("disappointing", -2.2),
    ("underperform", -2.0),
    ("sell-off", -1.8),
    ("selloff", -1.8),
];

const BOOST_INCREMENT: f32 = 0.293;
const BOOST_DECREMENT: f32 = -0.293;
const CAPS_INCREMENT: f32 = 0.733;
const NEGATION_SCALAR: f32 = -0.74;
/// Booster strength by distance: one, two, or three tokens before the word.
const BOOST_DAMPING: [f32; 3] = [1.0, 0.95, 0.9];
const NORMALIZATION_ALPHA: f32 = 15.0;

const BOOSTERS: &[(&str, f32)] = &[
    ("very", BOOST_INCREMENT),
    ("extremely", BOOST_INCREMENT),
    ("highly", BOOST_INCREMENT),
    ("really", BOOST_INCREMENT),
    ("significantly", BOOST_INCREMENT),
    ("sharply", BOOST_INCREMENT),
    ("strongly", BOOST_INCREMENT),
    ("hugely", BOOST_INCREMENT),
    ("most", BOOST_INCREMENT),
    ("barely", BOOST_DECREMENT),
    ("slightly", BOOST_DECREMENT),
    ("somewhat", BOOST_DECREMENT),
    ("marginally", BOOST_DECREMENT),
    ("partly", BOOST_DECREMENT),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "without", "cannot",
    "isnt", "arent", "wasnt", "werent", "dont", "doesnt", "didnt", "wont", "cant", "couldnt",
    "shouldnt", "wouldnt", "hasnt", "havent", "hadnt",
];

/// Polarity breakdown for one text.
///
/// `positive`, `negative`, and `neutral` are proportions of the text that sum
/// to 1 (all zero for text with no tokens). `compound` is the normalized
/// overall score in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolarityScores {
    pub positive: f32,
    pub negative: f32,
    pub neutral: f32,
    pub compound: f32,
}

impl PolarityScores {
    /// Harmonic mean of the strictly positive proportions, or `None` when all are zero.
    #[must_use]
    pub fn harmonic_mean(&self) -> Option<f32> {
        let parts: Vec<f32> = [self.positive, self.negative, self.neutral]
            .into_iter()
            .filter(|v| *v > 0.0)
            .collect();
        if parts.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = parts.len() as f32;
        Some(n / parts.iter().map(|v| 1.0 / v).sum::<f32>())
    }
}

struct Token {
    lower: String,
    shouting: bool,
}

fn tokenize(text: &str) -> Vec<Token> {
    text.split_whitespace()
        .filter_map(|raw| {
            let cleaned = raw.trim_matches(|c: char| !c.is_alphanumeric());
            if cleaned.is_empty() {
                return None;
            }
            let letters: Vec<char> = cleaned.chars().filter(|c| c.is_alphabetic()).collect();
            let shouting = letters.len() > 1 && letters.iter().all(|c| c.is_uppercase());
            Some(Token {
                lower: cleaned.to_lowercase(),
                shouting,
            })
        })
        .collect()
}

fn lookup(table: &[(&str, f32)], word: &str) -> Option<f32> {
    table.iter().find(|(w, _)| *w == word).map(|&(_, v)| v)
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

fn punctuation_emphasis(text: &str) -> f32 {
    let exclamations = text.matches('!').count().min(4);
    let questions = text.matches('?').count();
    #[allow(clippy::cast_precision_loss)]
    let question_amp = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f32 * 0.18,
        _ => 0.96,
    };
    #[allow(clippy::cast_precision_loss)]
    let exclamation_amp = exclamations as f32 * 0.292;
    exclamation_amp + question_amp
}

fn token_valences(tokens: &[Token]) -> Vec<f32> {
    let mixed_case = tokens.iter().any(|t| t.shouting) && !tokens.iter().all(|t| t.shouting);

    let mut valences: Vec<f32> = tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            if lookup(BOOSTERS, &token.lower).is_some() || is_negation(&token.lower) {
                return 0.0;
            }
            let Some(mut valence) = lookup(LEXICON, &token.lower) else {
                return 0.0;
            };
            let sign = valence.signum();
            if token.shouting && mixed_case {
                valence += CAPS_INCREMENT * sign;
            }

            let window = &tokens[i.saturating_sub(3)..i];
            for (distance, prev) in window.iter().rev().enumerate() {
                if let Some(boost) = lookup(BOOSTERS, &prev.lower) {
                    valence += boost * sign * BOOST_DAMPING[distance];
                }
            }
            if window.iter().any(|prev| is_negation(&prev.lower)) {
                valence *= NEGATION_SCALAR;
            }
            valence
        })
        .collect();

    if let Some(pivot) = tokens.iter().position(|t| t.lower == "but") {
        for (i, valence) in valences.iter_mut().enumerate() {
            if i < pivot {
                *valence *= 0.5;
            } else if i > pivot {
                *valence *= 1.5;
            }
        }
    }

    valences
}

/// Full polarity breakdown for `text`.
#[must_use]
pub fn polarity_scores(text: &str) -> PolarityScores {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return PolarityScores::default();
    }

    let valences = token_valences(&tokens);
    let emphasis = punctuation_emphasis(text);

    let mut sum: f32 = valences.iter().sum();
    if sum > 0.0 {
        sum += emphasis;
    } else if sum < 0.0 {
        sum -= emphasis;
    }
    let compound = (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0);

    let mut pos_sum = 0.0_f32;
    let mut neg_sum = 0.0_f32;
    let mut neutral_count = 0.0_f32;
    for &v in &valences {
        if v > 0.0 {
            pos_sum += v + 1.0;
        } else if v < 0.0 {
            neg_sum += v - 1.0;
        } else {
            neutral_count += 1.0;
        }
    }
    if pos_sum > neg_sum.abs() {
        pos_sum += emphasis;
    } else if pos_sum < neg_sum.abs() {
        neg_sum -= emphasis;
    }

    let total = pos_sum + neg_sum.abs() + neutral_count;
    if total <= 0.0 {
        return PolarityScores::default();
    }

    PolarityScores {
        positive: pos_sum / total,
        negative: neg_sum.abs() / total,
        neutral: neutral_count / total,
        compound,
    }
}

/// Compound lexicon score for `text`, in `[-1.0, 1.0]`. Returns `0.0` for
/// empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    polarity_scores(text).compound
}
