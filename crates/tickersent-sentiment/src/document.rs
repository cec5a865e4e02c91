//! Title and paragraph scoring for news documents.
//!
//! Both scoring strategies implement [`TextScorer`] so the paragraph loop in
//! [`score_paragraphs`] is shared. A score of `None` means "no sentiment
//! computable" and is never averaged together with real scores.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::corpus::LabeledCorpus;
use crate::embeddings::{Embedder, Embedding};
use crate::error::SentimentError;
use crate::scorer::lexicon_score;
use crate::types::NewsDocument;

/// Scores a single piece of text.
pub trait TextScorer {
    /// Score `text`, or `Ok(None)` when no score can be computed for it.
    ///
    /// # Errors
    ///
    /// Implementations return an error for malformed input (for example an
    /// embedding whose dimension does not match the corpus).
    fn score(&self, text: &str) -> Result<Option<f32>, SentimentError>;
}

/// Compound lexicon score; always produces a value.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconScorer;

impl TextScorer for LexiconScorer {
    fn score(&self, text: &str) -> Result<Option<f32>, SentimentError> {
        Ok(Some(lexicon_score(text)))
    }
}

/// Embeddings for a fixed set of texts, computed in one batched call.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedTexts {
    by_text: HashMap<String, Embedding>,
}

impl EmbeddedTexts {
    /// Embed every distinct text once.
    ///
    /// # Errors
    ///
    /// Propagates embedder failures, and returns
    /// [`SentimentError::EmbeddingCount`] if the embedder answers with the
    /// wrong number of vectors.
    pub async fn build<E: Embedder>(texts: &[&str], embedder: &E) -> Result<Self, SentimentError> {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = texts.iter().copied().filter(|t| seen.insert(*t)).collect();
        if unique.is_empty() {
            return Ok(Self::default());
        }

        let embeddings = embedder.embed(&unique).await?;
        if embeddings.len() != unique.len() {
            return Err(SentimentError::EmbeddingCount {
                expected: unique.len(),
                found: embeddings.len(),
            });
        }

        let by_text = unique
            .into_iter()
            .map(str::to_string)
            .zip(embeddings)
            .collect();
        Ok(Self { by_text })
    }

    #[must_use]
    pub fn get(&self, text: &str) -> Option<&Embedding> {
        self.by_text.get(text)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_text.is_empty()
    }
}

/// Nearest-neighbor scorer over pre-computed embeddings.
pub struct NeighborScorer<'a> {
    corpus: &'a LabeledCorpus,
    embedded: &'a EmbeddedTexts,
    k: usize,
}

impl<'a> NeighborScorer<'a> {
    #[must_use]
    pub fn new(corpus: &'a LabeledCorpus, embedded: &'a EmbeddedTexts, k: usize) -> Self {
        Self {
            corpus,
            embedded,
            k,
        }
    }
}

impl TextScorer for NeighborScorer<'_> {
    fn score(&self, text: &str) -> Result<Option<f32>, SentimentError> {
        let embedding = self
            .embedded
            .get(text)
            .ok_or_else(|| SentimentError::MissingEmbedding(text.to_string()))?;
        Ok(self
            .corpus
            .neighbor_sentiment(embedding, self.k)?
            .map(|n| n.score))
    }
}

/// Mean of the `Some` values, or `None` when there are none.
pub fn mean_valid<I>(values: I) -> Option<f32>
where
    I: IntoIterator<Item = Option<f32>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0_f32, 0_u32), |(sum, count), v| (sum + v, count + 1));
    #[allow(clippy::cast_precision_loss)]
    (count > 0).then(|| sum / count as f32)
}

/// Score each paragraph independently and average the results.
///
/// An empty paragraph list has no score. Paragraphs the scorer cannot score
/// are left out of the mean.
///
/// # Errors
///
/// Propagates the first scorer error.
pub fn score_paragraphs<S>(paragraphs: &[String], scorer: &S) -> Result<Option<f32>, SentimentError>
where
    S: TextScorer + ?Sized,
{
    let scores = paragraphs
        .iter()
        .map(|p| scorer.score(p))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(mean_valid(scores))
}

fn score_title<S>(title: &str, scorer: &S) -> Result<Option<f32>, SentimentError>
where
    S: TextScorer + ?Sized,
{
    if title.trim().is_empty() {
        return Ok(None);
    }
    scorer.score(title)
}

/// Title and article scores for one document under both strategies.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DocumentSentiment {
    pub title_embedding: Option<f32>,
    pub title_lexicon: Option<f32>,
    pub article_embedding: Option<f32>,
    pub article_lexicon: Option<f32>,
}

/// Score a document's title and paragraphs with both strategies.
///
/// # Errors
///
/// Propagates scorer errors.
pub fn score_document<E, L>(
    document: &NewsDocument,
    embedding_scorer: &E,
    lexicon_scorer: &L,
) -> Result<DocumentSentiment, SentimentError>
where
    E: TextScorer + ?Sized,
    L: TextScorer + ?Sized,
{
    Ok(DocumentSentiment {
        title_embedding: score_title(&document.title, embedding_scorer)?,
        title_lexicon: score_title(&document.title, lexicon_scorer)?,
        article_embedding: score_paragraphs(&document.paragraphs, embedding_scorer)?,
        article_lexicon: score_paragraphs(&document.paragraphs, lexicon_scorer)?,
    })
}
