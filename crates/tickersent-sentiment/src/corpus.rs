//! Labeled sentence corpus and nearest-neighbor sentiment lookup.

use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::aggregate::{aggregate, classify, SentimentLabel};
use crate::embeddings::{Embedder, Embedding};
use crate::error::SentimentError;
use crate::similarity::{similarity, top_k, EmbeddingMatrix, NeighborSet};

/// One row of the sentence corpus file (`Sentence`, `Sentiment` columns).
#[derive(Debug, Clone, Deserialize)]
pub struct SentenceRow {
    #[serde(rename = "Sentence")]
    pub sentence: String,
    #[serde(rename = "Sentiment", deserialize_with = "deserialize_label")]
    pub label: SentimentLabel,
}

#[derive(Deserialize)]
struct EmbeddedRow {
    #[serde(rename = "Sentence")]
    sentence: String,
    #[serde(rename = "Sentiment", deserialize_with = "deserialize_label")]
    label: SentimentLabel,
    #[serde(rename = "Embedding")]
    embedding: String,
}

fn deserialize_label<'de, D>(deserializer: D) -> Result<SentimentLabel, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

/// Read the sentence corpus. Columns other than `Sentence` and `Sentiment`
/// are ignored; rows with a blank sentence are skipped.
///
/// # Errors
///
/// Returns [`SentimentError::Csv`] if the file cannot be read or a row has
/// an unrecognized label.
pub fn load_sentences(path: &Path) -> Result<Vec<SentenceRow>, SentimentError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<SentenceRow>() {
        let row = record?;
        if row.sentence.trim().is_empty() {
            continue;
        }
        rows.push(row);
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded sentence corpus");
    Ok(rows)
}

/// Uniformly sample `n` rows without replacement, preserving file order.
/// `n == 0` or `n >= rows.len()` keeps every row.
#[must_use]
pub fn sample_rows(rows: Vec<SentenceRow>, n: usize) -> Vec<SentenceRow> {
    if n == 0 || n >= rows.len() {
        return rows;
    }
    let mut keep = vec![false; rows.len()];
    for index in rand::seq::index::sample(&mut rand::rng(), rows.len(), n) {
        keep[index] = true;
    }
    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, kept)| kept.then_some(row))
        .collect()
}

/// Result of a nearest-neighbor sentiment query.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborSentiment {
    /// Mean label of the neighbors, in `[-1, 1]`.
    pub score: f32,
    pub label: SentimentLabel,
    pub neighbors: NeighborSet,
}

/// Sentences, their labels, and their embeddings, index-aligned. Read-only
/// once built.
#[derive(Debug, Clone)]
pub struct LabeledCorpus {
    sentences: Vec<String>,
    labels: Vec<SentimentLabel>,
    matrix: EmbeddingMatrix,
}

impl LabeledCorpus {
    /// Pair corpus rows with their embeddings.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::EmptyCorpus`] for zero rows,
    /// [`SentimentError::EmbeddingCount`] if the counts differ, and
    /// [`SentimentError::DimensionMismatch`] if embedding dimensions differ.
    pub fn from_parts(
        rows: Vec<SentenceRow>,
        embeddings: &[Embedding],
    ) -> Result<Self, SentimentError> {
        if rows.is_empty() {
            return Err(SentimentError::EmptyCorpus);
        }
        if rows.len() != embeddings.len() {
            return Err(SentimentError::EmbeddingCount {
                expected: rows.len(),
                found: embeddings.len(),
            });
        }
        let matrix = EmbeddingMatrix::from_rows(embeddings)?;
        let (sentences, labels) = rows.into_iter().map(|r| (r.sentence, r.label)).unzip();
        Ok(Self {
            sentences,
            labels,
            matrix,
        })
    }

    /// Embed every sentence in one batched call and build the corpus.
    ///
    /// # Errors
    ///
    /// Propagates embedder failures and the errors of [`LabeledCorpus::from_parts`].
    pub async fn embed<E: Embedder>(
        rows: Vec<SentenceRow>,
        embedder: &E,
    ) -> Result<Self, SentimentError> {
        if rows.is_empty() {
            return Err(SentimentError::EmptyCorpus);
        }
        let texts: Vec<&str> = rows.iter().map(|r| r.sentence.as_str()).collect();
        let embeddings = embedder.embed(&texts).await?;
        Self::from_parts(rows, &embeddings)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.matrix.dim()
    }

    #[must_use]
    pub fn sentence(&self, index: usize) -> Option<&str> {
        self.sentences.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn labels(&self) -> &[SentimentLabel] {
        &self.labels
    }

    /// Similarity search, top-K selection, and label aggregation for one query.
    ///
    /// Returns `Ok(None)` when no match is possible: an empty query or `k == 0`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::DimensionMismatch`] if the query dimension
    /// differs from the corpus dimension.
    pub fn neighbor_sentiment(
        &self,
        query: &Embedding,
        k: usize,
    ) -> Result<Option<NeighborSentiment>, SentimentError> {
        let scores = similarity(query, &self.matrix)?;
        let neighbors = top_k(&scores, k);
        if neighbors.is_empty() {
            return Ok(None);
        }
        let score = aggregate(&neighbors, &self.labels)?;
        Ok(Some(NeighborSentiment {
            score,
            label: classify(score),
            neighbors,
        }))
    }

    /// Persist sentences, labels, and embeddings so the embedding step runs once.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Csv`] or [`SentimentError::Io`] on write failure.
    pub fn write_embedded(&self, path: &Path) -> Result<(), SentimentError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["Sentence", "Sentiment", "Embedding"])?;
        for (index, (sentence, label)) in self.sentences.iter().zip(&self.labels).enumerate() {
            let embedding = self.matrix.row(index).unwrap_or_default();
            let encoded = serde_json::to_string(embedding).map_err(|e| {
                SentimentError::InvalidEmbedding {
                    row: index,
                    reason: e.to_string(),
                }
            })?;
            writer.write_record([sentence.as_str(), &label.value().to_string(), &encoded])?;
        }
        writer.flush()?;
        tracing::info!(path = %path.display(), rows = self.len(), "wrote embedded corpus");
        Ok(())
    }

    /// Load a corpus written by [`LabeledCorpus::write_embedded`].
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::InvalidEmbedding`] for an unparsable
    /// embedding column, plus the errors of [`LabeledCorpus::from_parts`].
    pub fn read_embedded(path: &Path) -> Result<Self, SentimentError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut rows = Vec::new();
        let mut embeddings = Vec::new();
        for (index, record) in reader.deserialize::<EmbeddedRow>().enumerate() {
            let row = record?;
            let values: Vec<f32> = serde_json::from_str(&row.embedding).map_err(|e| {
                SentimentError::InvalidEmbedding {
                    row: index,
                    reason: e.to_string(),
                }
            })?;
            embeddings.push(Embedding::new(values));
            rows.push(SentenceRow {
                sentence: row.sentence,
                label: row.label,
            });
        }
        let corpus = Self::from_parts(rows, &embeddings)?;
        tracing::debug!(path = %path.display(), rows = corpus.len(), dim = corpus.dim(), "loaded embedded corpus");
        Ok(corpus)
    }
}
