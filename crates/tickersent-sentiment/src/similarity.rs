//! Cosine similarity between query embeddings and a corpus matrix, plus top-K selection.
//!
//! Every embedding in this crate is pre-normalized, so similarity is a plain
//! dot product. Queries are always rows and the corpus is always an N×D
//! matrix, so no operand ever needs transposing.

use std::cmp::Ordering;

use crate::embeddings::{dot, Embedding};
use crate::error::SentimentError;

/// Row-major N×D matrix of corpus embeddings.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingMatrix {
    data: Vec<f32>,
    rows: usize,
    dim: usize,
}

impl EmbeddingMatrix {
    /// Stack embeddings into a matrix.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::DimensionMismatch`] if any row's dimension
    /// differs from the first row's.
    pub fn from_rows<'a, I>(rows: I) -> Result<Self, SentimentError>
    where
        I: IntoIterator<Item = &'a Embedding>,
    {
        let mut matrix = Self::default();
        for row in rows {
            matrix.push(row)?;
        }
        Ok(matrix)
    }

    fn push(&mut self, row: &Embedding) -> Result<(), SentimentError> {
        if self.rows == 0 {
            self.dim = row.dim();
        } else if row.dim() != self.dim {
            return Err(SentimentError::DimensionMismatch {
                expected: self.dim,
                found: row.dim(),
            });
        }
        self.data.extend_from_slice(row.as_slice());
        self.rows += 1;
        Ok(())
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.dim == 0
    }

    /// Row `index` as a slice, or `None` when out of range.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        (index < self.rows).then(|| &self.data[index * self.dim..(index + 1) * self.dim])
    }

    fn iter_rows(&self) -> impl Iterator<Item = &[f32]> {
        // `chunks_exact` panics on a zero chunk size.
        self.data.chunks_exact(self.dim.max(1)).take(self.rows)
    }
}

/// Cosine similarity of one query against every corpus row.
///
/// Returns an N-length vector index-aligned with the corpus. An empty query
/// or an empty corpus yields an empty vector, meaning "no match possible".
///
/// # Errors
///
/// Returns [`SentimentError::DimensionMismatch`] if the query dimension does
/// not match the corpus dimension.
pub fn similarity(query: &Embedding, corpus: &EmbeddingMatrix) -> Result<Vec<f32>, SentimentError> {
    if query.is_empty() || corpus.is_empty() {
        return Ok(Vec::new());
    }
    if query.dim() != corpus.dim() {
        return Err(SentimentError::DimensionMismatch {
            expected: corpus.dim(),
            found: query.dim(),
        });
    }
    Ok(corpus
        .iter_rows()
        .map(|row| dot(query.as_slice(), row))
        .collect())
}

/// Cosine similarity of M queries against the corpus, as an M×N result.
///
/// An empty batch or an empty corpus yields an empty result. Empty queries
/// inside a non-empty batch yield empty rows.
///
/// # Errors
///
/// Returns [`SentimentError::DimensionMismatch`] for the first query whose
/// dimension does not match the corpus.
pub fn similarity_batch(
    queries: &[Embedding],
    corpus: &EmbeddingMatrix,
) -> Result<Vec<Vec<f32>>, SentimentError> {
    if corpus.is_empty() {
        return Ok(Vec::new());
    }
    queries.iter().map(|q| similarity(q, corpus)).collect()
}

/// Indices of the K highest similarity scores.
///
/// The result is a set; its members are returned in descending score order
/// for display. Ties at the K-th boundary may keep either member.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NeighborSet(Vec<usize>);

impl NeighborSet {
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// NaN sorts below every real score so it is never preferred.
fn descending(scores: &[f32], a: usize, b: usize) -> Ordering {
    match (scores[a].is_nan(), scores[b].is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => scores[b].total_cmp(&scores[a]),
    }
}

/// Select the `k` highest-scoring indices. `k` is clamped to the vector length.
#[must_use]
pub fn top_k(scores: &[f32], k: usize) -> NeighborSet {
    let k = k.min(scores.len());
    if k == 0 {
        return NeighborSet::default();
    }

    let mut indices: Vec<usize> = (0..scores.len()).collect();
    if k < indices.len() {
        indices.select_nth_unstable_by(k - 1, |&a, &b| descending(scores, a, b));
        indices.truncate(k);
    }
    indices.sort_unstable_by(|&a, &b| descending(scores, a, b));
    NeighborSet(indices)
}
