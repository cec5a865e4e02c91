//! Sentence embeddings and the TEI (Text Embeddings Inference) client.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SentimentError;

/// Maximum number of texts per /embed call.
const BATCH_SIZE: usize = 64;

/// A fixed-length sentence embedding.
///
/// Embeddings produced by this crate are L2-normalized, so the dot product of
/// two of them is their cosine similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Wrap raw values without normalizing them.
    #[must_use]
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Wrap values scaled to unit L2 norm. A zero vector stays zero.
    #[must_use]
    pub fn normalized(mut values: Vec<f32>) -> Self {
        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut values {
                *v /= norm;
            }
        }
        Self(values)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Dot product with another embedding of the same dimension.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::DimensionMismatch`] if the dimensions differ.
    pub fn dot(&self, other: &Embedding) -> Result<f32, SentimentError> {
        if self.dim() != other.dim() {
            return Err(SentimentError::DimensionMismatch {
                expected: self.dim(),
                found: other.dim(),
            });
        }
        Ok(dot(&self.0, &other.0))
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Anything that turns texts into embeddings.
///
/// One call returns one embedding per input, in input order, or an error.
/// Implementations never return partial results.
pub trait Embedder {
    fn embed(
        &self,
        texts: &[&str],
    ) -> impl Future<Output = Result<Vec<Embedding>, SentimentError>> + Send;
}

/// TEI HTTP client.
pub struct TeiClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [&'a str],
    normalize: bool,
}

impl TeiClient {
    /// Create a new `TeiClient` for the TEI server at `tei_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(tei_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/embed", tei_url.trim_end_matches('/')),
        })
    }
}

impl Embedder for TeiClient {
    /// Generate embeddings for a batch of texts.
    ///
    /// Texts are batched into groups of [`BATCH_SIZE`] (64) per request.
    /// Returns one normalized embedding per input text, in the same order.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Tei`] if a request fails or a response
    /// cannot be parsed.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Embedding>, SentimentError> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let request = EmbedRequest {
                inputs: chunk,
                normalize: true,
            };
            let response = self
                .client
                .post(&self.url)
                .json(&request)
                .send()
                .await
                .map_err(|e| SentimentError::Tei(format!("TEI request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(SentimentError::Tei(format!(
                    "TEI returned status {}",
                    response.status()
                )));
            }

            let embeddings: Vec<Vec<f32>> = response
                .json()
                .await
                .map_err(|e| SentimentError::Tei(format!("TEI response parse error: {e}")))?;

            if embeddings.len() != chunk.len() {
                return Err(SentimentError::Tei(format!(
                    "TEI returned {} embeddings for {} inputs",
                    embeddings.len(),
                    chunk.len()
                )));
            }

            all_embeddings.extend(embeddings.into_iter().map(Embedding::normalized));
        }

        tracing::debug!(count = all_embeddings.len(), "embedded texts via TEI");
        Ok(all_embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_has_unit_length() {
        let e = Embedding::normalized(vec![3.0, 4.0]);
        assert!((e.as_slice()[0] - 0.6).abs() < 1e-6);
        assert!((e.as_slice()[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn normalized_zero_vector_stays_zero() {
        let e = Embedding::normalized(vec![0.0, 0.0, 0.0]);
        assert_eq!(e.as_slice(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn self_dot_of_normalized_is_one() {
        let e = Embedding::normalized(vec![0.3, -1.2, 2.5, 0.01]);
        let sim = e.dot(&e).unwrap();
        assert!((sim - 1.0).abs() < 1e-6, "expected 1.0, got {sim}");
    }

    #[test]
    fn dot_rejects_mismatched_dimensions() {
        let a = Embedding::new(vec![1.0, 0.0]);
        let b = Embedding::new(vec![1.0, 0.0, 0.0]);
        assert!(matches!(
            a.dot(&b),
            Err(SentimentError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn serializes_as_plain_array() {
        let e = Embedding::new(vec![0.5, -0.25]);
        assert_eq!(serde_json::to_string(&e).unwrap(), "[0.5,-0.25]");
    }
}
