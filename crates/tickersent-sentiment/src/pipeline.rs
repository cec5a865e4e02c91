//! Batch scoring of collected news documents.

use crate::corpus::LabeledCorpus;
use crate::document::{score_document, EmbeddedTexts, LexiconScorer, NeighborScorer};
use crate::embeddings::Embedder;
use crate::error::SentimentError;
use crate::types::{NewsDocument, ScoredDocument};

/// Score every document with both strategies.
///
/// 1. Gather every non-blank title and every paragraph across all documents.
/// 2. Embed the distinct texts in one batched call.
/// 3. Score each document's title and paragraphs against the corpus
///    (nearest `top_k` neighbors) and with the lexicon.
///
/// Documents that fail to score are logged and left out of the result.
///
/// # Errors
///
/// Returns [`SentimentError`] if the embedding call fails; without
/// embeddings no document can be scored by the semantic strategy.
pub async fn score_documents<E: Embedder>(
    documents: Vec<NewsDocument>,
    corpus: &LabeledCorpus,
    embedder: &E,
    top_k: usize,
) -> Result<Vec<ScoredDocument>, SentimentError> {
    if documents.is_empty() {
        tracing::info!("no documents to score");
        return Ok(Vec::new());
    }

    let texts: Vec<&str> = documents
        .iter()
        .flat_map(|doc| {
            std::iter::once(doc.title.as_str())
                .filter(|t| !t.trim().is_empty())
                .chain(doc.paragraphs.iter().map(String::as_str))
        })
        .collect();
    let embedded = EmbeddedTexts::build(&texts, embedder).await?;
    tracing::debug!(
        documents = documents.len(),
        texts = embedded.len(),
        "embedded document texts"
    );

    let neighbor_scorer = NeighborScorer::new(corpus, &embedded, top_k);
    let mut scored = Vec::with_capacity(documents.len());
    for document in documents {
        match score_document(&document, &neighbor_scorer, &LexiconScorer) {
            Ok(sentiment) => scored.push(ScoredDocument {
                document,
                sentiment,
            }),
            Err(e) => {
                tracing::warn!(url = %document.link, error = %e, "document scoring failed; skipping");
            }
        }
    }

    Ok(scored)
}
