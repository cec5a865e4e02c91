//! Sentiment scoring for ticker news.
//!
//! Scores text two ways: a lexicon scorer over a fixed valence dictionary,
//! and a semantic scorer that embeds text via TEI, finds the nearest labeled
//! sentences in a corpus by cosine similarity, and averages their labels.
//! Documents (title plus paragraphs) are scored per paragraph and reduced to
//! one score per strategy.

pub mod aggregate;
pub mod corpus;
pub mod document;
pub mod embeddings;
pub mod error;
pub mod pipeline;
pub mod scorer;
pub mod similarity;
pub mod sources;
pub mod types;

pub use aggregate::{aggregate, classify, SentimentLabel};
pub use corpus::{load_sentences, sample_rows, LabeledCorpus, NeighborSentiment, SentenceRow};
pub use document::{
    mean_valid, score_document, score_paragraphs, DocumentSentiment, EmbeddedTexts,
    LexiconScorer, NeighborScorer, TextScorer,
};
pub use embeddings::{Embedder, Embedding, TeiClient};
pub use error::SentimentError;
pub use pipeline::score_documents;
pub use scorer::{lexicon_score, polarity_scores, PolarityScores};
pub use similarity::{similarity, similarity_batch, top_k, EmbeddingMatrix, NeighborSet};
pub use sources::{GoogleNews, RedditClient};
pub use types::{NewsConfig, NewsDocument, NewsItem, RedditConfig, ScoredDocument};
