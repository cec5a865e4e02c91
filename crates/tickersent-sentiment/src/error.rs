use thiserror::Error;

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reddit API error: {0}")]
    Reddit(String),

    #[error("TEI embed error: {0}")]
    Tei(String),

    #[error("embedding dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("embedder returned {found} embeddings for {expected} texts")]
    EmbeddingCount { expected: usize, found: usize },

    #[error("labeled corpus is empty")]
    EmptyCorpus,

    #[error("cannot aggregate an empty neighbor set")]
    EmptyNeighborSet,

    #[error("neighbor index {index} is out of range for a corpus of {len} labels")]
    NeighborOutOfRange { index: usize, len: usize },

    #[error("invalid sentiment label '{0}'; expected -1, 0, 1, negative, neutral, or positive")]
    InvalidLabel(String),

    #[error("invalid embedding column on corpus row {row}: {reason}")]
    InvalidEmbedding { row: usize, reason: String },

    #[error("no embedding was computed for text: {0:.60}")]
    MissingEmbedding(String),
}
