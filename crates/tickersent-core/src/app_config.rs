use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for the analysis pipeline, read from `TICKERSENT_*` env vars.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub tickers_path: PathBuf,
    pub corpus_path: PathBuf,
    pub embedded_corpus_path: PathBuf,
    pub output_dir: PathBuf,
    pub tei_url: String,
    /// Number of corpus neighbors consulted per query. Always at least 1.
    pub top_k: usize,
    /// Rows sampled from the sentence corpus before embedding. `0` keeps every row.
    pub corpus_sample: usize,
    pub news_lang: String,
    pub news_country: String,
    pub max_articles: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub max_concurrent_tickers: usize,
    pub max_concurrent_articles: usize,
    /// Reddit application credentials. Both must be set for `trending`.
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_max_posts: usize,
    /// Subreddits polled by `trending` when none are given on the command line.
    pub subreddits: Vec<String>,
}
