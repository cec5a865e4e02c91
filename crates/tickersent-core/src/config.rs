use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds a value that cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does not load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds a value that cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("TICKERSENT_ENV", "development"))?;
    let log_level = or_default("TICKERSENT_LOG_LEVEL", "info");

    let tickers_path = PathBuf::from(or_default(
        "TICKERSENT_TICKERS_PATH",
        "./config/tickers.yaml",
    ));
    let corpus_path = PathBuf::from(or_default(
        "TICKERSENT_CORPUS_PATH",
        "./assets/stock_sentiment_data.csv",
    ));
    let embedded_corpus_path = PathBuf::from(or_default(
        "TICKERSENT_EMBEDDED_CORPUS_PATH",
        "./assets/stock_sentiment_embed.csv",
    ));
    let output_dir = PathBuf::from(or_default("TICKERSENT_OUTPUT_DIR", "./output"));

    let tei_url = or_default("TICKERSENT_TEI_URL", "http://localhost:8080");
    let top_k = parse_usize("TICKERSENT_TOP_K", "10")?;
    if top_k == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TICKERSENT_TOP_K".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let corpus_sample = parse_usize("TICKERSENT_CORPUS_SAMPLE", "1000")?;

    let news_lang = or_default("TICKERSENT_NEWS_LANG", "en").to_lowercase();
    let news_country = or_default("TICKERSENT_NEWS_COUNTRY", "US").to_uppercase();
    let max_articles = parse_usize("TICKERSENT_MAX_ARTICLES", "25")?;

    let request_timeout_secs = parse_u64("TICKERSENT_REQUEST_TIMEOUT_SECS", "10")?;
    let user_agent = or_default(
        "TICKERSENT_USER_AGENT",
        "tickersent/0.1 (market-sentiment)",
    );
    let max_retries = parse_u32("TICKERSENT_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("TICKERSENT_RETRY_BACKOFF_BASE_MS", "500")?;

    let max_concurrent_tickers = parse_usize("TICKERSENT_MAX_CONCURRENT_TICKERS", "1")?;
    let max_concurrent_articles = parse_usize("TICKERSENT_MAX_CONCURRENT_ARTICLES", "4")?;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let reddit_client_id = optional("TICKERSENT_REDDIT_CLIENT_ID");
    let reddit_client_secret = optional("TICKERSENT_REDDIT_CLIENT_SECRET");
    let reddit_max_posts = parse_usize("TICKERSENT_REDDIT_MAX_POSTS", "25")?;
    let subreddits: Vec<String> = or_default(
        "TICKERSENT_SUBREDDITS",
        "wallstreetbets,investing,stocks",
    )
    .split(',')
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
    .collect();

    Ok(AppConfig {
        env,
        log_level,
        tickers_path,
        corpus_path,
        embedded_corpus_path,
        output_dir,
        tei_url,
        top_k,
        corpus_sample,
        news_lang,
        news_country,
        max_articles,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        max_concurrent_tickers,
        max_concurrent_articles,
        reddit_client_id,
        reddit_client_secret,
        reddit_max_posts,
        subreddits,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TICKERSENT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}
