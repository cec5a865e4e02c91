//! `trending` command: sentiment of rising Reddit threads.
//!
//! Each subreddit's rising posts are scored like news documents (title plus
//! top-level comments) and written to `{output_dir}/reddit_{subreddit}_documents.csv`.
//! Configured tickers mentioned in those threads get their own summary line.

use anyhow::Context;
use tickersent_core::{load_tickers, AppConfig, TickerConfig};
use tickersent_sentiment::{score_documents, RedditClient, RedditConfig, ScoredDocument};

use crate::analyze::report::{summarize, write_documents, TickerSummary};
use crate::corpus::{load_embedded_corpus, tei_client};

fn reddit_config(config: &AppConfig) -> anyhow::Result<RedditConfig> {
    let (Some(client_id), Some(client_secret)) = (
        config.reddit_client_id.clone(),
        config.reddit_client_secret.clone(),
    ) else {
        anyhow::bail!(
            "TICKERSENT_REDDIT_CLIENT_ID and TICKERSENT_REDDIT_CLIENT_SECRET must be set"
        );
    };
    Ok(RedditConfig {
        client_id,
        client_secret,
        user_agent: config.user_agent.clone(),
        timeout_secs: config.request_timeout_secs,
        max_posts: config.reddit_max_posts,
        max_concurrent_posts: config.max_concurrent_articles,
    })
}

/// Documents whose title or any paragraph contains one of the ticker's
/// query terms, matched case-sensitively.
pub(crate) fn mentioning<'a>(
    documents: &'a [ScoredDocument],
    ticker: &TickerConfig,
) -> Vec<&'a ScoredDocument> {
    let terms = ticker.effective_query_terms();
    documents
        .iter()
        .filter(|scored| {
            let doc = &scored.document;
            terms.iter().any(|term| {
                doc.title.contains(term.as_str())
                    || doc.paragraphs.iter().any(|p| p.contains(term.as_str()))
            })
        })
        .collect()
}

fn print_summary(label: &str, summary: &TickerSummary) {
    let fmt = |v: Option<f32>| v.map_or_else(|| "n/a".to_string(), |s| format!("{s:+.3}"));
    println!(
        "{label}: {} threads, title {} / {}, comments {} / {}",
        summary.document_count,
        fmt(summary.title_sentiment_embedding_mean),
        fmt(summary.title_sentiment_lexicon_mean),
        fmt(summary.article_sentiment_embedding_mean),
        fmt(summary.article_sentiment_lexicon_mean),
    );
}

/// Score rising threads of each subreddit and report per-ticker mentions.
///
/// # Errors
///
/// Returns an error if Reddit credentials are missing, the corpus or
/// clients cannot be set up, scoring fails, or every subreddit fails.
pub(crate) async fn run_trending(
    config: &AppConfig,
    subreddits: Vec<String>,
) -> anyhow::Result<()> {
    let requested = if subreddits.is_empty() {
        &config.subreddits
    } else {
        &subreddits
    };
    let subreddits: Vec<String> = requested
        .iter()
        .map(|s| s.trim().trim_start_matches("r/").to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if subreddits.is_empty() {
        anyhow::bail!("no subreddits given and TICKERSENT_SUBREDDITS is empty");
    }

    let reddit_config = reddit_config(config)?;
    let tickers = match load_tickers(&config.tickers_path) {
        Ok(file) => file.tickers,
        Err(e) => {
            tracing::warn!(error = %e, "tickers file unavailable; skipping mention summary");
            Vec::new()
        }
    };

    let corpus = load_embedded_corpus(config)?;
    let tei = tei_client(config)?;
    let reddit = RedditClient::connect(reddit_config)
        .await
        .context("failed to authenticate with Reddit")?;
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let mut all_scored: Vec<ScoredDocument> = Vec::new();
    let mut failed_subreddits: usize = 0;
    for subreddit in &subreddits {
        let documents = match reddit.collect_documents(subreddit).await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::error!(subreddit = %subreddit, error = %e, "subreddit collection failed");
                failed_subreddits += 1;
                continue;
            }
        };
        let scored = score_documents(documents, &corpus, &tei, config.top_k)
            .await
            .with_context(|| format!("failed to score r/{subreddit}"))?;

        let label = format!("r/{subreddit}");
        print_summary(&label, &summarize(&label, subreddit, &scored, None));
        let path = write_documents(&config.output_dir, &format!("reddit_{subreddit}"), &scored)?;
        tracing::info!(subreddit = %subreddit, documents = scored.len(), path = %path.display(), "subreddit scored");
        all_scored.extend(scored);
    }

    if failed_subreddits == subreddits.len() {
        anyhow::bail!("all {failed_subreddits} subreddits failed collection");
    }

    for ticker in &tickers {
        let mentions: Vec<ScoredDocument> = mentioning(&all_scored, ticker)
            .into_iter()
            .cloned()
            .collect();
        if mentions.is_empty() {
            continue;
        }
        let symbol = ticker.normalized_symbol();
        let name = ticker.company_name.clone().unwrap_or_else(|| symbol.clone());
        print_summary(&symbol, &summarize(&symbol, &name, &mentions, None));
    }

    Ok(())
}
