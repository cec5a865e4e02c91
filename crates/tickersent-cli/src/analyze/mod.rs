//! `analyze` command: the per-ticker pipeline.
//!
//! For each ticker: price history → annualized return; news search → article
//! paragraphs → batch embedding → per-document scores from both strategies →
//! summary record. Outputs go to `{output_dir}/{TICKER}_summary.json` and
//! `{output_dir}/{TICKER}_documents.csv`.
//!
//! A missing data source leaves the matching summary fields empty rather than
//! failing the ticker. Per-ticker failures are logged and counted; the run
//! fails only when every ticker fails.

pub(crate) mod report;

use anyhow::Context;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tickersent_core::{load_tickers, validate_symbol, AppConfig, TickerConfig, TickersFile};
use tickersent_market::{total_return, YahooClient};
use tickersent_sentiment::{
    score_documents, GoogleNews, LabeledCorpus, NewsConfig, NewsDocument, TeiClient,
};

use crate::corpus::{load_embedded_corpus, tei_client};
use crate::returns::yahoo_client;
use report::{summarize, write_documents, write_summary, TickerSummary};

struct AnalyzeContext<'a> {
    config: &'a AppConfig,
    corpus: &'a LabeledCorpus,
    tei: &'a TeiClient,
    news: &'a GoogleNews,
    yahoo: &'a YahooClient,
    start: NaiveDate,
    end: NaiveDate,
}

fn news_config(config: &AppConfig) -> NewsConfig {
    NewsConfig {
        lang: config.news_lang.clone(),
        country: config.news_country.clone(),
        timeout_secs: config.request_timeout_secs,
        user_agent: config.user_agent.clone(),
        max_articles: config.max_articles,
        max_concurrent_articles: config.max_concurrent_articles,
    }
}

/// Resolve which tickers to process. A symbol passed with `--ticker` that is
/// not in the tickers file is analyzed with default settings.
///
/// # Errors
///
/// Returns an error if the `--ticker` value is not a valid symbol.
pub(crate) fn select_tickers(
    tickers_file: TickersFile,
    filter: Option<&str>,
) -> anyhow::Result<Vec<TickerConfig>> {
    let Some(symbol) = filter else {
        return Ok(tickers_file.tickers);
    };
    let wanted = validate_symbol(symbol).context("invalid --ticker value")?;
    if let Some(ticker) = tickers_file.find(&wanted) {
        return Ok(vec![ticker.clone()]);
    }
    tracing::info!(ticker = %wanted, "ticker not in tickers file; using defaults");
    Ok(vec![TickerConfig {
        symbol: wanted,
        company_name: None,
        query_terms: Vec::new(),
    }])
}

/// Run the pipeline for every selected ticker.
///
/// When `dry_run` is `true`, prints the plan and returns without any network
/// access.
///
/// # Errors
///
/// Returns an error if the window is reversed, the tickers file or corpus
/// cannot be loaded, a client cannot be built, or every ticker fails.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    ticker_filter: Option<&str>,
    start: NaiveDate,
    end: NaiveDate,
    dry_run: bool,
) -> anyhow::Result<()> {
    if end < start {
        anyhow::bail!("--end {end} is before --start {start}");
    }

    let tickers_file = load_tickers(&config.tickers_path).with_context(|| {
        format!(
            "failed to load tickers from {}",
            config.tickers_path.display()
        )
    })?;
    let tickers = select_tickers(tickers_file, ticker_filter)?;

    if tickers.is_empty() {
        println!("no tickers configured; nothing to analyze");
        return Ok(());
    }

    if dry_run {
        let symbols: Vec<String> = tickers.iter().map(TickerConfig::normalized_symbol).collect();
        println!(
            "dry-run: would analyze {} tickers [{}] from {start} to {end}, writing to {}",
            tickers.len(),
            symbols.join(", "),
            config.output_dir.display()
        );
        return Ok(());
    }

    let corpus = load_embedded_corpus(config)?;
    let tei = tei_client(config)?;
    let news = GoogleNews::new(news_config(config)).context("failed to build news client")?;
    let yahoo = yahoo_client(config)?;
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let ctx = AnalyzeContext {
        config,
        corpus: &corpus,
        tei: &tei,
        news: &news,
        yahoo: &yahoo,
        start,
        end,
    };

    let ticker_count = tickers.len();
    let results: Vec<(String, anyhow::Result<TickerSummary>)> = stream::iter(&tickers)
        .map(|ticker| {
            let ctx = &ctx;
            async move { (ticker.normalized_symbol(), analyze_ticker(ctx, ticker).await) }
        })
        .buffer_unordered(config.max_concurrent_tickers.max(1))
        .collect()
        .await;

    let mut failed_tickers: usize = 0;
    for (symbol, result) in &results {
        match result {
            Ok(summary) => {
                let fmt = |v: Option<f32>| v.map_or_else(|| "n/a".to_string(), |s| format!("{s:+.3}"));
                println!(
                    "{symbol}: {} documents, title {} / {}, article {} / {}, return {}",
                    summary.document_count,
                    fmt(summary.title_sentiment_embedding_mean),
                    fmt(summary.title_sentiment_lexicon_mean),
                    fmt(summary.article_sentiment_embedding_mean),
                    fmt(summary.article_sentiment_lexicon_mean),
                    summary
                        .annualized_return
                        .map_or_else(|| "n/a".to_string(), |r| format!("{:+.2}%", r * 100.0)),
                );
            }
            Err(e) => {
                tracing::error!(ticker = %symbol, error = %format!("{e:#}"), "ticker analysis failed");
                failed_tickers += 1;
            }
        }
    }

    if failed_tickers > 0 {
        tracing::warn!(
            failed_tickers,
            total_tickers = ticker_count,
            "some tickers failed during analysis"
        );
    }
    if failed_tickers == ticker_count {
        anyhow::bail!("all {failed_tickers} tickers failed analysis");
    }

    println!(
        "analysis complete: {} tickers processed, {} failed",
        ticker_count - failed_tickers,
        failed_tickers
    );
    Ok(())
}

async fn analyze_ticker(
    ctx: &AnalyzeContext<'_>,
    ticker: &TickerConfig,
) -> anyhow::Result<TickerSummary> {
    let symbol = ticker.normalized_symbol();

    let history = match ctx.yahoo.fetch_history(&symbol, ctx.start, ctx.end).await {
        Ok(history) => Some(history),
        Err(e) => {
            tracing::warn!(ticker = %symbol, error = %e, "price history unavailable");
            None
        }
    };
    let annualized_return = history.as_ref().and_then(|h| {
        match total_return(&h.bars, ctx.start, ctx.end) {
            Ok(result) => Some(result.annualized),
            Err(e) => {
                tracing::warn!(ticker = %symbol, error = %e, "annualized return undefined");
                None
            }
        }
    });

    let documents = collect_news(ctx, ticker, &symbol).await;
    if history.is_none() && documents.is_none() {
        anyhow::bail!("neither price history nor news is available for {symbol}");
    }

    let scored = score_documents(
        documents.unwrap_or_default(),
        ctx.corpus,
        ctx.tei,
        ctx.config.top_k,
    )
    .await
    .with_context(|| format!("failed to score news for {symbol}"))?;

    let company_name = ticker
        .company_name
        .clone()
        .or_else(|| history.and_then(|h| h.company_name))
        .unwrap_or_else(|| symbol.clone());

    let summary = summarize(&symbol, &company_name, &scored, annualized_return);
    let summary_path = write_summary(&ctx.config.output_dir, &summary)?;
    let documents_path = write_documents(&ctx.config.output_dir, &symbol, &scored)?;
    tracing::info!(
        ticker = %symbol,
        documents = summary.document_count,
        summary = %summary_path.display(),
        documents_csv = %documents_path.display(),
        "ticker analysis written"
    );
    Ok(summary)
}

/// News for one ticker, or `None` when the search itself failed.
async fn collect_news(
    ctx: &AnalyzeContext<'_>,
    ticker: &TickerConfig,
    symbol: &str,
) -> Option<Vec<NewsDocument>> {
    let terms = ticker.effective_query_terms();
    match ctx
        .news
        .collect_documents(symbol, &terms, Some(ctx.start), Some(ctx.end))
        .await
    {
        Ok(documents) => {
            tracing::info!(ticker = %symbol, documents = documents.len(), "news collected");
            Some(documents)
        }
        Err(e) => {
            tracing::warn!(ticker = %symbol, error = %e, "news search failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(symbol: &str) -> TickerConfig {
        TickerConfig {
            symbol: symbol.to_string(),
            company_name: None,
            query_terms: Vec::new(),
        }
    }

    fn file(tickers: Vec<TickerConfig>) -> TickersFile {
        TickersFile { tickers }
    }

    #[test]
    fn no_filter_keeps_all_tickers() {
        let selected = select_tickers(file(vec![ticker("GOOG"), ticker("MSFT")]), None).unwrap();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn filter_matches_case_insensitively() {
        let mut goog = ticker("GOOG");
        goog.company_name = Some("Alphabet Inc.".to_string());
        let selected = select_tickers(file(vec![goog, ticker("MSFT")]), Some(" goog ")).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].company_name.as_deref(), Some("Alphabet Inc."));
    }

    #[test]
    fn unknown_filter_uses_defaults() {
        let selected = select_tickers(file(vec![ticker("GOOG")]), Some("ge")).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].symbol, "GE");
        assert!(selected[0].company_name.is_none());
    }

    #[test]
    fn path_like_filter_is_rejected() {
        let err = select_tickers(file(vec![]), Some("../escape")).unwrap_err();
        assert!(format!("{err:#}").contains("invalid characters"));
    }

    #[test]
    fn blank_filter_is_rejected() {
        let err = select_tickers(file(vec![ticker("GOOG")]), Some("   ")).unwrap_err();
        assert!(format!("{err:#}").contains("non-empty"));
    }
}
