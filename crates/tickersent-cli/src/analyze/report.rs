//! Per-ticker summary record and its JSON/CSV output.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use tickersent_sentiment::{mean_valid, ScoredDocument};

/// One row per ticker: cross-document sentiment means and the realized return.
///
/// Means skip documents whose score for that field is missing; a mean is
/// `None` only when no document has a score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct TickerSummary {
    pub(crate) ticker: String,
    pub(crate) company_name: String,
    pub(crate) earliest_date: Option<NaiveDate>,
    pub(crate) latest_date: Option<NaiveDate>,
    pub(crate) title_sentiment_embedding_mean: Option<f32>,
    pub(crate) title_sentiment_lexicon_mean: Option<f32>,
    pub(crate) article_sentiment_embedding_mean: Option<f32>,
    pub(crate) article_sentiment_lexicon_mean: Option<f32>,
    pub(crate) annualized_return: Option<f64>,
    pub(crate) document_count: usize,
}

pub(crate) fn summarize(
    ticker: &str,
    company_name: &str,
    documents: &[ScoredDocument],
    annualized_return: Option<f64>,
) -> TickerSummary {
    let mean_of = |field: fn(&ScoredDocument) -> Option<f32>| mean_valid(documents.iter().map(field));
    TickerSummary {
        ticker: ticker.to_string(),
        company_name: company_name.to_string(),
        earliest_date: documents.iter().map(|d| d.document.date).min(),
        latest_date: documents.iter().map(|d| d.document.date).max(),
        title_sentiment_embedding_mean: mean_of(|d| d.sentiment.title_embedding),
        title_sentiment_lexicon_mean: mean_of(|d| d.sentiment.title_lexicon),
        article_sentiment_embedding_mean: mean_of(|d| d.sentiment.article_embedding),
        article_sentiment_lexicon_mean: mean_of(|d| d.sentiment.article_lexicon),
        annualized_return,
        document_count: documents.len(),
    }
}

#[derive(Serialize)]
struct DocumentRow<'a> {
    date: NaiveDate,
    title: &'a str,
    link: &'a str,
    canonical_url: Option<&'a str>,
    paragraph_count: usize,
    title_sentiment_embedding: Option<f32>,
    title_sentiment_lexicon: Option<f32>,
    article_sentiment_embedding: Option<f32>,
    article_sentiment_lexicon: Option<f32>,
    /// Paragraphs as a JSON array.
    article_content: String,
}

/// Write `{dir}/{TICKER}_summary.json`.
pub(crate) fn write_summary(dir: &Path, summary: &TickerSummary) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("{}_summary.json", summary.ticker));
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Write `{dir}/{TICKER}_documents.csv`, one row per scored document.
pub(crate) fn write_documents(
    dir: &Path,
    ticker: &str,
    documents: &[ScoredDocument],
) -> anyhow::Result<PathBuf> {
    let path = dir.join(format!("{ticker}_documents.csv"));
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for scored in documents {
        let doc = &scored.document;
        writer.serialize(DocumentRow {
            date: doc.date,
            title: &doc.title,
            link: &doc.link,
            canonical_url: doc.canonical_url.as_deref(),
            paragraph_count: doc.paragraphs.len(),
            title_sentiment_embedding: scored.sentiment.title_embedding,
            title_sentiment_lexicon: scored.sentiment.title_lexicon,
            article_sentiment_embedding: scored.sentiment.article_embedding,
            article_sentiment_lexicon: scored.sentiment.article_lexicon,
            article_content: serde_json::to_string(&doc.paragraphs)?,
        })?;
    }
    writer.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use tickersent_sentiment::{DocumentSentiment, NewsDocument};

    use super::*;

    fn scored(day: u32, title: Option<f32>, article: Option<f32>) -> ScoredDocument {
        ScoredDocument {
            document: NewsDocument {
                date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                title: format!("headline {day}"),
                link: format!("https://news.example.com/{day}"),
                canonical_url: None,
                paragraphs: vec!["Alphabet, Inc. rose".to_string()],
            },
            sentiment: DocumentSentiment {
                title_embedding: title,
                title_lexicon: title,
                article_embedding: article,
                article_lexicon: article,
            },
        }
    }

    #[test]
    fn means_skip_missing_scores() {
        let docs = vec![
            scored(5, Some(0.8), None),
            scored(2, Some(0.6), Some(-0.2)),
            scored(9, None, None),
        ];
        let summary = summarize("GOOG", "Alphabet Inc.", &docs, Some(0.12));

        assert_eq!(summary.document_count, 3);
        assert_eq!(summary.earliest_date, NaiveDate::from_ymd_opt(2024, 3, 2));
        assert_eq!(summary.latest_date, NaiveDate::from_ymd_opt(2024, 3, 9));
        assert!((summary.title_sentiment_embedding_mean.unwrap() - 0.7).abs() < 1e-6);
        assert!((summary.article_sentiment_lexicon_mean.unwrap() + 0.2).abs() < 1e-6);
        assert_eq!(summary.annualized_return, Some(0.12));
    }

    #[test]
    fn no_documents_gives_empty_means() {
        let summary = summarize("GE", "GE", &[], None);
        assert_eq!(summary.document_count, 0);
        assert_eq!(summary.earliest_date, None);
        assert_eq!(summary.title_sentiment_lexicon_mean, None);
        assert_eq!(summary.article_sentiment_embedding_mean, None);
    }

    #[test]
    fn writes_summary_json_and_documents_csv() {
        let dir = tempfile::tempdir().unwrap();
        let docs = vec![scored(1, Some(0.5), None)];
        let summary = summarize("MSFT", "Microsoft", &docs, None);

        let json_path = write_summary(dir.path(), &summary).unwrap();
        assert!(json_path.ends_with("MSFT_summary.json"));
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value["ticker"], "MSFT");
        assert!(value["annualized_return"].is_null());
        assert!(value["article_sentiment_lexicon_mean"].is_null());
        assert_eq!(value["earliest_date"], "2024-03-01");

        let csv_path = write_documents(dir.path(), "MSFT", &docs).unwrap();
        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "date");
        assert_eq!(&headers[9], "article_content");
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][5], "0.5");
        assert_eq!(&rows[0][7], "");
        assert_eq!(&rows[0][9], r#"["Alphabet, Inc. rose"]"#);
    }
}
