//! Text collection: Google News search plus article fetching, and Reddit
//! rising posts with their comments.

mod article;
mod google_news;
mod reddit;

pub use article::{canonical_url, extract_paragraphs};
pub use reddit::RedditClient;

use std::time::Duration;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::error::SentimentError;
use crate::types::{NewsConfig, NewsDocument, NewsItem};

const GOOGLE_NEWS_RSS_URL: &str = "https://news.google.com/rss";

/// Google News RSS client.
#[derive(Debug, Clone)]
pub struct GoogleNews {
    client: reqwest::Client,
    base_url: String,
    config: NewsConfig,
}

impl GoogleNews {
    /// Creates a client against the public Google News RSS endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn new(config: NewsConfig) -> Result<Self, SentimentError> {
        Self::with_base_url(config, GOOGLE_NEWS_RSS_URL)
    }

    /// Creates a client with a custom base URL (used in tests).
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(config: NewsConfig, base_url: &str) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    /// Search URL for `query`, restricted to `[from, to]` with the
    /// `after:`/`before:` operators when given.
    #[must_use]
    pub fn search_url(&self, query: &str, from: Option<NaiveDate>, to: Option<NaiveDate>) -> String {
        let mut full_query = query.trim().to_string();
        if let Some(from) = from {
            full_query.push_str(&format!(" after:{}", from.format("%Y-%m-%d")));
        }
        if let Some(to) = to {
            full_query.push_str(&format!(" before:{}", to.format("%Y-%m-%d")));
        }
        let encoded = utf8_percent_encode(&full_query, NON_ALPHANUMERIC);
        let lang = &self.config.lang;
        let country = &self.config.country;
        format!(
            "{}/search?q={encoded}&hl={lang}-{country}&gl={country}&ceid={country}:{lang}",
            self.base_url
        )
    }

    /// Run a search and return at most `max_articles` items in feed order.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] on network failure or a non-success
    /// status, or [`SentimentError::Xml`] on a malformed feed.
    pub async fn search(
        &self,
        query: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<NewsItem>, SentimentError> {
        let url = self.search_url(query, from, to);
        tracing::debug!(%url, "searching Google News");
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let mut items = google_news::parse_rss_feed(&body)?;
        items.truncate(self.config.max_articles);
        Ok(items)
    }

    /// Search, then fetch every article and keep the paragraphs that mention
    /// one of `query_terms`.
    ///
    /// Articles are fetched with bounded concurrency. A failed fetch yields a
    /// document with no paragraphs rather than an error. Documents are
    /// returned ordered by date, then link.
    ///
    /// # Errors
    ///
    /// Returns an error only when the search itself fails.
    pub async fn collect_documents(
        &self,
        query: &str,
        query_terms: &[String],
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<NewsDocument>, SentimentError> {
        let items = self.search(query, from, to).await?;
        tracing::info!(query, items = items.len(), "news search complete");

        let mut documents: Vec<NewsDocument> = stream::iter(items)
            .map(|item| self.fetch_document(item, query_terms))
            .buffer_unordered(self.config.max_concurrent_articles.max(1))
            .collect()
            .await;
        documents.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.link.cmp(&b.link)));
        Ok(documents)
    }

    /// Resolve and fetch one article. Never fails: problems are logged and
    /// leave the paragraph list empty.
    pub async fn fetch_document(&self, item: NewsItem, query_terms: &[String]) -> NewsDocument {
        let mut document = NewsDocument {
            date: item.date,
            title: item.title,
            link: item.link,
            canonical_url: None,
            paragraphs: Vec::new(),
        };

        let landing = match self.fetch_html(&document.link).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(url = %document.link, error = %e, "article fetch failed");
                return document;
            }
        };

        document.canonical_url = canonical_url(&landing);
        let html = match document.canonical_url.as_deref() {
            Some(url) if url.starts_with("http") && url != document.link => {
                match self.fetch_html(url).await {
                    Ok(html) => html,
                    Err(e) => {
                        tracing::warn!(url, error = %e, "canonical article fetch failed");
                        return document;
                    }
                }
            }
            _ => landing,
        };

        document.paragraphs = extract_paragraphs(&html, query_terms);
        tracing::debug!(
            url = %document.link,
            paragraphs = document.paragraphs.len(),
            "article processed"
        );
        document
    }

    async fn fetch_html(&self, url: &str) -> Result<String, SentimentError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}
