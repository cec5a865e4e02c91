use chrono::NaiveDate;
use serde::Serialize;

use crate::document::DocumentSentiment;

/// One search result from the news feed, before its article is fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub date: NaiveDate,
    pub title: String,
    /// Link as published in the feed (often a redirect).
    pub link: String,
}

/// A news article reduced to the parts that get scored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsDocument {
    pub date: NaiveDate,
    pub title: String,
    pub link: String,
    /// Publisher URL resolved from the article page, if any.
    pub canonical_url: Option<String>,
    /// Paragraphs mentioning at least one query term. Empty when the article
    /// could not be fetched or nothing matched.
    pub paragraphs: Vec<String>,
}

/// A document together with its scores from both strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub document: NewsDocument,
    pub sentiment: DocumentSentiment,
}

/// Settings for the Google News collaborator.
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub lang: String,
    pub country: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_articles: usize,
    pub max_concurrent_articles: usize,
}

/// Settings for the Reddit collaborator.
#[derive(Debug, Clone)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Rising posts kept per subreddit.
    pub max_posts: usize,
    pub max_concurrent_posts: usize,
}
