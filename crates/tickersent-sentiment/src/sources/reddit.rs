//! Reddit rising-post collector (client-credentials OAuth).
//!
//! Each rising post of a subreddit becomes one [`NewsDocument`]: the post
//! title is the title and its top-level comments are the paragraphs, so the
//! same scoring path handles news articles and forum threads.

use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use futures::stream::{self, StreamExt};
use serde::Deserialize;

use crate::error::SentimentError;
use crate::types::{NewsDocument, RedditConfig};

const REDDIT_AUTH_URL: &str = "https://www.reddit.com";
const REDDIT_API_URL: &str = "https://oauth.reddit.com";
const REDDIT_WEB_URL: &str = "https://reddit.com";
const MAX_COMMENTS_PER_POST: usize = 100;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Thing>,
}

/// A listing entry: `t3` for posts, `t1` for comments, `more` for the
/// "load more comments" stub.
#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    data: ThingData,
}

#[derive(Debug, Default, Deserialize)]
struct ThingData {
    id: Option<String>,
    title: Option<String>,
    body: Option<String>,
    permalink: Option<String>,
    created_utc: Option<f64>,
    #[serde(default)]
    stickied: bool,
}

/// A rising post before its comments are fetched.
#[derive(Debug, Clone, PartialEq)]
struct RisingPost {
    id: String,
    title: String,
    link: String,
    date: NaiveDate,
}

/// Reddit API client holding an application-only access token.
#[derive(Debug, Clone)]
pub struct RedditClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
    config: RedditConfig,
}

impl RedditClient {
    /// Exchange the configured client credentials for an access token.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Reddit`] if the token exchange is rejected,
    /// or [`SentimentError::Http`] on network failure.
    pub async fn connect(config: RedditConfig) -> Result<Self, SentimentError> {
        Self::connect_with_base_urls(config, REDDIT_AUTH_URL, REDDIT_API_URL).await
    }

    /// Like [`RedditClient::connect`], against custom auth and API hosts
    /// (used in tests).
    ///
    /// # Errors
    ///
    /// See [`RedditClient::connect`].
    pub async fn connect_with_base_urls(
        config: RedditConfig,
        auth_url: &str,
        api_url: &str,
    ) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        let token = fetch_token(&client, auth_url.trim_end_matches('/'), &config).await?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            config,
        })
    }

    /// Rising posts of `subreddit` as documents, in listing order.
    ///
    /// Comments are fetched with bounded concurrency. A post whose comments
    /// cannot be fetched keeps its title with no paragraphs.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::Reddit`] if the subreddit name is invalid or
    /// the listing request fails.
    pub async fn collect_documents(
        &self,
        subreddit: &str,
    ) -> Result<Vec<NewsDocument>, SentimentError> {
        let subreddit = validate_subreddit(subreddit)?;
        let posts = self.rising_posts(subreddit).await?;
        tracing::info!(subreddit, posts = posts.len(), "fetched rising posts");

        let documents: Vec<NewsDocument> = stream::iter(posts)
            .map(|post| self.post_document(subreddit, post))
            .buffered(self.config.max_concurrent_posts.max(1))
            .collect()
            .await;
        Ok(documents)
    }

    async fn rising_posts(&self, subreddit: &str) -> Result<Vec<RisingPost>, SentimentError> {
        let url = format!("{}/r/{subreddit}/rising", self.api_url);
        let listing: Listing = self
            .get_json(&url, &[("limit", self.config.max_posts.to_string())])
            .await?;
        let mut posts: Vec<RisingPost> = listing
            .data
            .children
            .into_iter()
            .filter(|thing| thing.kind == "t3")
            .filter_map(|thing| to_rising_post(thing.data))
            .collect();
        posts.truncate(self.config.max_posts);
        Ok(posts)
    }

    async fn post_document(&self, subreddit: &str, post: RisingPost) -> NewsDocument {
        let paragraphs = match self.top_level_comments(subreddit, &post.id).await {
            Ok(comments) => comments,
            Err(e) => {
                tracing::warn!(subreddit, post = %post.id, error = %e, "comment fetch failed");
                Vec::new()
            }
        };
        NewsDocument {
            date: post.date,
            title: post.title,
            link: post.link,
            canonical_url: None,
            paragraphs,
        }
    }

    async fn top_level_comments(
        &self,
        subreddit: &str,
        post_id: &str,
    ) -> Result<Vec<String>, SentimentError> {
        let url = format!("{}/r/{subreddit}/comments/{post_id}", self.api_url);
        // The response is `[post listing, comment listing]`.
        let listings: Vec<Listing> = self
            .get_json(
                &url,
                &[
                    ("depth", "1".to_string()),
                    ("limit", MAX_COMMENTS_PER_POST.to_string()),
                ],
            )
            .await?;
        let comments = listings
            .into_iter()
            .nth(1)
            .map(|listing| comment_bodies(listing.data.children))
            .unwrap_or_default();
        Ok(comments)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, SentimentError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(params)
            .query(&[("raw_json", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SentimentError::Reddit(format!(
                "request to {url} failed with status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SentimentError::Reddit(format!("response parse error: {e}")))
    }
}

async fn fetch_token(
    client: &reqwest::Client,
    auth_url: &str,
    config: &RedditConfig,
) -> Result<String, SentimentError> {
    let response = client
        .post(format!("{auth_url}/api/v1/access_token"))
        .basic_auth(&config.client_id, Some(&config.client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(SentimentError::Reddit(format!(
            "token exchange failed with status {}",
            response.status()
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| SentimentError::Reddit(format!("token parse error: {e}")))?;
    Ok(token.access_token)
}

/// Subreddit names are 2-21 ASCII letters, digits or underscores.
fn validate_subreddit(name: &str) -> Result<&str, SentimentError> {
    let name = name.trim().trim_start_matches("r/");
    let valid = (2..=21).contains(&name.len())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(SentimentError::Reddit(format!(
            "invalid subreddit name '{name}'"
        )))
    }
}

fn to_rising_post(data: ThingData) -> Option<RisingPost> {
    let id = data.id?;
    let title = data.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
    #[allow(clippy::cast_possible_truncation)]
    let date = DateTime::from_timestamp(data.created_utc? as i64, 0)?.date_naive();
    let link = match data.permalink {
        Some(permalink) => format!("{REDDIT_WEB_URL}{permalink}"),
        None => format!("{REDDIT_WEB_URL}/comments/{id}"),
    };
    Some(RisingPost {
        id,
        title,
        link,
        date,
    })
}

/// Bodies of top-level comments, skipping pinned moderator comments and
/// removed content.
fn comment_bodies(children: Vec<Thing>) -> Vec<String> {
    children
        .into_iter()
        .filter(|thing| thing.kind == "t1" && !thing.data.stickied)
        .filter_map(|thing| thing.data.body)
        .map(|body| body.trim().to_string())
        .filter(|body| !body.is_empty() && body != "[deleted]" && body != "[removed]")
        .collect()
}
