//! HTTP client for the Yahoo Finance chart API.
//!
//! One request per symbol returns daily open/close bars plus dividend events
//! for the requested window. Transient failures are retried with back-off.

use std::time::Duration;

use chrono::{Days, NaiveDate};
use reqwest::{Client, Url};

use crate::chart::{into_history, ChartEnvelope};
use crate::error::MarketError;
use crate::retry::{check_status, retry_with_backoff};
use crate::types::PriceHistory;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com/";

/// Retry and transport settings for [`YahooClient`].
#[derive(Debug, Clone)]
pub struct YahooClientConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

/// Client for the Yahoo Finance v8 chart endpoint.
///
/// Use [`YahooClient::new`] for production or [`YahooClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    retry_backoff_base_ms: u64,
}

impl YahooClient {
    /// # Errors
    ///
    /// Returns [`MarketError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &YahooClientConfig) -> Result<Self, MarketError> {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`MarketError::InvalidBaseUrl`] if
    /// `base_url` is not a valid base URL.
    pub fn with_base_url(config: &YahooClientConfig, base_url: &str) -> Result<Self, MarketError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| MarketError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(MarketError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    /// Daily bars with dividends for `symbol` between `start` and `end`
    /// inclusive, in exchange-local trading dates.
    ///
    /// # Errors
    ///
    /// - [`MarketError::InvalidRange`] if `end < start`.
    /// - [`MarketError::Http`] on network failure, or
    ///   [`MarketError::Unavailable`] on a 429/5xx status, once retries are
    ///   exhausted.
    /// - [`MarketError::Api`] / [`MarketError::NoData`] if Yahoo has no
    ///   series for the symbol.
    /// - [`MarketError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn fetch_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceHistory, MarketError> {
        if end < start {
            return Err(MarketError::InvalidRange { start, end });
        }
        let url = self.chart_url(symbol, start, end)?;
        tracing::debug!(symbol, %url, "fetching price history");

        let envelope = retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || {
            self.request_chart(&url)
        })
        .await?;

        let mut history = into_history(symbol, envelope)?;
        // The exchange offset can shift a boundary bar outside the window.
        history.bars.retain(|b| b.date >= start && b.date <= end);
        tracing::info!(
            symbol,
            bars = history.bars.len(),
            dividends = history.bars.iter().filter(|b| b.dividends > 0.0).count(),
            "price history fetched"
        );
        Ok(history)
    }

    pub(crate) fn chart_url(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Url, MarketError> {
        let period1 = start.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp());
        let period2 = end
            .checked_add_days(Days::new(1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp());
        let (Some(period1), Some(period2)) = (period1, period2) else {
            return Err(MarketError::InvalidRange { start, end });
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| MarketError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("period1", &period1.to_string())
            .append_pair("period2", &period2.to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "div");
        Ok(url)
    }

    /// Sends one chart request. Other non-success statuses are reported from
    /// the error object in the body when there is one.
    async fn request_chart(&self, url: &Url) -> Result<ChartEnvelope, MarketError> {
        let response = check_status(self.client.get(url.clone()).send().await?)?;
        let status = response.status();
        let body = response.text().await?;
        match serde_json::from_str::<ChartEnvelope>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(MarketError::Api(format!(
                "chart request returned {status}"
            ))),
            Err(e) => Err(MarketError::Deserialize {
                context: url.to_string(),
                source: e,
            }),
        }
    }
}
