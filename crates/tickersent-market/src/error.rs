use chrono::NaiveDate;
use thiserror::Error;

/// Errors returned by the market-data collaborators.
#[derive(Debug, Error)]
pub enum MarketError {
    /// Network or TLS failure from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The chart API is rate limiting (429) or failing (5xx).
    #[error("chart API unavailable: status {status}")]
    Unavailable { status: u16 },

    /// The chart API answered with an error object or a non-success status.
    #[error("chart API error: {0}")]
    Api(String),

    /// The chart API answered but had no series for the symbol.
    #[error("no price data returned for {0}")]
    NoData(String),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Reasons a total return cannot be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReturnError {
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("price series is not in strictly increasing date order ({previous} then {next})")]
    UnorderedSeries { previous: NaiveDate, next: NaiveDate },

    #[error("no price bars between {start} and {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },

    #[error("non-positive price {price} on {date}")]
    NonPositivePrice { date: NaiveDate, price: f64 },

    #[error("holding period is zero share-days")]
    ZeroHoldingPeriod,

    #[error("annualized return is not a finite number")]
    NonFinite,
}
