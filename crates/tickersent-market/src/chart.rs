//! Wire types for the Yahoo Finance v8 chart endpoint and their conversion
//! into [`PriceHistory`].

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

use crate::error::MarketError;
use crate::types::{PriceBar, PriceHistory};

#[derive(Debug, Deserialize)]
pub(crate) struct ChartEnvelope {
    pub(crate) chart: Chart,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Chart {
    #[serde(default)]
    pub(crate) result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub(crate) error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartApiError {
    #[serde(default)]
    pub(crate) code: String,
    #[serde(default)]
    pub(crate) description: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResult {
    pub(crate) meta: ChartMeta,
    #[serde(default)]
    pub(crate) timestamp: Vec<i64>,
    pub(crate) indicators: Indicators,
    #[serde(default)]
    pub(crate) events: Option<Events>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChartMeta {
    #[serde(default)]
    pub(crate) currency: Option<String>,
    #[serde(default)]
    pub(crate) long_name: Option<String>,
    #[serde(default)]
    pub(crate) short_name: Option<String>,
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    pub(crate) gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Indicators {
    #[serde(default)]
    pub(crate) quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Quote {
    #[serde(default)]
    pub(crate) open: Vec<Option<f64>>,
    #[serde(default)]
    pub(crate) close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Events {
    #[serde(default)]
    pub(crate) dividends: HashMap<String, DividendEvent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DividendEvent {
    pub(crate) amount: f64,
    pub(crate) date: i64,
}

/// Exchange-local trading date for a UTC timestamp.
fn trading_date(timestamp: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp.saturating_add(gmtoffset), 0).map(|dt| dt.date_naive())
}

/// Convert a chart response into bars ordered by date.
///
/// Rows with a missing open or close are dropped. Dividends are attached to
/// the bar of their trading date, or to the next bar when that date has no
/// bar. Duplicate dates keep the first row.
///
/// # Errors
///
/// Returns [`MarketError::Api`] when the response carries an error object
/// and [`MarketError::NoData`] when it carries no series.
pub(crate) fn into_history(
    symbol: &str,
    envelope: ChartEnvelope,
) -> Result<PriceHistory, MarketError> {
    if let Some(err) = envelope.chart.error {
        return Err(MarketError::Api(format!("{}: {}", err.code, err.description)));
    }
    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| MarketError::NoData(symbol.to_string()))?;

    let offset = result.meta.gmtoffset;
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut by_date: BTreeMap<NaiveDate, PriceBar> = BTreeMap::new();
    for (i, ts) in result.timestamp.iter().enumerate() {
        let open = quote.open.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let (Some(open), Some(close), Some(date)) = (open, close, trading_date(*ts, offset)) else {
            continue;
        };
        by_date
            .entry(date)
            .or_insert_with(|| PriceBar::new(date, open, close));
    }

    let dividends = result.events.map(|e| e.dividends).unwrap_or_default();
    for event in dividends.into_values() {
        let Some(date) = trading_date(event.date, offset) else {
            continue;
        };
        match by_date.range_mut(date..).next() {
            Some((_, bar)) => bar.dividends += event.amount,
            None => {
                tracing::debug!(symbol, %date, amount = event.amount, "dividend after last bar dropped");
            }
        }
    }

    Ok(PriceHistory {
        symbol: symbol.to_string(),
        company_name: result.meta.long_name.or(result.meta.short_name),
        currency: result.meta.currency,
        bars: by_date.into_values().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-05-09 13:30 UTC, 2024-05-10 13:30 UTC, 2024-05-13 13:30 UTC
    const SAMPLE: &str = r#"{
        "chart": {
            "result": [{
                "meta": {
                    "currency": "USD",
                    "symbol": "MSFT",
                    "longName": "Microsoft Corporation",
                    "shortName": "Microsoft Corp",
                    "gmtoffset": -14400
                },
                "timestamp": [1715261400, 1715347800, 1715607000],
                "events": {
                    "dividends": {
                        "1715347800": { "amount": 0.75, "date": 1715347800 }
                    }
                },
                "indicators": {
                    "quote": [{
                        "open": [412.0, 413.5, null],
                        "close": [412.3, 414.7, 413.0],
                        "volume": [1, 2, 3]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn converts_bars_and_attaches_dividends() {
        let envelope: ChartEnvelope = serde_json::from_str(SAMPLE).unwrap();
        let history = into_history("MSFT", envelope).unwrap();

        assert_eq!(history.company_name.as_deref(), Some("Microsoft Corporation"));
        assert_eq!(history.currency.as_deref(), Some("USD"));
        assert_eq!(history.bars.len(), 2, "row with null open is dropped");
        assert_eq!(history.bars[0].date, date(2024, 5, 9));
        assert_eq!(history.bars[1].date, date(2024, 5, 10));
        assert!((history.bars[1].dividends - 0.75).abs() < 1e-12);
        assert!(history.bars[0].dividends.abs() < 1e-12);
    }

    #[test]
    fn dividend_without_bar_moves_to_next_bar() {
        let json = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":0},
            "timestamp":[1704196800, 1704369600],
            "events":{"dividends":{"x":{"amount":1.5,"date":1704283200}}},
            "indicators":{"quote":[{"open":[10.0,11.0],"close":[10.5,11.5]}]}
        }],"error":null}}"#;
        let envelope: ChartEnvelope = serde_json::from_str(json).unwrap();
        let history = into_history("X", envelope).unwrap();
        assert_eq!(history.bars[1].date, date(2024, 1, 4));
        assert!((history.bars[1].dividends - 1.5).abs() < 1e-12);
        assert_eq!(history.company_name, None);
    }

    #[test]
    fn api_error_is_surfaced() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let envelope: ChartEnvelope = serde_json::from_str(json).unwrap();
        let err = into_history("NOPE", envelope).unwrap_err();
        assert!(matches!(err, MarketError::Api(msg) if msg.contains("delisted")));
    }

    #[test]
    fn empty_result_is_no_data() {
        let envelope: ChartEnvelope =
            serde_json::from_str(r#"{"chart":{"result":[],"error":null}}"#).unwrap();
        assert!(matches!(
            into_history("X", envelope),
            Err(MarketError::NoData(s)) if s == "X"
        ));
    }

    #[test]
    fn short_name_used_when_long_name_missing() {
        let json = r#"{"chart":{"result":[{
            "meta":{"shortName":"General Electric"},
            "timestamp":[],
            "indicators":{"quote":[]}
        }]}}"#;
        let envelope: ChartEnvelope = serde_json::from_str(json).unwrap();
        let history = into_history("GE", envelope).unwrap();
        assert_eq!(history.company_name.as_deref(), Some("General Electric"));
        assert!(history.bars.is_empty());
    }
}
