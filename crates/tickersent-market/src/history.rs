//! Local CSV price files.

use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::MarketError;
use crate::types::PriceBar;

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(default, alias = "Dividends", deserialize_with = "csv::invalid_option")]
    dividends: Option<f64>,
}

/// Load daily bars from a CSV with `date, open, close` and an optional
/// `dividends` column. Header names may be lower-case or capitalized; other
/// columns are ignored. Missing or blank dividends read as zero.
///
/// Rows are returned in file order; ordering is validated by the return
/// calculator.
///
/// # Errors
///
/// Returns [`MarketError::Csv`] if the file cannot be read or a row does not
/// parse.
pub fn load_price_bars(path: &Path) -> Result<Vec<PriceBar>, MarketError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut bars = Vec::new();
    for row in reader.deserialize() {
        let row: PriceRow = row?;
        bars.push(PriceBar {
            date: row.date,
            open: row.open,
            close: row.close,
            dividends: row.dividends.unwrap_or(0.0),
        });
    }
    tracing::debug!(path = %path.display(), bars = bars.len(), "loaded price bars");
    Ok(bars)
}

/// Write bars in the format [`load_price_bars`] reads.
///
/// # Errors
///
/// Returns [`MarketError::Csv`] on write failure.
pub fn write_price_bars(path: &Path, bars: &[PriceBar]) -> Result<(), MarketError> {
    let mut writer = csv::Writer::from_path(path)?;
    for bar in bars {
        writer.serialize(bar)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
