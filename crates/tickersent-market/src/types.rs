use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day. Prices are split-adjusted; `dividends` is the cash
/// dividend per share paid on this date (zero on most days).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    #[serde(default)]
    pub dividends: f64,
}

impl PriceBar {
    #[must_use]
    pub fn new(date: NaiveDate, open: f64, close: f64) -> Self {
        Self {
            date,
            open,
            close,
            dividends: 0.0,
        }
    }

    #[must_use]
    pub fn with_dividend(mut self, amount: f64) -> Self {
        self.dividends = amount;
        self
    }
}

/// Daily bars for one symbol, ordered by date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub company_name: Option<String>,
    pub currency: Option<String>,
    pub bars: Vec<PriceBar>,
}

/// Fractional shares bought by reinvesting one dividend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReinvestmentLot {
    pub acquired: NaiveDate,
    pub price_per_share: f64,
    pub shares: f64,
}

/// Breakdown of a buy-and-hold position with dividends reinvested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalReturn {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub buy_price: f64,
    /// Close of the last bar, plus any dividend paid on that bar.
    pub sell_price: f64,
    pub final_bar_dividend: f64,
    pub lots: Vec<ReinvestmentLot>,
    pub total_shares: f64,
    pub proceeds: f64,
    pub share_days: f64,
    pub annualized: f64,
}
