//! Market data for return calculations: daily price bars from the Yahoo
//! Finance chart API or local CSV files, and a time-weighted total-return
//! calculator with dividend reinvestment.

mod chart;
pub mod client;
pub mod error;
pub mod history;
mod retry;
pub mod returns;
pub mod types;

pub use client::{YahooClient, YahooClientConfig};
pub use error::{MarketError, ReturnError};
pub use history::{load_price_bars, write_price_bars};
pub use returns::{annualized_return, total_return};
pub use types::{PriceBar, PriceHistory, ReinvestmentLot, TotalReturn};
