//! Time-weighted annualized return with dividend reinvestment.
//!
//! Model: buy one share at the open of the first bar on or after `start`,
//! sell everything at the close of the last bar on or before `end`. Each
//! dividend buys fractional shares at the next bar's open. A dividend paid on
//! the final bar cannot be reinvested and is added to the sell price instead.
//!
//! The initial share is held for the full `end - start` days; each lot only
//! from its acquisition date to `end`. The annualization exponent uses the
//! share-weighted sum of those holding periods:
//!
//! ```text
//! annualized = (proceeds / buy_price) ^ (365 / share_days) - 1
//! ```

use chrono::NaiveDate;

use crate::error::ReturnError;
use crate::types::{PriceBar, ReinvestmentLot, TotalReturn};

const DAYS_PER_YEAR: f64 = 365.0;

/// Compute the full return breakdown for `bars` over `[start, end]`.
///
/// `bars` must be in strictly increasing date order; bars outside the range
/// are ignored. Zero dividends everywhere is the plain price return.
///
/// # Errors
///
/// - [`ReturnError::InvalidRange`] if `end < start`.
/// - [`ReturnError::UnorderedSeries`] if dates are not strictly increasing.
/// - [`ReturnError::EmptyRange`] if no bar falls inside the range.
/// - [`ReturnError::NonPositivePrice`] if the buy price, or the open used to
///   reinvest a dividend, is zero, negative, or NaN.
/// - [`ReturnError::ZeroHoldingPeriod`] if the position is held for zero
///   share-days (`start == end`).
/// - [`ReturnError::NonFinite`] if the result is not a finite number.
pub fn total_return(
    bars: &[PriceBar],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<TotalReturn, ReturnError> {
    if end < start {
        return Err(ReturnError::InvalidRange { start, end });
    }
    if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
        return Err(ReturnError::UnorderedSeries {
            previous: pair[0].date,
            next: pair[1].date,
        });
    }

    let lo = bars.partition_point(|b| b.date < start);
    let hi = bars.partition_point(|b| b.date <= end);
    let window = &bars[lo..hi];
    let (Some(first), Some(last)) = (window.first(), window.last()) else {
        return Err(ReturnError::EmptyRange { start, end });
    };

    let buy_price = positive_price(first.date, first.open)?;

    let mut lots = Vec::new();
    let mut final_bar_dividend = 0.0;
    for (i, bar) in window.iter().enumerate() {
        if bar.dividends <= 0.0 {
            continue;
        }
        match window.get(i + 1) {
            Some(next) => {
                let price = positive_price(next.date, next.open)?;
                lots.push(ReinvestmentLot {
                    acquired: next.date,
                    price_per_share: price,
                    shares: bar.dividends / price,
                });
            }
            None => final_bar_dividend += bar.dividends,
        }
    }

    let sell_price = last.close + final_bar_dividend;
    let total_shares = 1.0 + lots.iter().map(|lot| lot.shares).sum::<f64>();
    let proceeds = total_shares * sell_price;

    let share_days = days_between(start, end)
        + lots
            .iter()
            .map(|lot| lot.shares * days_between(lot.acquired, end))
            .sum::<f64>();
    if share_days <= 0.0 {
        return Err(ReturnError::ZeroHoldingPeriod);
    }

    let annualized = (proceeds / buy_price).powf(DAYS_PER_YEAR / share_days) - 1.0;
    if !annualized.is_finite() {
        return Err(ReturnError::NonFinite);
    }

    Ok(TotalReturn {
        start,
        end,
        buy_price,
        sell_price,
        final_bar_dividend,
        lots,
        total_shares,
        proceeds,
        share_days,
        annualized,
    })
}

/// Annualized rate only. See [`total_return`].
///
/// # Errors
///
/// Same as [`total_return`].
pub fn annualized_return(
    bars: &[PriceBar],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<f64, ReturnError> {
    total_return(bars, start, end).map(|r| r.annualized)
}

fn positive_price(date: NaiveDate, price: f64) -> Result<f64, ReturnError> {
    if price.is_nan() || price <= 0.0 {
        return Err(ReturnError::NonPositivePrice { date, price });
    }
    Ok(price)
}

#[allow(clippy::cast_precision_loss)]
fn days_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn start() -> NaiveDate {
        date(2023, 1, 1)
    }

    fn end() -> NaiveDate {
        date(2024, 1, 1)
    }

    fn close_enough(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn plain_price_return_over_one_year() {
        let bars = [
            PriceBar::new(start(), 100.0, 101.0),
            PriceBar::new(date(2023, 6, 1), 104.0, 105.0),
            PriceBar::new(end(), 109.0, 110.0),
        ];
        let result = total_return(&bars, start(), end()).unwrap();
        assert!(close_enough(result.annualized, 0.10));
        assert!(close_enough(result.share_days, 365.0));
        assert!(result.lots.is_empty());
        assert!(close_enough(result.total_shares, 1.0));
    }

    #[test]
    fn dividend_is_reinvested_at_next_open() {
        let dividend_day = start() + Duration::days(99);
        let next_day = start() + Duration::days(100);
        let bars = [
            PriceBar::new(start(), 100.0, 100.0),
            PriceBar::new(dividend_day, 55.0, 52.0).with_dividend(5.0),
            PriceBar::new(next_day, 50.0, 51.0),
            PriceBar::new(end(), 108.0, 110.0),
        ];
        let result = total_return(&bars, start(), end()).unwrap();

        assert_eq!(result.lots.len(), 1);
        let lot = result.lots[0];
        assert_eq!(lot.acquired, next_day);
        assert!(close_enough(lot.price_per_share, 50.0));
        assert!(close_enough(lot.shares, 0.1));
        assert!(close_enough(result.total_shares, 1.1));
        assert!(close_enough(result.proceeds, 1.1 * 110.0));
        assert!(close_enough(result.share_days, 365.0 + 0.1 * 265.0));

        let expected = (121.0_f64 / 100.0).powf(365.0 / 391.5) - 1.0;
        assert!(close_enough(result.annualized, expected));
        assert!(result.annualized < 0.21);
    }

    #[test]
    fn final_bar_dividend_is_added_to_sell_price() {
        let bars = [
            PriceBar::new(start(), 100.0, 100.0),
            PriceBar::new(end(), 108.0, 108.0).with_dividend(2.0),
        ];
        let result = total_return(&bars, start(), end()).unwrap();
        assert!(result.lots.is_empty());
        assert!(close_enough(result.final_bar_dividend, 2.0));
        assert!(close_enough(result.sell_price, 110.0));
        assert!(close_enough(result.proceeds, 110.0));
        assert!(close_enough(result.annualized, 0.10));
    }

    #[test]
    fn dividend_followed_only_by_out_of_range_bar_counts_as_final() {
        let bars = [
            PriceBar::new(start(), 100.0, 100.0),
            PriceBar::new(end(), 108.0, 108.0).with_dividend(2.0),
            PriceBar::new(date(2024, 1, 2), 50.0, 50.0),
        ];
        let result = total_return(&bars, start(), end()).unwrap();
        assert!(result.lots.is_empty());
        assert!(close_enough(result.sell_price, 110.0));
    }

    #[test]
    fn bars_outside_range_are_ignored() {
        let bars = [
            PriceBar::new(date(2022, 12, 30), 1.0, 1.0),
            PriceBar::new(date(2023, 1, 3), 100.0, 100.0),
            PriceBar::new(date(2023, 12, 29), 110.0, 110.0),
            PriceBar::new(date(2024, 1, 2), 500.0, 500.0),
        ];
        let result = total_return(&bars, start(), end()).unwrap();
        assert!(close_enough(result.buy_price, 100.0));
        assert!(close_enough(result.sell_price, 110.0));
        // Holding period is the requested range, not the first/last bar dates.
        assert!(close_enough(result.annualized, 0.10));
    }

    #[test]
    fn empty_range_is_an_error() {
        let bars = [PriceBar::new(date(2022, 6, 1), 100.0, 100.0)];
        assert_eq!(
            total_return(&bars, start(), end()),
            Err(ReturnError::EmptyRange {
                start: start(),
                end: end()
            })
        );
        assert!(matches!(
            total_return(&[], start(), end()),
            Err(ReturnError::EmptyRange { .. })
        ));
    }

    #[test]
    fn zero_buy_price_is_an_error() {
        let bars = [
            PriceBar::new(start(), 0.0, 1.0),
            PriceBar::new(end(), 2.0, 2.0),
        ];
        assert!(matches!(
            total_return(&bars, start(), end()),
            Err(ReturnError::NonPositivePrice { price, .. }) if price == 0.0
        ));
    }

    #[test]
    fn zero_reinvestment_open_is_an_error() {
        let bars = [
            PriceBar::new(start(), 100.0, 100.0).with_dividend(1.0),
            PriceBar::new(date(2023, 1, 2), 0.0, 100.0),
            PriceBar::new(end(), 100.0, 100.0),
        ];
        assert!(matches!(
            total_return(&bars, start(), end()),
            Err(ReturnError::NonPositivePrice { date: d, .. }) if d == date(2023, 1, 2)
        ));
    }

    #[test]
    fn unordered_series_is_rejected() {
        let bars = [
            PriceBar::new(date(2023, 3, 1), 100.0, 100.0),
            PriceBar::new(date(2023, 2, 1), 100.0, 100.0),
        ];
        assert!(matches!(
            total_return(&bars, start(), end()),
            Err(ReturnError::UnorderedSeries { .. })
        ));
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let bars = [
            PriceBar::new(date(2023, 3, 1), 100.0, 100.0),
            PriceBar::new(date(2023, 3, 1), 101.0, 101.0),
        ];
        assert!(matches!(
            total_return(&bars, start(), end()),
            Err(ReturnError::UnorderedSeries { .. })
        ));
    }

    #[test]
    fn end_before_start_is_rejected() {
        assert!(matches!(
            total_return(&[], end(), start()),
            Err(ReturnError::InvalidRange { .. })
        ));
    }

    #[test]
    fn single_day_range_has_zero_holding_period() {
        let bars = [PriceBar::new(start(), 100.0, 101.0)];
        assert_eq!(
            total_return(&bars, start(), start()),
            Err(ReturnError::ZeroHoldingPeriod)
        );
    }

    #[test]
    fn negative_sell_price_is_non_finite() {
        let half_year = date(2023, 7, 1);
        let bars = [
            PriceBar::new(start(), 100.0, 100.0),
            PriceBar::new(half_year, 100.0, -5.0),
        ];
        assert_eq!(
            total_return(&bars, start(), half_year),
            Err(ReturnError::NonFinite)
        );
    }

    #[test]
    fn annualized_return_matches_breakdown() {
        let bars = [
            PriceBar::new(start(), 100.0, 100.0),
            PriceBar::new(end(), 120.0, 121.0),
        ];
        let rate = annualized_return(&bars, start(), end()).unwrap();
        assert!(close_enough(rate, 0.21));
    }
}
