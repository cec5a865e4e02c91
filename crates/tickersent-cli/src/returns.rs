//! `returns` command: dividend-reinvested return for one ticker.

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use tickersent_core::{validate_symbol, AppConfig};
use tickersent_market::{
    load_price_bars, total_return, write_price_bars, TotalReturn, YahooClient, YahooClientConfig,
};

pub(crate) fn yahoo_client(config: &AppConfig) -> anyhow::Result<YahooClient> {
    YahooClient::new(&YahooClientConfig {
        timeout_secs: config.request_timeout_secs,
        user_agent: config.user_agent.clone(),
        max_retries: config.max_retries,
        retry_backoff_base_ms: config.retry_backoff_base_ms,
    })
    .context("failed to build chart API client")
}

/// Compute and print the return breakdown from a local CSV or the chart API.
///
/// # Errors
///
/// Returns an error if prices cannot be loaded or the return is undefined
/// for the window.
pub(crate) async fn run_returns(
    config: &AppConfig,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    prices_csv: Option<&Path>,
    save_csv: Option<&Path>,
) -> anyhow::Result<()> {
    let symbol = validate_symbol(ticker).context("invalid ticker")?;
    let bars = if let Some(path) = prices_csv {
        load_price_bars(path).with_context(|| format!("failed to read {}", path.display()))?
    } else {
        let history = yahoo_client(config)?
            .fetch_history(&symbol, start, end)
            .await
            .with_context(|| format!("failed to fetch price history for {symbol}"))?;
        if let Some(name) = &history.company_name {
            println!("{symbol}: {name}");
        }
        history.bars
    };

    if let Some(path) = save_csv {
        write_price_bars(path, &bars)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), bars = bars.len(), "price bars saved");
    }

    let result = total_return(&bars, start, end)
        .with_context(|| format!("cannot compute return for {symbol} {start}..{end}"))?;
    print_breakdown(&symbol, &result);
    Ok(())
}

fn print_breakdown(symbol: &str, result: &TotalReturn) {
    println!("{symbol} {} .. {}", result.start, result.end);
    println!("  buy price:      {:.4}", result.buy_price);
    println!("  sell price:     {:.4}", result.sell_price);
    if result.final_bar_dividend > 0.0 {
        println!("    incl. final-day dividend {:.4}", result.final_bar_dividend);
    }
    for lot in &result.lots {
        println!(
            "  reinvested:     {:.6} shares @ {:.4} on {}",
            lot.shares, lot.price_per_share, lot.acquired
        );
    }
    println!("  total shares:   {:.6}", result.total_shares);
    println!("  proceeds:       {:.4}", result.proceeds);
    println!("  share-days:     {:.2}", result.share_days);
    println!("  annualized:     {:+.4}%", result.annualized * 100.0);
}
