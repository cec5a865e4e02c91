mod analyze;
mod corpus;
mod returns;
mod score;
mod trending;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tickersent")]
#[command(about = "Correlate ticker news sentiment with realized market returns")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Score news sentiment and annualized return for configured tickers
    Analyze {
        /// Restrict the run to a single ticker symbol
        #[arg(long)]
        ticker: Option<String>,

        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last day of the window, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Print the tickers and window without fetching anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Embed the labeled sentence corpus once and save it for later runs
    EmbedCorpus {
        /// Sentence corpus CSV (defaults to `TICKERSENT_CORPUS_PATH`)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Embedded corpus output (defaults to `TICKERSENT_EMBEDDED_CORPUS_PATH`)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Rows to sample before embedding, 0 for all (defaults to `TICKERSENT_CORPUS_SAMPLE`)
        #[arg(long)]
        sample: Option<usize>,
    },
    /// Score one piece of text with both strategies
    Score {
        text: String,

        /// Neighbors to consult (defaults to `TICKERSENT_TOP_K`)
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Compute the dividend-reinvested annualized return for a ticker
    Returns {
        ticker: String,

        #[arg(long)]
        start: NaiveDate,

        #[arg(long)]
        end: NaiveDate,

        /// Read prices from a local CSV instead of the chart API
        #[arg(long, conflicts_with = "save_csv")]
        prices_csv: Option<PathBuf>,

        /// Save the fetched price bars to a CSV file
        #[arg(long)]
        save_csv: Option<PathBuf>,
    },
    /// Score rising Reddit threads and summarize configured ticker mentions
    Trending {
        /// Subreddits to poll (defaults to `TICKERSENT_SUBREDDITS`)
        subreddits: Vec<String>,
    },
}

fn init_tracing(config: &tickersent_core::AppConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = tickersent_core::load_app_config()?;
    init_tracing(&config)?;
    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Some(Commands::Analyze {
            ticker,
            start,
            end,
            dry_run,
        }) => analyze::run_analyze(&config, ticker.as_deref(), start, end, dry_run).await,
        Some(Commands::EmbedCorpus {
            input,
            output,
            sample,
        }) => corpus::run_embed_corpus(&config, input, output, sample).await,
        Some(Commands::Score { text, top_k }) => score::run_score(&config, &text, top_k).await,
        Some(Commands::Returns {
            ticker,
            start,
            end,
            prices_csv,
            save_csv,
        }) => {
            returns::run_returns(
                &config,
                &ticker,
                start,
                end,
                prices_csv.as_deref(),
                save_csv.as_deref(),
            )
            .await
        }
        Some(Commands::Trending { subreddits }) => {
            trending::run_trending(&config, subreddits).await
        }
        None => {
            println!("tickersent: no command given (see --help)");
            Ok(())
        }
    }
}
