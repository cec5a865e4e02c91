//! `score` command: both strategies for one piece of text.

use anyhow::Context;
use tickersent_core::AppConfig;
use tickersent_sentiment::{polarity_scores, Embedder};

use crate::corpus::{load_embedded_corpus, tei_client};

const SHOWN_NEIGHBORS: usize = 5;

/// Print lexicon polarity and nearest-neighbor sentiment for `text`.
///
/// # Errors
///
/// Returns an error if the corpus cannot be loaded or the text cannot be
/// embedded.
pub(crate) async fn run_score(
    config: &AppConfig,
    text: &str,
    top_k: Option<usize>,
) -> anyhow::Result<()> {
    let k = top_k.unwrap_or(config.top_k);
    if k == 0 {
        anyhow::bail!("--top-k must be at least 1");
    }

    let polarity = polarity_scores(text);
    println!(
        "lexicon: compound {:+.4} (pos {:.3}, neg {:.3}, neu {:.3})",
        polarity.compound, polarity.positive, polarity.negative, polarity.neutral
    );
    if let Some(h) = polarity.harmonic_mean() {
        println!("lexicon harmonic mean: {h:.4}");
    }

    let corpus = load_embedded_corpus(config)?;
    let tei = tei_client(config)?;
    let embedding = tei
        .embed(&[text])
        .await
        .context("failed to embed text")?
        .into_iter()
        .next()
        .context("embedder returned no embedding")?;

    match corpus.neighbor_sentiment(&embedding, k)? {
        Some(result) => {
            println!(
                "embedding: {:+.4} ({}) from {} neighbors",
                result.score,
                result.label,
                result.neighbors.len()
            );
            for &index in result.neighbors.indices().iter().take(SHOWN_NEIGHBORS) {
                let label = corpus.labels()[index];
                let sentence = corpus.sentence(index).unwrap_or_default();
                println!("  [{label}] {sentence}");
            }
        }
        None => println!("embedding: no neighbors (empty text or corpus)"),
    }
    Ok(())
}
