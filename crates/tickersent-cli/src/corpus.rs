//! Labeled corpus commands and loaders shared by the scoring commands.

use std::path::PathBuf;

use anyhow::Context;
use tickersent_core::AppConfig;
use tickersent_sentiment::{load_sentences, sample_rows, LabeledCorpus, TeiClient};

pub(crate) fn tei_client(config: &AppConfig) -> anyhow::Result<TeiClient> {
    TeiClient::new(
        &config.tei_url,
        config.request_timeout_secs,
        &config.user_agent,
    )
    .context("failed to build TEI client")
}

/// Load the pre-embedded corpus written by `embed-corpus`.
pub(crate) fn load_embedded_corpus(config: &AppConfig) -> anyhow::Result<LabeledCorpus> {
    let path = &config.embedded_corpus_path;
    let corpus = LabeledCorpus::read_embedded(path).with_context(|| {
        format!(
            "failed to load embedded corpus from {}; run `tickersent embed-corpus` first",
            path.display()
        )
    })?;
    tracing::info!(
        path = %path.display(),
        sentences = corpus.len(),
        dim = corpus.dim(),
        "embedded corpus loaded"
    );
    Ok(corpus)
}

/// Embed the sentence corpus (optionally sampled) and write it to disk.
///
/// # Errors
///
/// Returns an error if the corpus cannot be read, embedding fails, or the
/// output cannot be written.
pub(crate) async fn run_embed_corpus(
    config: &AppConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    sample: Option<usize>,
) -> anyhow::Result<()> {
    let input = input.unwrap_or_else(|| config.corpus_path.clone());
    let output = output.unwrap_or_else(|| config.embedded_corpus_path.clone());
    let sample = sample.unwrap_or(config.corpus_sample);

    let rows = load_sentences(&input)
        .with_context(|| format!("failed to read sentence corpus {}", input.display()))?;
    let total = rows.len();
    let rows = sample_rows(rows, sample);
    tracing::info!(total, sampled = rows.len(), "embedding sentence corpus");

    let tei = tei_client(config)?;
    let corpus = LabeledCorpus::embed(rows, &tei)
        .await
        .context("failed to embed sentence corpus")?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    corpus
        .write_embedded(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "embedded {} of {} sentences (dim {}) -> {}",
        corpus.len(),
        total,
        corpus.dim(),
        output.display()
    );
    Ok(())
}
