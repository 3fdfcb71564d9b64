// Embedding pipeline: turn a dataset file into a stored embedding run.
//
// Exactly one provider request per run. If it fails (HTTP error, timeout,
// wrong count or width) nothing is written and the previously stored run,
// if any, stays as it was.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::dataset::{loader, sample};
use crate::db::models::RunMeta;
use crate::db::Database;
use crate::embeddings::{EmbeddingProvider, EmbeddingStore};

/// Parameters of an embedding run.
#[derive(Debug, Clone)]
pub struct EmbedOptions {
    pub model: String,
    /// Required vector width; `None` accepts whatever the provider returns
    /// as long as it is consistent.
    pub expected_dim: Option<usize>,
    pub sample_size: usize,
    pub seed: u64,
}

/// Load, filter, sample, embed, and store.
///
/// Returns the stored metadata and the store that was written.
pub async fn run(
    provider: &dyn EmbeddingProvider,
    db: &dyn Database,
    source: &Path,
    options: &EmbedOptions,
) -> Result<(RunMeta, EmbeddingStore)> {
    let records = loader::load_records(source)?;
    if records.is_empty() {
        anyhow::bail!(
            "No English records with a non-empty overview in {}",
            source.display()
        );
    }

    let filtered = records.len();
    let records = sample::sample_records(records, options.sample_size, options.seed);
    println!(
        "Sampled {} of {} English records (seed {}).",
        records.len(),
        filtered,
        options.seed
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} {msg} [{elapsed}]")
            .expect("valid template"),
    );
    pb.set_message(format!(
        "Embedding {} texts with {}",
        records.len(),
        options.model
    ));
    pb.enable_steady_tick(Duration::from_millis(120));

    let store = EmbeddingStore::build(provider, &options.model, records, options.expected_dim).await;
    pb.finish_and_clear();
    let store = store.context("Embedding request failed")?;

    let meta = RunMeta {
        model: options.model.clone(),
        dimension: store.dim(),
        sample_size: options.sample_size,
        seed: options.seed,
        source: source.display().to_string(),
        embedded_at: chrono::Utc::now().to_rfc3339(),
    };

    db.save_run(&meta, &store).await?;

    info!(
        records = store.len(),
        dim = store.dim(),
        model = %meta.model,
        "Stored embedding run"
    );

    Ok((meta, store))
}
