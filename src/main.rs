use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use dreadmap::config::Config;
use dreadmap::db::models::RunMeta;
use dreadmap::embeddings::EmbeddingStore;
use dreadmap::similarity::ZeroVectorPolicy;

/// dreadmap: embedding similarity and PCA for horror-movie descriptions.
///
/// Embeds a seeded sample of movie overviews with one API request, then
/// ranks nearest neighbors and projects the sample onto its principal
/// components.
#[derive(Parser)]
#[command(name = "dreadmap", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Download the horror-movies dataset (~20 MB)
    DownloadDataset,

    /// Sample the dataset and embed it (one API request)
    Embed {
        /// Dataset file (CSV or JSON); defaults to the downloaded copy
        #[arg(long)]
        input: Option<PathBuf>,

        /// Number of records to sample (default: DREADMAP_SAMPLE_SIZE or 1000)
        #[arg(long)]
        sample: Option<usize>,

        /// Sampling seed (default: DREADMAP_SEED or 42)
        #[arg(long)]
        seed: Option<u64>,

        /// Re-embed even if a run is already stored
        #[arg(long)]
        refresh: bool,
    },

    /// Show the records most similar to one record
    Similar {
        /// Record id, or #POSITION for a position in the sample
        record: String,

        /// Number of neighbors to show (default: 5)
        #[arg(short, long, default_value = "5")]
        k: usize,

        /// How to treat zero-length embeddings
        #[arg(long, value_enum, default_value = "reject")]
        zero_vectors: ZeroVectorPolicy,
    },

    /// Project the sample onto its principal components
    Project {
        /// Number of components (default: 2)
        #[arg(short, long, default_value = "2")]
        k: usize,

        /// Skip mean-centering
        #[arg(long)]
        no_center: bool,

        /// Seed for the randomized decomposition (default: 42)
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Where to write the projection table
        #[arg(long, default_value = "projection.csv")]
        out: PathBuf,
    },

    /// Rank neighbors for every record and project, writing both artifacts
    Analyze {
        /// Neighbors per record (default: 10)
        #[arg(short, long, default_value = "10")]
        k: usize,

        /// Principal components (default: 2)
        #[arg(long, default_value = "2")]
        components: usize,

        /// How to treat zero-length embeddings
        #[arg(long, value_enum, default_value = "reject")]
        zero_vectors: ZeroVectorPolicy,

        /// Directory for rankings.json and projection.csv
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Show system status (database, stored run, dataset)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dreadmap=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing dreadmap database...");
            let db = dreadmap::db::initialize_sqlite(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext: run `dreadmap download-dataset`, then `dreadmap embed`.");
        }

        Commands::DownloadDataset => {
            println!("Downloading horror-movies dataset...");
            println!("  Destination: {}", config.data_dir.display());
            let path = dreadmap::dataset::download::download_dataset(&config.data_dir).await?;
            println!("\n{}", "Dataset ready.".bold());
            println!("  {}", path.display());
        }

        Commands::Embed {
            input,
            sample,
            seed,
            refresh,
        } => {
            let db = dreadmap::db::initialize_sqlite(&config.db_path)?;

            if !refresh {
                if let Some(meta) = db.get_run_meta().await? {
                    let count = db.record_count().await?;
                    println!(
                        "Embeddings already stored: {count} records × {} dims ({}, {}).",
                        meta.dimension, meta.model, meta.embedded_at
                    );
                    println!(
                        "{}",
                        "To re-embed, run: dreadmap embed --refresh".dimmed()
                    );
                    return Ok(());
                }
            }

            config.require_provider()?;

            let source = match input {
                Some(path) => path,
                None => {
                    let path = dreadmap::dataset::download::dataset_path(&config.data_dir);
                    if !path.exists() {
                        anyhow::bail!(
                            "No dataset at {}.\nRun `dreadmap download-dataset` or pass --input.",
                            path.display()
                        );
                    }
                    path
                }
            };

            let provider = dreadmap::embeddings::openai::OpenAiProvider::new(
                &config.embedding_url,
                config.api_key.clone(),
                config.request_timeout,
            )?;

            let options = dreadmap::pipeline::embed::EmbedOptions {
                model: config.embedding_model.clone(),
                expected_dim: Some(config.embedding_dim),
                sample_size: sample.unwrap_or(config.sample_size),
                seed: seed.unwrap_or(config.seed),
            };

            println!("Embedding {}...", source.display());
            let (meta, store) =
                dreadmap::pipeline::embed::run(&provider, db.as_ref(), &source, &options).await?;

            println!("\n{}", "Embedding complete.".bold());
            println!("  Records embedded: {}", store.len());
            println!("  Dimensions: {}", meta.dimension);
            println!("  Stored in: {}", config.db_path);
        }

        Commands::Similar {
            record,
            k,
            zero_vectors,
        } => {
            let (_meta, store) = load_store(&config).await?;
            let index = resolve_record(&store, &record)?;
            let matrix = store.assemble_matrix()?;

            let neighbors =
                dreadmap::pipeline::analyze::similar_to(&matrix, index, k, zero_vectors)?;
            dreadmap::output::terminal::display_neighbors(store.records(), index, &neighbors);
        }

        Commands::Project {
            k,
            no_center,
            seed,
            out,
        } => {
            let (_meta, store) = load_store(&config).await?;
            let matrix = store.assemble_matrix()?;

            let options = dreadmap::projection::ProjectionOptions {
                center: !no_center,
                seed,
                ..Default::default()
            };
            let projection = dreadmap::projection::project_with(&matrix, k, &options)?;

            dreadmap::output::terminal::display_projection_summary(&projection);
            dreadmap::output::export::save_projection_csv(&out, store.records(), &projection)?;
            println!("Projection written to {}", out.display());
        }

        Commands::Analyze {
            k,
            components,
            zero_vectors,
            out_dir,
        } => {
            let (_meta, store) = load_store(&config).await?;
            let matrix = Arc::new(store.assemble_matrix()?);

            println!(
                "Analyzing {} records ({} neighbors each, {} components)...",
                store.len(),
                k,
                components
            );

            let analysis = dreadmap::pipeline::analyze::run(
                matrix,
                k,
                components,
                zero_vectors,
                dreadmap::projection::ProjectionOptions::default(),
            )
            .await?;

            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
            let rankings_path = out_dir.join("rankings.json");
            let projection_path = out_dir.join("projection.csv");

            dreadmap::output::export::save_rankings_json(
                &rankings_path,
                store.records(),
                &analysis.rankings,
            )?;
            dreadmap::output::export::save_projection_csv(
                &projection_path,
                store.records(),
                &analysis.projection,
            )?;

            dreadmap::output::terminal::display_projection_summary(&analysis.projection);
            println!("{}", "Analysis complete.".bold());
            println!("  Rankings: {}", rankings_path.display());
            println!("  Projection: {}", projection_path.display());
        }

        Commands::Status => {
            let db = dreadmap::db::open_sqlite(&config.db_path);
            match db {
                Ok(db) => dreadmap::status::show(&db, &config.db_path, &config.data_dir).await?,
                Err(_) => {
                    println!("Database: not initialized");
                    println!("\nRun `dreadmap init` to set up the database.");
                }
            }
        }
    }

    Ok(())
}

/// Load the stored embedding run, or bail with a helpful message.
async fn load_store(config: &Config) -> Result<(RunMeta, EmbeddingStore)> {
    let db = dreadmap::db::open_sqlite(&config.db_path)?;
    match db.load_run().await? {
        Some(run) => {
            info!(records = run.1.len(), dim = run.1.dim(), "Loaded embedding run");
            Ok(run)
        }
        None => {
            anyhow::bail!("No embeddings stored. Run `dreadmap embed` first.");
        }
    }
}

/// Resolve a record id, or `#POSITION`, to a position in the store.
fn resolve_record(store: &EmbeddingStore, key: &str) -> Result<usize> {
    if let Some(index) = store.position_of(key) {
        return Ok(index);
    }
    if let Some(pos) = key.strip_prefix('#') {
        let index: usize = pos
            .parse()
            .with_context(|| format!("Invalid position {key:?}"))?;
        return Ok(index);
    }
    anyhow::bail!(
        "No record with id {key:?} in the stored sample. Use #POSITION to pick by position."
    )
}
