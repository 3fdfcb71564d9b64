// Dataset download helper.
//
// Fetches the TidyTuesday horror-movies table (2022-11-01) into a
// platform-appropriate directory (~/.local/share/dreadmap/ on Linux) so it
// persists across runs. Skips the download when the file already exists.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// Raw CSV published by the TidyTuesday project.
pub const DATASET_URL: &str = "https://raw.githubusercontent.com/rfordatascience/tidytuesday/master/data/2022/2022-11-01/horror_movies.csv";

/// File name of the cached dataset.
pub const DATASET_FILE: &str = "horror_movies.csv";

/// Returns the default directory for the cached dataset.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dreadmap")
}

/// Path of the cached CSV inside `dir`.
pub fn dataset_path(dir: &Path) -> PathBuf {
    dir.join(DATASET_FILE)
}

/// Check whether the dataset has already been downloaded.
pub fn dataset_present(dir: &Path) -> bool {
    dataset_path(dir).exists()
}

/// Download the dataset into `dir`, creating it if needed.
///
/// Returns the path to the CSV. Does nothing if the file already exists.
pub async fn download_dataset(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;

    let dest = dataset_path(dir);
    if dest.exists() {
        info!("Dataset already exists, skipping");
        println!("  {} (already exists)", DATASET_FILE);
        return Ok(dest);
    }

    println!("  Downloading {}...", DATASET_FILE);
    download_file(DATASET_URL, &dest).await?;
    Ok(dest)
}

/// Download a single file from a URL to a local path with a progress bar.
async fn download_file(url: &str, dest: &Path) -> Result<()> {
    let client = reqwest::Client::new();
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Download failed with status {}: {}", response.status(), url);
    }

    let pb = match response.content_length() {
        Some(size) => {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .expect("valid template")
                    .progress_chars("=> "),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("    {spinner} {bytes}")
                    .expect("valid template"),
            );
            pb
        }
    };

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .context("Failed to read response body")?
    {
        body.extend_from_slice(&chunk);
        pb.set_position(body.len() as u64);
    }

    std::fs::write(dest, &body).with_context(|| format!("Failed to write {}", dest.display()))?;
    pb.finish_and_clear();

    info!("Downloaded {} to {}", url, dest.display());
    Ok(())
}
