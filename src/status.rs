// System status display: database, stored run, dataset cache.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::dataset::download;
use crate::db::Database;

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn Database>, db_path: &str, data_dir: &Path) -> Result<()> {
    let file_size = std::fs::metadata(db_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_path, file_size);

    if download::dataset_present(data_dir) {
        println!(
            "Dataset: {}",
            download::dataset_path(data_dir).display()
        );
    } else {
        println!("Dataset: not downloaded");
        println!("  Run `dreadmap download-dataset` to fetch it");
    }

    match db.get_run_meta().await? {
        Some(meta) => {
            let count = db.record_count().await?;
            println!(
                "Embeddings: {} records × {} dims ({})",
                count, meta.dimension, meta.model
            );
            println!(
                "  Sample: {} requested, seed {}, from {}",
                meta.sample_size, meta.seed, meta.source
            );
            println!(
                "  Embedded: {} ({})",
                meta.embedded_at,
                describe_age(&meta.embedded_at)
            );
        }
        None => {
            println!("Embeddings: none stored yet");
            println!("  Run `dreadmap embed` to build them");
        }
    }

    Ok(())
}

/// Human-readable age of an RFC 3339 timestamp.
fn describe_age(timestamp: &str) -> String {
    let Ok(then) = chrono::DateTime::parse_from_rfc3339(timestamp) else {
        return "unknown age".to_string();
    };
    let age = chrono::Utc::now().signed_duration_since(then);
    if age.num_days() > 0 {
        format!("{} days ago", age.num_days())
    } else if age.num_hours() > 0 {
        format!("{} hours ago", age.num_hours())
    } else {
        format!("{} minutes ago", age.num_minutes().max(0))
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_describe_age() {
        let two_days_ago = (chrono::Utc::now() - chrono::Duration::days(2)).to_rfc3339();
        assert_eq!(describe_age(&two_days_ago), "2 days ago");
        assert_eq!(describe_age("yesterday-ish"), "unknown age");
    }
}
