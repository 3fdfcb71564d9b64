use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::dataset::download::default_data_dir;
use crate::dataset::sample::{DEFAULT_SAMPLE_SIZE, DEFAULT_SEED};
use crate::embeddings::openai::DEFAULT_BASE_URL;
use crate::embeddings::{DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL};

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the embedding provider. Passed explicitly to the
    /// provider; only `embed` needs it.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible embeddings API
    pub embedding_url: String,
    pub embedding_model: String,
    /// Expected width of every returned vector
    pub embedding_dim: usize,
    /// Timeout for the single embedding request
    pub request_timeout: Duration,
    pub db_path: String,
    /// Directory holding the downloaded dataset
    pub data_dir: PathBuf,
    pub sample_size: usize,
    pub seed: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default except the API key, which is only checked
    /// (via `require_provider`) by commands that call the provider.
    pub fn load() -> Result<Self> {
        Ok(Self {
            api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            embedding_url: env::var("DREADMAP_EMBEDDING_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            embedding_model: env::var("DREADMAP_EMBEDDING_MODEL")
                .unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dim: parse_var("DREADMAP_EMBEDDING_DIM", DEFAULT_EMBEDDING_DIM)?,
            request_timeout: Duration::from_secs(parse_var("DREADMAP_TIMEOUT_SECS", 60)?),
            db_path: env::var("DREADMAP_DB_PATH").unwrap_or_else(|_| "./dreadmap.db".to_string()),
            data_dir: env::var("DREADMAP_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_data_dir()),
            sample_size: parse_var("DREADMAP_SAMPLE_SIZE", DEFAULT_SAMPLE_SIZE)?,
            seed: parse_var("DREADMAP_SEED", DEFAULT_SEED)?,
        })
    }

    /// Check that the embedding provider credential is configured.
    /// Call this before any operation that requests embeddings.
    pub fn require_provider(&self) -> Result<()> {
        if self.api_key.is_empty() {
            anyhow::bail!(
                "OPENAI_API_KEY not set. Add it to your .env file.\n\
                 See .env.example for the required variables."
            );
        }
        Ok(())
    }
}

/// Read a numeric env var, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number, got {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global; each test uses its own variable name.

    #[test]
    fn test_parse_var_default_when_unset() {
        let v: usize = parse_var("DREADMAP_TEST_UNSET_VAR", 7).unwrap();
        assert_eq!(v, 7);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("DREADMAP_TEST_GARBAGE_VAR", "lots");
        let err = parse_var::<usize>("DREADMAP_TEST_GARBAGE_VAR", 7).unwrap_err();
        assert!(err.to_string().contains("DREADMAP_TEST_GARBAGE_VAR"));
    }

    #[test]
    fn test_parse_var_trims() {
        env::set_var("DREADMAP_TEST_PADDED_VAR", " 12 ");
        let v: u64 = parse_var("DREADMAP_TEST_PADDED_VAR", 0).unwrap();
        assert_eq!(v, 12);
    }

    #[test]
    fn test_require_provider_without_key() {
        let mut config = Config::load().unwrap();
        config.api_key.clear();
        assert!(config.require_provider().is_err());
        config.api_key = "sk-test".to_string();
        assert!(config.require_provider().is_ok());
    }
}
