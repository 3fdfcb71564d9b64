// Embedding store tests: count/width validation against a scripted provider.
//
// The fake provider records how many requests it saw, so these tests also
// pin down the one-request-per-run contract.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dreadmap::dataset::Record;
use dreadmap::embeddings::{EmbeddingProvider, EmbeddingStore};
use dreadmap::error::{PipelineError, PipelineResult};

/// What the scripted provider should do with a batch.
enum Script {
    /// One vector of this width per text
    Width(usize),
    /// Drop the last vector
    OneShort(usize),
    /// Make the vector at this position narrower
    NarrowAt(usize, usize),
    /// Fail the request
    Fail,
}

struct FakeProvider {
    script: Script,
    calls: AtomicUsize,
}

impl FakeProvider {
    fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn vector(i: usize, dim: usize) -> Vec<f64> {
    (0..dim).map(|j| ((i + 1) * (j + 3)) as f64 % 7.0 - 3.0).collect()
}

#[async_trait]
impl EmbeddingProvider for FakeProvider {
    async fn embed_batch(&self, _model: &str, texts: &[String]) -> PipelineResult<Vec<Vec<f64>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Width(dim) => Ok((0..texts.len()).map(|i| vector(i, dim)).collect()),
            Script::OneShort(dim) => Ok((0..texts.len() - 1).map(|i| vector(i, dim)).collect()),
            Script::NarrowAt(at, dim) => Ok((0..texts.len())
                .map(|i| vector(i, if i == at { dim - 1 } else { dim }))
                .collect()),
            Script::Fail => Err(PipelineError::ProviderError(
                "HTTP 401 Unauthorized".to_string(),
            )),
        }
    }
}

fn records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| Record::new(i.to_string(), format!("Movie {i}"), format!("overview {i}")))
        .collect()
}

#[tokio::test]
async fn one_vector_per_record() {
    let provider = FakeProvider::new(Script::Width(16));
    let store = EmbeddingStore::build(&provider, "test-model", records(1000), Some(16))
        .await
        .unwrap();

    assert_eq!(store.len(), 1000);
    assert_eq!(store.dim(), 16);
    assert_eq!(provider.calls(), 1);

    let matrix = store.assemble_matrix().unwrap();
    assert_eq!(matrix.n_rows(), 1000);
    assert_eq!(matrix.dim(), 16);
    assert_eq!(matrix.row(7).to_vec(), vector(7, 16));
}

#[tokio::test]
async fn short_response_is_a_dimension_mismatch() {
    let provider = FakeProvider::new(Script::OneShort(8));
    let err = EmbeddingStore::build(&provider, "test-model", records(1000), Some(8))
        .await
        .unwrap_err();

    match err {
        PipelineError::DimensionMismatch(msg) => assert!(msg.contains("999"), "{msg}"),
        other => panic!("expected DimensionMismatch, got {other:?}"),
    }
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn ragged_width_is_a_dimension_mismatch() {
    let provider = FakeProvider::new(Script::NarrowAt(3, 8));
    let err = EmbeddingStore::build(&provider, "test-model", records(10), None)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::DimensionMismatch(_)));
}

#[tokio::test]
async fn width_must_match_expected() {
    let provider = FakeProvider::new(Script::Width(8));
    let err = EmbeddingStore::build(&provider, "test-model", records(4), Some(1536))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::DimensionMismatch(_)));
}

#[tokio::test]
async fn provider_error_passes_through() {
    let provider = FakeProvider::new(Script::Fail);
    let err = EmbeddingStore::build(&provider, "test-model", records(5), None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        PipelineError::ProviderError("HTTP 401 Unauthorized".to_string())
    );
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn empty_input_never_calls_the_provider() {
    let provider = FakeProvider::new(Script::Width(4));
    let err = EmbeddingStore::build(&provider, "test-model", Vec::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidParameter(_)));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn position_of_finds_source_ids() {
    let provider = FakeProvider::new(Script::Width(4));
    let store = EmbeddingStore::build(&provider, "test-model", records(20), None)
        .await
        .unwrap();
    assert_eq!(store.position_of("13"), Some(13));
    assert_eq!(store.position_of("nope"), None);
    assert_eq!(store.records()[13].title, "Movie 13");
}
