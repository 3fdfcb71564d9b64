// Ranked nearest-neighbor lookup over a similarity matrix.
//
// Order: highest score first, ties broken by lower index. The query record
// itself is never part of its own result.

use std::cmp::Ordering;

use serde::Serialize;

use super::SimilarityMatrix;
use crate::error::{PipelineError, PipelineResult};

/// One ranked neighbor: its position in the store and its cosine score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub index: usize,
    pub score: f64,
}

/// The `k` records most similar to `index`, best first.
///
/// `index` must be in `[0, N)` and `k` at most `N - 1`; anything else fails
/// with `IndexOutOfRange`.
pub fn nearest(sim: &SimilarityMatrix, index: usize, k: usize) -> PipelineResult<Vec<Neighbor>> {
    let n = sim.len();
    if index >= n {
        return Err(PipelineError::IndexOutOfRange(format!(
            "record index {index} is outside [0, {n})"
        )));
    }
    if k > n - 1 {
        return Err(PipelineError::IndexOutOfRange(format!(
            "k = {k} exceeds the {} other records",
            n - 1
        )));
    }
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut candidates: Vec<Neighbor> = sim
        .row(index)
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != index)
        .map(|(j, &score)| Neighbor { index: j, score })
        .collect();

    // Partition the top k to the front before sorting just those.
    if k < candidates.len() {
        candidates.select_nth_unstable_by(k - 1, rank_order);
        candidates.truncate(k);
    }
    candidates.sort_by(rank_order);

    Ok(candidates)
}

/// Rankings for every record, in record order.
pub fn nearest_all(sim: &SimilarityMatrix, k: usize) -> PipelineResult<Vec<Vec<Neighbor>>> {
    (0..sim.len()).map(|i| nearest(sim, i, k)).collect()
}

/// Descending by score, then ascending by index.
fn rank_order(a: &Neighbor, b: &Neighbor) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.index.cmp(&b.index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::EmbeddingMatrix;
    use crate::similarity::{normalize, similarity_matrix};

    fn sim(rows: &[Vec<f64>]) -> SimilarityMatrix {
        similarity_matrix(&normalize(&EmbeddingMatrix::from_rows(rows).unwrap()).unwrap())
    }

    #[test]
    fn test_ties_broken_by_lower_index() {
        // Records 1, 2 and 3 are all identical to the query
        let s = sim(&[
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 0.0],
            vec![4.0, 0.0],
        ]);
        let got = nearest(&s, 0, 2).unwrap();
        assert_eq!(got.iter().map(|n| n.index).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_k_zero_is_empty() {
        let s = sim(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert!(nearest(&s, 1, 0).unwrap().is_empty());
    }

    #[test]
    fn test_full_ranking_excludes_self() {
        let s = sim(&[vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 1.0]]);
        let got = nearest(&s, 1, 2).unwrap();
        assert_eq!(got.len(), 2);
        assert!(got.iter().all(|n| n.index != 1));
        // Both neighbors are 45 degrees away: tie → lower index first
        assert_eq!(got[0].index, 0);
        assert_eq!(got[1].index, 2);
    }

    #[test]
    fn test_out_of_range() {
        let s = sim(&[vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert!(matches!(
            nearest(&s, 2, 1),
            Err(PipelineError::IndexOutOfRange(_))
        ));
        assert!(matches!(
            nearest(&s, 0, 2),
            Err(PipelineError::IndexOutOfRange(_))
        ));
    }

    #[test]
    fn test_nearest_all_one_list_per_record() {
        let s = sim(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]);
        let all = nearest_all(&s, 1).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0][0].index, 2);
        assert_eq!(all[1][0].index, 2);
    }
}
