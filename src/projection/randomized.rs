// Randomized range finder (Halko, Martinsson & Tropp, 2011, Algorithm 4.4).
//
// Finds an orthonormal basis Q whose span captures the dominant column space
// of A without factorizing A itself: sketch A with a random test matrix,
// sharpen the sketch with a few power iterations, orthonormalize. The caller
// then only has to decompose the small matrix Qᵀ·A.

use ndarray::{Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::linalg::orthonormalize_columns;

/// Seeded uniform(-1, 1) test matrix of shape `rows × cols`.
pub fn random_test_matrix(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((rows, cols), |_| rng.random_range(-1.0..1.0))
}

/// Orthonormal basis (N × ≤size) for the range of `a` (N × D).
///
/// Each power iteration multiplies by `a·aᵀ` and re-orthonormalizes in
/// between, which keeps small singular directions from being swamped by
/// rounding.
pub fn range_finder(a: ArrayView2<'_, f64>, size: usize, power_iterations: usize, seed: u64) -> Array2<f64> {
    let omega = random_test_matrix(a.ncols(), size, seed);
    let mut q = orthonormalize_columns(a.dot(&omega).view());

    for _ in 0..power_iterations {
        if q.ncols() == 0 {
            break;
        }
        let z = orthonormalize_columns(a.t().dot(&q).view());
        q = orthonormalize_columns(a.dot(&z).view());
    }

    debug!(
        requested = size,
        rank = q.ncols(),
        power_iterations = power_iterations,
        "Range finder basis"
    );

    q
}
