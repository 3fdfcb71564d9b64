// Small dense linear-algebra kernels for the randomized decomposition.
//
// Both operate on matrices no larger than (k + oversamples) on one side, so
// plain loops over ndarray are fast enough and keep us off LAPACK.

use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Upper bound on Jacobi sweeps. Convergence is quadratic; this is never hit
/// on well-formed input.
const MAX_SWEEPS: usize = 64;

/// Orthonormalize the columns of `y` with modified Gram-Schmidt (two passes).
///
/// Columns that collapse to (numerically) zero after projection against the
/// earlier ones are dropped, so the result may have fewer columns than `y`.
pub fn orthonormalize_columns(y: ArrayView2<'_, f64>) -> Array2<f64> {
    let rows = y.nrows();
    let scale = y
        .axis_iter(Axis(1))
        .map(|c| c.dot(&c).sqrt())
        .fold(0.0_f64, f64::max);
    let tol = scale * 1e-10;

    let mut basis: Vec<Array1<f64>> = Vec::with_capacity(y.ncols());
    for col in y.axis_iter(Axis(1)) {
        let mut v = col.to_owned();
        for _ in 0..2 {
            for q in &basis {
                let proj = q.dot(&v);
                v.scaled_add(-proj, q);
            }
        }
        let norm = v.dot(&v).sqrt();
        if norm > tol && norm > 0.0 {
            v /= norm;
            basis.push(v);
        }
    }

    let mut q = Array2::zeros((rows, basis.len()));
    for (j, v) in basis.iter().enumerate() {
        q.column_mut(j).assign(v);
    }
    q
}

/// Eigen-decomposition of a symmetric matrix by cyclic Jacobi rotations.
///
/// Returns eigenvalues in descending order and the matching unit
/// eigenvectors as the columns of the second element.
pub fn symmetric_eigen(a: &Array2<f64>) -> (Vec<f64>, Array2<f64>) {
    let m = a.nrows();
    let mut a = a.clone();
    let mut v = Array2::<f64>::eye(m);

    let total: f64 = a.iter().map(|x| x * x).sum();

    for _ in 0..MAX_SWEEPS {
        let mut off = 0.0;
        for p in 0..m {
            for q in (p + 1)..m {
                off += a[[p, q]] * a[[p, q]];
            }
        }
        if off <= total * 1e-30 || off == 0.0 {
            break;
        }

        for p in 0..m {
            for q in (p + 1)..m {
                let apq = a[[p, q]];
                if apq == 0.0 {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                for k in 0..m {
                    let akp = a[[k, p]];
                    let akq = a[[k, q]];
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..m {
                    let apk = a[[p, k]];
                    let aqk = a[[q, k]];
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
                for k in 0..m {
                    let vkp = v[[k, p]];
                    let vkq = v[[k, q]];
                    v[[k, p]] = c * vkp - s * vkq;
                    v[[k, q]] = s * vkp + c * vkq;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));

    let values = order.iter().map(|&i| a[[i, i]]).collect();
    let mut vectors = Array2::zeros((m, m));
    for (dst, &src) in order.iter().enumerate() {
        vectors.column_mut(dst).assign(&v.column(src));
    }

    (values, vectors)
}
