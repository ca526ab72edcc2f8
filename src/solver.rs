//! Gaussian elimination with partial pivoting.

use ndarray::Array2;

/// Solve an `n × (n+1)` augmented linear system in place.
///
/// The pivot for column `i` is the row with the largest `|A[r][i]|` among
/// `r ≥ i`; if that maximum is exactly zero the system is singular and the
/// result is `None`. Forward elimination, then back substitution.
pub fn solve(mut aug: Array2<f64>) -> Option<Vec<f64>> {
    let n = aug.nrows();
    debug_assert_eq!(aug.ncols(), n + 1, "augmented matrix must be n x (n+1)");

    for i in 0..n {
        let mut pivot = i;
        let mut max = aug[(i, i)].abs();
        for r in (i + 1)..n {
            let v = aug[(r, i)].abs();
            if v > max {
                max = v;
                pivot = r;
            }
        }
        if max == 0.0 {
            return None;
        }
        if pivot != i {
            for c in i..=n {
                aug.swap((i, c), (pivot, c));
            }
        }
        for r in (i + 1)..n {
            let factor = aug[(r, i)] / aug[(i, i)];
            if factor == 0.0 {
                continue;
            }
            for c in i..=n {
                let v = aug[(i, c)];
                aug[(r, c)] -= factor * v;
            }
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut acc = aug[(i, n)];
        for c in (i + 1)..n {
            acc -= aug[(i, c)] * x[c];
        }
        x[i] = acc / aug[(i, i)];
    }
    Some(x)
}
