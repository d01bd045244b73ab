//! Closed-form 2×2 Cholesky factorization used by [`crate::distributions::Gaussian2D`].

use ndarray::{arr2, Array2};

use crate::error::{Result, SamplingError};

/// Cholesky factor `L` of a symmetric positive-definite 2×2 matrix (`C = L·Lᵀ`)
/// together with its inverse.
#[derive(Debug, Clone, PartialEq)]
pub struct Cholesky2 {
    l: Array2<f64>,
    inv_l: Array2<f64>,
}

impl Cholesky2 {
    /// Factorizes `cov`. Fails if the matrix is not 2×2, not symmetric, or if either
    /// pivot is not strictly positive.
    pub fn decompose(cov: &Array2<f64>) -> Result<Self> {
        check_square_2x2(cov)?;
        let (c00, c01, c10, c11) = (cov[(0, 0)], cov[(0, 1)], cov[(1, 0)], cov[(1, 1)]);
        if (c01 - c10).abs() > 1e-12 * c01.abs().max(c10.abs()).max(1.0) {
            return Err(SamplingError::AsymmetricCovariance {
                upper: c01,
                lower: c10,
            });
        }

        // `!(x > 0)` also rejects NaN
        if !(c00 > 0.0) {
            return Err(SamplingError::NotPositiveDefinite {
                pivot: 0,
                value: c00,
            });
        }
        let l00 = c00.sqrt();
        let l10 = c01 / l00;
        let pivot = c11 - l10 * l10;
        if !(pivot > 0.0) {
            return Err(SamplingError::NotPositiveDefinite { pivot: 1, value: pivot });
        }
        let l11 = pivot.sqrt();

        let inv00 = 1.0 / l00;
        let inv11 = 1.0 / l11;
        let inv10 = -l10 * inv11 * inv00;

        Ok(Self {
            l: arr2(&[[l00, 0.0], [l10, l11]]),
            inv_l: arr2(&[[inv00, 0.0], [inv10, inv11]]),
        })
    }

    /// Factor of `diag(a², b²)`. Both entries must be positive.
    pub(crate) fn diagonal(a: f64, b: f64) -> Self {
        Self {
            l: arr2(&[[a, 0.0], [0.0, b]]),
            inv_l: arr2(&[[1.0 / a, 0.0], [0.0, 1.0 / b]]),
        }
    }

    /// The lower-triangular factor `L`.
    pub fn l(&self) -> &Array2<f64> {
        &self.l
    }

    /// The inverse `L⁻¹`, also lower-triangular.
    pub fn inv_l(&self) -> &Array2<f64> {
        &self.inv_l
    }

    /// `ln det C = 2·(ln L00 + ln L11)`.
    pub fn log_det(&self) -> f64 {
        2.0 * (self.l[(0, 0)].ln() + self.l[(1, 1)].ln())
    }

    /// Recomputes `L·Lᵀ`.
    pub fn reconstruct(&self) -> Array2<f64> {
        self.l.dot(&self.l.t())
    }

    /// `L·v`.
    pub fn apply(&self, v: [f64; 2]) -> [f64; 2] {
        lower_triangular_mul(&self.l, v)
    }

    /// `L⁻¹·v`.
    pub fn whiten(&self, v: [f64; 2]) -> [f64; 2] {
        lower_triangular_mul(&self.inv_l, v)
    }
}

/// Multiplies a 2-vector by the lower triangle of `m`.
pub fn lower_triangular_mul(m: &Array2<f64>, v: [f64; 2]) -> [f64; 2] {
    [m[(0, 0)] * v[0], m[(1, 0)] * v[0] + m[(1, 1)] * v[1]]
}

pub(crate) fn check_square_2x2(m: &Array2<f64>) -> Result<()> {
    let (rows, cols) = m.dim();
    if rows != 2 {
        return Err(SamplingError::DimensionMismatch {
            expected: 2,
            found: rows,
        });
    }
    if cols != 2 {
        return Err(SamplingError::DimensionMismatch {
            expected: 2,
            found: cols,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    #[test]
    fn reconstructs_covariance() {
        for cov in [
            arr2(&[[1.0, 0.0], [0.0, 1.0]]),
            arr2(&[[4.0, 2.0], [2.0, 3.0]]),
            arr2(&[[0.01, -0.005], [-0.005, 0.02]]),
            arr2(&[[2.0, 1.0], [1.0, 2.0]]),
        ] {
            let chol = Cholesky2::decompose(&cov).unwrap();
            assert_abs_diff_eq!(chol.reconstruct(), cov, epsilon = 1e-12);
            assert_eq!(chol.l()[(0, 1)], 0.0);
        }
    }

    #[test]
    fn inverse_is_inverse() {
        let cov = arr2(&[[4.0, 2.0], [2.0, 3.0]]);
        let chol = Cholesky2::decompose(&cov).unwrap();
        let eye = chol.l().dot(chol.inv_l());
        assert_abs_diff_eq!(eye, Array2::<f64>::eye(2), epsilon = 1e-12);

        let v = [0.3, -1.7];
        let back = chol.apply(chol.whiten(v));
        assert_abs_diff_eq!(back[0], v[0], epsilon = 1e-12);
        assert_abs_diff_eq!(back[1], v[1], epsilon = 1e-12);
    }

    #[test]
    fn log_det_matches_determinant() {
        let cov = arr2(&[[4.0, 2.0], [2.0, 3.0]]);
        let chol = Cholesky2::decompose(&cov).unwrap();
        assert_abs_diff_eq!(chol.log_det(), 8.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn rejects_indefinite_matrices() {
        let err = Cholesky2::decompose(&arr2(&[[-1.0, 0.0], [0.0, 1.0]])).unwrap_err();
        assert!(matches!(err, SamplingError::NotPositiveDefinite { pivot: 0, .. }));

        let err = Cholesky2::decompose(&arr2(&[[1.0, 2.0], [2.0, 1.0]])).unwrap_err();
        assert!(matches!(err, SamplingError::NotPositiveDefinite { pivot: 1, .. }));

        let err = Cholesky2::decompose(&arr2(&[[f64::NAN, 0.0], [0.0, 1.0]])).unwrap_err();
        assert!(matches!(err, SamplingError::NotPositiveDefinite { .. }));
    }

    #[test]
    fn rejects_asymmetric_and_misshapen() {
        let err = Cholesky2::decompose(&arr2(&[[1.0, 0.5], [0.0, 1.0]])).unwrap_err();
        assert!(matches!(err, SamplingError::AsymmetricCovariance { .. }));

        let err = Cholesky2::decompose(&Array2::<f64>::eye(3)).unwrap_err();
        assert!(matches!(
            err,
            SamplingError::DimensionMismatch {
                expected: 2,
                found: 3
            }
        ));
    }
}
