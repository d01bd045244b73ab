/*!
Height fields for drawing 2D distributions.

[`density_grid`] evaluates a density on a regular lattice spanning its bounds, endpoints
included. Row `j` holds the points with `y = y_j`, column `i` those with `x = x_i`.
[`highlight_grid`] rescales a proposal's density by its peak so the values lie in
`[0, 1]`.

```rust
use mini_sampler::distributions::Uniform;
use mini_sampler::grid::density_grid;

let heights = density_grid(&Uniform::default(), (5, 3)).unwrap();
assert_eq!(heights.dim(), (3, 5));
assert!(heights.iter().all(|&h| h == 0.25));
```
*/

use ndarray::{Array1, Array2};

use crate::distributions::{check_dim, Distribution};
use crate::error::{Result, SamplingError};

/// Density over an `nx × ny` lattice of the distribution's bounds, shaped `(ny, nx)`.
pub fn density_grid<D>(dist: &D, resolution: (usize, usize)) -> Result<Array2<f64>>
where
    D: Distribution + ?Sized,
{
    check_dim(2, dist.dim())?;
    let (nx, ny) = resolution;
    if nx < 2 || ny < 2 {
        return Err(SamplingError::invalid(
            "resolution",
            format!("needs at least 2 points per axis, got {nx}×{ny}"),
        ));
    }
    let (min, max) = (dist.min_coords(), dist.max_coords());
    for (axis, (&lo, &hi)) in min.iter().zip(&max).enumerate() {
        if !(hi - lo).is_finite() {
            return Err(SamplingError::InvalidBounds { axis, min: lo, max: hi });
        }
    }
    let xs = Array1::linspace(min[0], max[0], nx);
    let ys = Array1::linspace(min[1], max[1], ny);
    Ok(Array2::from_shape_fn((ny, nx), |(j, i)| {
        dist.pdf(&[xs[i], ys[j]])
    }))
}

/// [`density_grid`] divided by `p_max`.
pub fn highlight_grid<D>(dist: &D, resolution: (usize, usize)) -> Result<Array2<f64>>
where
    D: Distribution + ?Sized,
{
    let peak = dist.p_max();
    if !(peak > 0.0 && peak.is_finite()) {
        return Err(SamplingError::invalid(
            "p_max",
            format!("cannot normalize by {peak}"),
        ));
    }
    Ok(density_grid(dist, resolution)? / peak)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{Banana2D, Gaussian2D, Sampleable, Uniform};
    use approx::assert_relative_eq;

    #[test]
    fn lattice_covers_the_bounds() {
        let b = Banana2D::default()
            .with_bounds(vec![-2.0, 0.0], vec![2.0, 1.0])
            .unwrap();
        let g = density_grid(&b, (5, 3)).unwrap();
        assert_eq!(g.dim(), (3, 5));
        assert_relative_eq!(g[(0, 0)], b.pdf(&[-2.0, 0.0]));
        assert_relative_eq!(g[(2, 4)], b.pdf(&[2.0, 1.0]));
        assert_relative_eq!(g[(1, 2)], b.pdf(&[0.0, 0.5]));
    }

    #[test]
    fn highlight_peaks_at_one() {
        let mut g = Gaussian2D::isotropic(0.3).unwrap();
        g.set_origin(&[0.0, 0.0]).unwrap();
        let h = highlight_grid(&g, (21, 21)).unwrap();
        assert_relative_eq!(h[(10, 10)], 1.0, epsilon = 1e-12);
        assert!(h.iter().all(|&v| (0.0..=1.0 + 1e-12).contains(&v)));
    }

    #[test]
    fn rejects_degenerate_requests() {
        assert!(density_grid(&Uniform::default(), (1, 10)).is_err());
        let cube = Uniform::new(vec![0.0; 3], vec![1.0; 3]).unwrap();
        assert!(matches!(
            density_grid(&cube, (4, 4)),
            Err(SamplingError::DimensionMismatch { expected: 2, found: 3 })
        ));
        let open = Gaussian2D::isotropic(1.0)
            .unwrap()
            .with_bounds(vec![-1.0, f64::NEG_INFINITY], vec![1.0, 0.0])
            .unwrap();
        assert!(matches!(
            density_grid(&open, (4, 4)),
            Err(SamplingError::InvalidBounds { axis: 1, .. })
        ));
    }
}
