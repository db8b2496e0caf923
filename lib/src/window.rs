//! Window tapering for spectral analysis
//!
//! A finite, non-periodic series (e.g. a partial time series) leaks power
//! across the whole spectrum when transformed. Tapering both ends of the
//! series to zero makes it periodic. Eddy fields (mean removed) work best.

use crate::error::{AnalysisError, Result};
use crate::field::GriddedField;
use std::f64::consts::PI;

/// Default number of samples tapered at each end
pub const DEFAULT_TAPER_WIDTH: usize = 30;

/// Generate taper weights for an axis of `len` samples.
///
/// The first `n` weights rise as cos²(-π/2 + iπ/(2n)) from 0 towards 1, the
/// last `n` mirror them, and everything in between is 1.
pub fn taper_weights(len: usize, n: usize) -> Result<Vec<f64>> {
    if 2 * n > len {
        return Err(AnalysisError::InvalidInput(format!(
            "taper width {} overlaps itself on an axis of length {}",
            n, len
        )));
    }

    let mut weights = vec![1.0; len];
    for i in 0..n {
        let w = (-PI / 2.0 + i as f64 * PI / (2.0 * n as f64)).cos().powi(2);
        weights[i] = w;
        weights[len - 1 - i] = w;
    }

    Ok(weights)
}

/// Taper the ends of `field` along the axis `dim` over `n` samples.
///
/// Returns a new field of the same shape with both ends of `dim` tapered
/// to zero.
pub fn window_taper(field: &GriddedField<f64>, dim: &str, n: usize) -> Result<GriddedField<f64>> {
    let len = field.axis(dim)?.len();
    let weights = taper_weights(len, n)?;

    log::debug!("Tapering '{}' ({} samples) over {} samples at each end", dim, len, n);

    field.scale_along(dim, &weights)
}

/// Sum of the taper weights
pub fn coherent_gain(weights: &[f64]) -> f64 {
    weights.iter().sum()
}

/// Sum of the squared taper weights
pub fn power_gain(weights: &[f64]) -> f64 {
    weights.iter().map(|&w| w * w).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Axis;

    #[test]
    fn test_taper_endpoints() {
        let len = 100;
        let weights = taper_weights(len, DEFAULT_TAPER_WIDTH).unwrap();
        assert_eq!(weights.len(), len);

        assert!(weights[0].abs() < 1e-12);
        assert!(weights[len - 1].abs() < 1e-12);
        assert!((weights[len / 2] - 1.0).abs() < 1e-12);

        // Rises monotonically through the taper
        for i in 1..DEFAULT_TAPER_WIDTH {
            assert!(weights[i] > weights[i - 1]);
        }
        assert!(weights.iter().all(|&w| (0.0..=1.0).contains(&w)));
    }

    #[test]
    fn test_taper_symmetry() {
        let weights = taper_weights(75, 30).unwrap();
        for i in 0..weights.len() / 2 {
            let left = weights[i];
            let right = weights[weights.len() - 1 - i];
            assert!(
                (left - right).abs() < 1e-12,
                "Taper not symmetric at position {}: {} != {}",
                i,
                left,
                right
            );
        }
    }

    #[test]
    fn test_taper_limits() {
        // Two full tapers meeting in the middle
        let weights = taper_weights(60, 30).unwrap();
        assert!(weights[0].abs() < 1e-12);
        assert!(weights[59].abs() < 1e-12);

        assert!(taper_weights(59, 30).unwrap_err().is_invalid_input());

        let identity = taper_weights(10, 0).unwrap();
        assert!(identity.iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_window_taper_field() {
        let axes = vec![Axis::indices("time", 80), Axis::indices("lon", 4)];
        let field = GriddedField::from_fn(axes, |_| 2.0).unwrap();

        let tapered = window_taper(&field, "time", DEFAULT_TAPER_WIDTH).unwrap();
        assert_eq!(tapered.shape(), field.shape());
        assert_eq!(tapered.axes(), field.axes());

        for lon in 0..4 {
            assert!(tapered.get(&[0, lon]).unwrap().abs() < 1e-12);
            assert!(tapered.get(&[79, lon]).unwrap().abs() < 1e-12);
            assert!((tapered.get(&[40, lon]).unwrap() - 2.0).abs() < 1e-12);
        }

        assert!(window_taper(&field, "lat", 10).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_taper_gains() {
        let weights = taper_weights(100, 30).unwrap();
        let cg = coherent_gain(&weights);
        let pg = power_gain(&weights);
        assert!(cg < 100.0 && cg > 40.0);
        assert!(pg < cg);
    }
}
