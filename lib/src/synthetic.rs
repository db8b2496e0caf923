//! Synthetic fields for exercising the spectral routines

use crate::dispersion::{LON_DIM, TIME_DIM};
use crate::equatorial::LAT_DIM;
use crate::error::Result;
use crate::field::{Axis, GriddedField};
use std::f64::consts::PI;

/// Zonal wave of wavenumber `wavenumber` with latitude structure
/// sin(lat·π/10)^power, on 10 latitudes spanning [-10, 10] and 42 longitudes
/// over [0, 360).
///
/// Odd powers are antisymmetric about the equator, even powers symmetric.
pub fn equatorial_signal(wavenumber: f64, power: i32) -> Result<GriddedField<f64>> {
    equatorial_signal_on(
        Axis::linspace(LAT_DIM, -10.0, 10.0, 10, true),
        Axis::linspace(LON_DIM, 0.0, 360.0, 42, false),
        wavenumber,
        power,
    )
}

/// [`equatorial_signal`] on caller-supplied latitude and longitude axes
pub fn equatorial_signal_on(
    lat: Axis,
    lon: Axis,
    wavenumber: f64,
    power: i32,
) -> Result<GriddedField<f64>> {
    GriddedField::from_fn(vec![lat, lon], |c| {
        (c[0] / 10.0 * PI).sin().powi(power) * (c[1] / 360.0 * PI * wavenumber * 2.0).cos()
    })
}

/// Travelling zonal wave cos(2π(k·lon/360 - f·t)) sampled at `nt` times
/// `dt` apart on `nlon` longitudes over [0, 360).
///
/// Positive `wavenumber` and `frequency` propagate eastward.
pub fn travelling_wave(
    nt: usize,
    dt: f64,
    nlon: usize,
    wavenumber: f64,
    frequency: f64,
) -> Result<GriddedField<f64>> {
    let axes = vec![
        Axis::new(TIME_DIM, (0..nt).map(|i| i as f64 * dt).collect()),
        Axis::linspace(LON_DIM, 0.0, 360.0, nlon, false),
    ];
    GriddedField::from_fn(axes, |c| {
        (2.0 * PI * (wavenumber * c[1] / 360.0 - frequency * c[0])).cos()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equatorial_signal_layout() {
        let signal = equatorial_signal(5.0, 1).unwrap();
        assert_eq!(signal.dims(), vec![LAT_DIM, LON_DIM]);
        assert_eq!(signal.shape(), &[10, 42]);
        assert_eq!(signal.coords(LAT_DIM).unwrap()[0], -10.0);
        assert!((signal.coords(LAT_DIM).unwrap()[9] - 10.0).abs() < 1e-12);
        assert!(signal.coords(LON_DIM).unwrap().iter().all(|&l| l < 360.0));
        // sin(-π) = 0 at the southern edge
        assert!(signal.get(&[0, 0]).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_travelling_wave_phase() {
        let wave = travelling_wave(4, 0.25, 4, 1.0, 1.0).unwrap();
        // At t = 0.25 the crest has moved a quarter revolution east
        assert!((wave.get(&[1, 1]).unwrap() - 1.0).abs() < 1e-12);
        assert!((wave.get(&[0, 0]).unwrap() - 1.0).abs() < 1e-12);
    }
}
