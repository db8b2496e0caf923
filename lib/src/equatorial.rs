//! Equatorial symmetric and antisymmetric wave spectra
//!
//! Splits a field about the equator into its mirror-even (symmetric) or
//! mirror-odd (antisymmetric) part within a latitude band, then returns the
//! zonal wavenumber spectrum of that part averaged over the band.

use crate::error::{AnalysisError, Result};
use crate::field::GriddedField;
use crate::fourier::{fft, AxisSelection};

/// Name of the latitude axis
pub const LAT_DIM: &str = "lat";

/// Default half-width of the equatorial band, in degrees
pub const DEFAULT_LAT_CUTOFF: f64 = 8.0;

/// Tolerance, in degrees, when pairing a latitude with its reflection
const LAT_TOLERANCE: f64 = 1e-6;

/// Configuration for the equatorial wave filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquatorialConfig {
    /// Half-width of the band about the equator, in degrees
    pub lat_cutoff: f64,
    /// Symmetric (true) or antisymmetric (false) component
    pub symmetric: bool,
}

impl Default for EquatorialConfig {
    fn default() -> Self {
        Self {
            lat_cutoff: DEFAULT_LAT_CUTOFF,
            symmetric: true,
        }
    }
}

impl EquatorialConfig {
    /// Create a configuration with validation
    pub fn new(lat_cutoff: f64, symmetric: bool) -> Result<Self> {
        let config = Self {
            lat_cutoff,
            symmetric,
        };
        config.validate()?;
        Ok(config)
    }

    /// The antisymmetric component with the default cutoff
    pub fn antisymmetric() -> Self {
        Self {
            symmetric: false,
            ..Self::default()
        }
    }

    /// Check the cutoff latitude
    pub fn validate(&self) -> Result<()> {
        if !(self.lat_cutoff > 0.0) || !self.lat_cutoff.is_finite() {
            return Err(AnalysisError::Configuration(format!(
                "latitude cutoff must be positive and finite, got {}",
                self.lat_cutoff
            )));
        }
        Ok(())
    }

    fn component_name(&self) -> &'static str {
        if self.symmetric {
            "symmetric"
        } else {
            "antisymmetric"
        }
    }
}

/// Symmetric or antisymmetric part of `field` within the equatorial band.
///
/// The southern slice is reflected onto the northern latitudes and combined
/// as 0.5(N + S) or 0.5(N - S). The result lives on the northern slice's
/// latitudes, `[0, lat_cutoff]`.
pub fn hemispheric_component(
    field: &GriddedField<f64>,
    config: &EquatorialConfig,
) -> Result<GriddedField<f64>> {
    config.validate()?;

    let north = field.select_range(LAT_DIM, 0.0, config.lat_cutoff)?;
    let south = field.select_range(LAT_DIM, -config.lat_cutoff, 0.0)?;

    let north_lats = north.coords(LAT_DIM)?.to_vec();
    let south_lats = south.coords(LAT_DIM)?;

    if north_lats.is_empty() || south_lats.is_empty() {
        return Err(AnalysisError::InvalidInput(format!(
            "no latitudes on one side of the equator within {} degrees",
            config.lat_cutoff
        )));
    }
    if north_lats.len() != south_lats.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "hemispheres do not match: {} northern and {} southern latitudes within {} degrees",
            north_lats.len(),
            south_lats.len(),
            config.lat_cutoff
        )));
    }

    // Southern index reflecting onto each northern latitude
    let mut used = vec![false; south_lats.len()];
    let mut order = Vec::with_capacity(north_lats.len());
    for &lat in &north_lats {
        let index = south_lats
            .iter()
            .enumerate()
            .position(|(i, &s)| !used[i] && (lat + s).abs() <= LAT_TOLERANCE)
            .ok_or_else(|| {
                AnalysisError::InvalidInput(format!(
                    "latitude {} has no reflection in the southern hemisphere",
                    lat
                ))
            })?;
        used[index] = true;
        order.push(index);
    }

    let reflected = south
        .select_indices(LAT_DIM, &order)?
        .assign_coords(LAT_DIM, north_lats.clone())?;

    log::debug!(
        "Equatorial {} component over {} latitude pairs within {} degrees",
        config.component_name(),
        north_lats.len(),
        config.lat_cutoff
    );

    if config.symmetric {
        north.zip_with(&reflected, |n, s| 0.5 * (n + s))
    } else {
        north.zip_with(&reflected, |n, s| 0.5 * (n - s))
    }
}

/// Zonal wavenumber spectrum of the equatorial symmetric or antisymmetric
/// component of `field`.
///
/// Transforms the component along `lon` (coordinates become whole
/// wavenumbers on `F_lon`), takes the magnitude and averages over `lat`.
/// Axes other than `lat` and `lon` are passed through.
pub fn equatorial_waves(
    field: &GriddedField<f64>,
    config: &EquatorialConfig,
) -> Result<GriddedField<f64>> {
    let component = hemispheric_component(field, config)?;
    let spectrum = fft(&component, &AxisSelection::named(["lon"]), &[])?;
    spectrum.norm().mean_axis(LAT_DIM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Axis;
    use crate::synthetic::equatorial_signal;

    const WAVENUMBER: f64 = 5.0;

    fn split_at_wavenumber(spec: &GriddedField<f64>, k: f64) -> (Vec<f64>, Vec<f64>) {
        let coords = spec.coords("F_lon").unwrap();
        let mut at = Vec::new();
        let mut elsewhere = Vec::new();
        for (j, &c) in coords.iter().enumerate() {
            let value = *spec.get(&[j]).unwrap();
            if c.abs() == k {
                at.push(value);
            } else {
                elsewhere.push(value);
            }
        }
        (at, elsewhere)
    }

    #[test]
    fn test_antisymmetric_signal() {
        // sin(lat) is odd about the equator
        let signal = equatorial_signal(WAVENUMBER, 1).unwrap();

        let spec = equatorial_waves(&signal, &EquatorialConfig::default()).unwrap();
        assert_eq!(spec.dims(), vec!["F_lon"]);
        assert!(spec.max_abs() < 1e-10);

        let spec = equatorial_waves(&signal, &EquatorialConfig::antisymmetric()).unwrap();
        let (at, elsewhere) = split_at_wavenumber(&spec, WAVENUMBER);
        assert_eq!(at.len(), 2);
        assert!(at.iter().all(|&v| v > 1.0));
        assert!(elsewhere.iter().all(|&v| v.abs() < 1e-10));
    }

    #[test]
    fn test_symmetric_signal() {
        // sin²(lat) is even about the equator
        let signal = equatorial_signal(WAVENUMBER, 2).unwrap();

        let spec = equatorial_waves(&signal, &EquatorialConfig::default()).unwrap();
        let (at, elsewhere) = split_at_wavenumber(&spec, WAVENUMBER);
        assert_eq!(at.len(), 2);
        assert!(at.iter().all(|&v| v > 1.0));
        assert!(elsewhere.iter().all(|&v| v.abs() < 1e-10));

        let spec = equatorial_waves(&signal, &EquatorialConfig::antisymmetric()).unwrap();
        assert!(spec.max_abs() < 1e-10);
    }

    #[test]
    fn test_descending_latitudes() {
        let signal = equatorial_signal(WAVENUMBER, 2).unwrap();
        let flipped = signal
            .select_indices(LAT_DIM, &(0..10).rev().collect::<Vec<_>>())
            .unwrap();

        let expected = equatorial_waves(&signal, &EquatorialConfig::default()).unwrap();
        let spec = equatorial_waves(&flipped, &EquatorialConfig::default()).unwrap();
        for (a, b) in spec.data().iter().zip(expected.data().iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn test_component_with_equator_point() {
        let axes = vec![
            Axis::new("time", vec![0.0, 1.0]),
            Axis::new(LAT_DIM, vec![-6.0, -3.0, 0.0, 3.0, 6.0]),
            Axis::linspace("lon", 0.0, 360.0, 8, false),
        ];
        let field = GriddedField::from_fn(axes, |c| c[0] + c[1]).unwrap();

        let sym = hemispheric_component(&field, &EquatorialConfig::default()).unwrap();
        assert_eq!(sym.coords(LAT_DIM).unwrap(), &[0.0, 3.0, 6.0]);
        // Even part of (time + lat) is time
        assert!((sym.get(&[1, 2, 4]).unwrap() - 1.0).abs() < 1e-12);

        let anti =
            hemispheric_component(&field, &EquatorialConfig::new(8.0, false).unwrap()).unwrap();
        // Odd part is lat
        assert!((anti.get(&[0, 1, 0]).unwrap() - 3.0).abs() < 1e-12);
        assert!(anti.get(&[1, 0, 3]).unwrap().abs() < 1e-12);

        let spec = equatorial_waves(&field, &EquatorialConfig::default()).unwrap();
        assert_eq!(spec.dims(), vec!["time", "F_lon"]);
        assert_eq!(spec.coords("time").unwrap(), &[0.0, 1.0]);
    }

    #[test]
    fn test_mismatched_hemispheres() {
        let axes = vec![
            Axis::new(LAT_DIM, vec![-7.0, -2.0, 1.0, 5.0]),
            Axis::linspace("lon", 0.0, 360.0, 4, false),
        ];
        let field = GriddedField::from_fn(axes.clone(), |c| c[0]).unwrap();
        let err = equatorial_waves(&field, &EquatorialConfig::default()).unwrap_err();
        assert!(err.is_invalid_input());

        let axes = vec![
            Axis::new(LAT_DIM, vec![-7.0, -2.0, 1.0]),
            Axis::linspace("lon", 0.0, 360.0, 4, false),
        ];
        let field = GriddedField::from_fn(axes, |c| c[0]).unwrap();
        let err = equatorial_waves(&field, &EquatorialConfig::default()).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_invalid_arguments() {
        let axes = vec![Axis::linspace("lon", 0.0, 360.0, 4, false)];
        let field = GriddedField::from_fn(axes, |_| 1.0).unwrap();
        assert!(equatorial_waves(&field, &EquatorialConfig::default())
            .unwrap_err()
            .is_invalid_input());

        assert!(EquatorialConfig::new(0.0, true).unwrap_err().is_configuration());
        assert!(EquatorialConfig::new(-8.0, false).is_err());
    }
}
