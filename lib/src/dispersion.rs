//! Zonal wavenumber-frequency decomposition
//!
//! Transforms a field jointly over `time` and `lon` into a power spectrum in
//! (frequency, zonal wavenumber) space. In the default convention the output
//! basis is exp(i(kx - ωt)), so eastward-propagating waves appear at positive
//! wavenumber for positive frequency.

use crate::error::{AnalysisError, Result};
use crate::field::{Axis, ComplexField, GriddedField};
use crate::fourier::{shift_axis, shifted_fftfreq, transform_axis};
use ndarray::{ArrayD, Axis as ArrayAxis};
use num_complex::Complex64;
use rustfft::FftPlanner;
use std::fmt;

/// Name of the time axis consumed by the decomposition
pub const TIME_DIM: &str = "time";
/// Name of the longitude axis consumed by the decomposition
pub const LON_DIM: &str = "lon";
/// Name of the frequency axis that replaces `time`
pub const FREQ_DIM: &str = "freq";
/// Name of the zonal wavenumber axis that replaces `lon`
pub const WAVENUMBER_DIM: &str = "k";

/// Sign convention of the (frequency, wavenumber) basis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignConvention {
    /// Basis exp(i(kx - ωt)): eastward waves at k > 0 for ω > 0
    #[default]
    EastwardPositive,
    /// Basis of the transform itself, exp(-i(kx + ωt))
    Transform,
}

impl fmt::Display for SignConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignConvention::EastwardPositive => write!(f, "exp(i(kx - wt))"),
            SignConvention::Transform => write!(f, "exp(-i(kx + wt))"),
        }
    }
}

/// Configuration for the zonal dispersion analysis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersionConfig {
    /// Time between samples; frequencies come out in cycles per this unit
    pub dt: f64,
    /// Sign convention of the output basis
    pub convention: SignConvention,
}

impl Default for DispersionConfig {
    fn default() -> Self {
        Self {
            dt: 1.0,
            convention: SignConvention::EastwardPositive,
        }
    }
}

impl DispersionConfig {
    /// Create a configuration with validation
    pub fn new(dt: f64) -> Result<Self> {
        let config = Self {
            dt,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Use a different sign convention
    pub fn with_convention(mut self, convention: SignConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Check the sample interval
    pub fn validate(&self) -> Result<()> {
        if !(self.dt > 0.0) || !self.dt.is_finite() {
            return Err(AnalysisError::Configuration(format!(
                "sample interval dt must be positive and finite, got {}",
                self.dt
            )));
        }
        Ok(())
    }
}

/// Negate the frequencies along `ax`: entry j of each lane takes entry
/// (n - j) mod n, in unshifted transform order.
fn negate_axis(data: &mut ArrayD<Complex64>, ax: usize) {
    let n = data.shape()[ax];
    let mut buffer = vec![Complex64::new(0.0, 0.0); n];

    for mut lane in data.lanes_mut(ArrayAxis(ax)) {
        for (j, b) in buffer.iter_mut().enumerate() {
            *b = lane[(n - j) % n];
        }
        for (v, b) in lane.iter_mut().zip(&buffer) {
            *v = *b;
        }
    }
}

/// Full complex (frequency, wavenumber) spectrum of `field`.
///
/// `time` becomes `freq` (cycles per `dt`, centred on zero) and `lon`
/// becomes `k` (integer wavenumbers, assuming `lon` is one evenly spaced
/// revolution). Other axes are passed through. Both halves of the frequency
/// axis are kept; for real input, S(-ω, -k) = conj(S(ω, k)).
pub fn dispersion_spectrum(
    field: &GriddedField<f64>,
    config: &DispersionConfig,
) -> Result<ComplexField> {
    config.validate()?;

    let t_ax = field.axis_index(TIME_DIM)?;
    let x_ax = field.axis_index(LON_DIM)?;
    let nt = field.shape()[t_ax];
    let nx = field.shape()[x_ax];

    if nt == 0 || nx == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "cannot transform empty axes: {} time samples, {} longitudes",
            nt, nx
        )));
    }

    let lon = &field.axes()[x_ax];
    if let Some(dlon) = lon.spacing() {
        if ((dlon * nx as f64).abs() - 360.0).abs() > 1e-6 * 360.0 {
            log::warn!(
                "Longitudes ({}) do not form one full revolution; wavenumbers assume they do",
                lon
            );
        }
    }

    log::debug!(
        "Zonal dispersion of {:?}{:?}: {} time samples (dt = {}), {} longitudes, basis {}",
        field.dims(),
        field.shape(),
        nt,
        config.dt,
        nx,
        config.convention
    );

    let (mut data, mut axes) = field.to_complex().into_parts();
    let mut planner = FftPlanner::<f64>::new();

    let plan = planner.plan_fft_forward(nt);
    transform_axis(&mut data, t_ax, plan.as_ref());
    let plan = planner.plan_fft_forward(nx);
    transform_axis(&mut data, x_ax, plan.as_ref());

    if config.convention == SignConvention::EastwardPositive {
        negate_axis(&mut data, t_ax);
    }

    shift_axis(&mut data, t_ax, false);
    shift_axis(&mut data, x_ax, false);

    axes[t_ax] = Axis::new(FREQ_DIM, shifted_fftfreq(nt, config.dt));
    axes[x_ax] = Axis::new(WAVENUMBER_DIM, shifted_fftfreq(nx, 1.0 / nx as f64));

    GriddedField::new(data, axes)
}

/// Power spectrum of `field` in frequency and zonal wavenumber.
///
/// The magnitude of [`dispersion_spectrum`], restricted to `freq >= 0`: the
/// input is real, so the negative-frequency half carries no extra
/// information. `ceil(n_time / 2)` frequencies remain.
pub fn zonal_dispersion(
    field: &GriddedField<f64>,
    config: &DispersionConfig,
) -> Result<GriddedField<f64>> {
    let spectrum = dispersion_spectrum(field, config)?;
    let power = spectrum.norm().select_range(FREQ_DIM, 0.0, f64::INFINITY)?;

    log::debug!(
        "Zonal dispersion spectrum: {} non-negative frequencies, {} wavenumbers",
        power.axis(FREQ_DIM)?.len(),
        power.axis(WAVENUMBER_DIM)?.len()
    );

    Ok(power)
}

/// Location of the largest value in a (freq, k) power spectrum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralPeak {
    /// Frequency of the peak, cycles per `dt`
    pub freq: f64,
    /// Zonal wavenumber of the peak
    pub k: f64,
    /// Spectral magnitude at the peak
    pub power: f64,
}

impl fmt::Display for SpectralPeak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "peak at freq={:.4}, k={:+}, power={:.4}",
            self.freq, self.k, self.power
        )
    }
}

/// Find the strongest (freq, k) component of a dispersion power spectrum,
/// over all pass-through axes.
pub fn find_peak(power: &GriddedField<f64>) -> Result<SpectralPeak> {
    let f_ax = power.axis_index(FREQ_DIM)?;
    let k_ax = power.axis_index(WAVENUMBER_DIM)?;

    let mut best: Option<(ndarray::IxDyn, f64)> = None;
    for (index, &value) in power.data().indexed_iter() {
        if best.as_ref().map_or(true, |(_, b)| value > *b) {
            best = Some((index, value));
        }
    }
    let (index, value) =
        best.ok_or_else(|| AnalysisError::InvalidInput("empty power spectrum".to_string()))?;

    Ok(SpectralPeak {
        freq: power.axes()[f_ax].coords[index[f_ax]],
        k: power.axes()[k_ax].coords[index[k_ax]],
        power: value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    /// cos(2π(k lon/360 - f t)), propagating eastward for k, f > 0
    fn travelling_wave(nt: usize, dt: f64, nx: usize, k: f64, f: f64) -> GriddedField<f64> {
        let axes = vec![
            Axis::new(TIME_DIM, (0..nt).map(|i| i as f64 * dt).collect()),
            Axis::linspace(LON_DIM, 0.0, 360.0, nx, false),
        ];
        GriddedField::from_fn(axes, |c| (2.0 * PI * (k * c[1] / 360.0 - f * c[0])).cos()).unwrap()
    }

    fn value_at(power: &GriddedField<f64>, freq: f64, k: f64) -> f64 {
        let fi = power
            .coords(FREQ_DIM)
            .unwrap()
            .iter()
            .position(|&v| (v - freq).abs() < 1e-9)
            .unwrap();
        let ki = power
            .coords(WAVENUMBER_DIM)
            .unwrap()
            .iter()
            .position(|&v| (v - k).abs() < 1e-9)
            .unwrap();
        *power.get(&[fi, ki]).unwrap()
    }

    #[test]
    fn test_eastward_wave_at_positive_k() {
        let field = travelling_wave(40, 0.5, 24, 3.0, 0.2);
        let power = zonal_dispersion(&field, &DispersionConfig::new(0.5).unwrap()).unwrap();

        assert_eq!(power.dims(), vec![FREQ_DIM, WAVENUMBER_DIM]);
        assert!((value_at(&power, 0.2, 3.0) - 480.0).abs() < 1e-8);
        assert!(value_at(&power, 0.2, -3.0) < 1e-8);

        let peak = find_peak(&power).unwrap();
        assert!((peak.freq - 0.2).abs() < 1e-9);
        assert_eq!(peak.k, 3.0);
    }

    #[test]
    fn test_westward_wave_at_negative_k() {
        let field = travelling_wave(40, 0.5, 24, -3.0, 0.2);
        let power = zonal_dispersion(&field, &DispersionConfig::new(0.5).unwrap()).unwrap();

        assert!((value_at(&power, 0.2, -3.0) - 480.0).abs() < 1e-8);
        assert!(value_at(&power, 0.2, 3.0) < 1e-8);
    }

    #[test]
    fn test_transform_convention_flips_direction() {
        let field = travelling_wave(40, 0.5, 24, 3.0, 0.2);
        let config = DispersionConfig::new(0.5)
            .unwrap()
            .with_convention(SignConvention::Transform);
        let power = zonal_dispersion(&field, &config).unwrap();

        assert!((value_at(&power, 0.2, -3.0) - 480.0).abs() < 1e-8);
        assert!(value_at(&power, 0.2, 3.0) < 1e-8);
    }

    #[test]
    fn test_hermitian_symmetry() {
        for (nt, nx) in [(9usize, 11usize), (10, 12)] {
            let axes = vec![
                Axis::indices(TIME_DIM, nt),
                Axis::new("lat", vec![-5.0, 5.0]),
                Axis::linspace(LON_DIM, 0.0, 360.0, nx, false),
            ];
            let field = GriddedField::from_fn(axes, |c| {
                (0.7 * c[0]).sin() * (1.0 + c[1] / 10.0) + (c[2].to_radians() * 2.0 + c[0]).cos()
                    + 0.01 * c[0] * c[0]
            })
            .unwrap();

            let spectrum = dispersion_spectrum(&field, &DispersionConfig::default()).unwrap();
            let freqs = spectrum.coords(FREQ_DIM).unwrap().to_vec();
            let ks = spectrum.coords(WAVENUMBER_DIM).unwrap().to_vec();
            let find = |coords: &[f64], v: f64| coords.iter().position(|&c| (c + v).abs() < 1e-12);

            for (i, &om) in freqs.iter().enumerate() {
                for (j, &k) in ks.iter().enumerate() {
                    let (Some(ni), Some(nj)) = (find(&freqs, om), find(&ks, k)) else {
                        continue;
                    };
                    for lat in 0..2 {
                        let a = spectrum.get(&[i, lat, j]).unwrap();
                        let b = spectrum.get(&[ni, lat, nj]).unwrap();
                        assert!(
                            (a - b.conj()).norm() < 1e-9,
                            "S({}, {}) = {} but S(-w, -k) = {}",
                            om,
                            k,
                            a,
                            b
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_positive_frequencies_only() {
        for nt in [9usize, 10] {
            let axes = vec![
                Axis::indices("lat", 3),
                Axis::indices(TIME_DIM, nt),
                Axis::linspace(LON_DIM, 0.0, 360.0, 8, false),
            ];
            let field = GriddedField::from_fn(axes, |c| c[0] + c[1] * c[2]).unwrap();
            let config = DispersionConfig::new(0.25).unwrap();
            let power = zonal_dispersion(&field, &config).unwrap();

            assert_eq!(power.dims(), vec!["lat", FREQ_DIM, WAVENUMBER_DIM]);
            assert_eq!(power.coords("lat").unwrap(), &[0.0, 1.0, 2.0]);

            let freqs = power.coords(FREQ_DIM).unwrap();
            assert_eq!(freqs.len(), (nt + 1) / 2);
            assert!(freqs.iter().all(|&f| f >= 0.0));
            assert_eq!(freqs[0], 0.0);
            assert!((freqs[1] - 1.0 / (nt as f64 * 0.25)).abs() < 1e-12);

            assert_eq!(
                power.coords(WAVENUMBER_DIM).unwrap(),
                &[-4.0, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0]
            );
            assert!(power.data().iter().all(|&p| p >= 0.0));
        }
    }

    #[test]
    fn test_invalid_input() {
        let axes = vec![Axis::indices("lat", 3), Axis::indices(LON_DIM, 4)];
        let field = GriddedField::from_fn(axes, |_| 1.0).unwrap();
        let err = zonal_dispersion(&field, &DispersionConfig::default()).unwrap_err();
        assert!(err.is_invalid_input());

        let axes = vec![Axis::indices(TIME_DIM, 3), Axis::indices("lat", 4)];
        let field = GriddedField::from_fn(axes, |_| 1.0).unwrap();
        assert!(zonal_dispersion(&field, &DispersionConfig::default())
            .unwrap_err()
            .is_invalid_input());

        assert!(DispersionConfig::new(0.0).unwrap_err().is_configuration());
        assert!(DispersionConfig::new(-1.0).is_err());
        assert!(DispersionConfig::new(f64::NAN).is_err());
    }
}
