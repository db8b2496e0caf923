//! Grid utilities for latitude-longitude fields
//!
//! Recentring and periodic extension of the longitude axis, and resampling
//! onto coarser or finer lat/lon grids.

use crate::equatorial::LAT_DIM;
use crate::dispersion::LON_DIM;
use crate::error::{AnalysisError, Result};
use crate::field::{Axis, GriddedField};
use ndarray::{ArrayD, Axis as ArrayAxis, IxDyn};
use num_complex::Complex64;
use realfft::RealFftPlanner;

/// Options for moving the origin of a longitude axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonCentre {
    /// Longitude that becomes the new origin
    pub lon0: f64,
    /// Wrap the recentred axis to (-180, 180] instead of [0, 360)
    pub wrap: bool,
    /// Snap `lon0` to the nearest existing longitude first, so the new
    /// coordinates stay on the original grid
    pub nearest: bool,
}

impl Default for LonCentre {
    fn default() -> Self {
        Self {
            lon0: 0.0,
            wrap: false,
            nearest: false,
        }
    }
}

impl LonCentre {
    /// Recentre on `lon0`
    pub fn new(lon0: f64) -> Self {
        Self {
            lon0,
            ..Self::default()
        }
    }

    /// Wrap to (-180, 180]
    pub fn wrapped(mut self) -> Self {
        self.wrap = true;
        self
    }

    /// Snap the origin to the grid
    pub fn snapped(mut self) -> Self {
        self.nearest = true;
        self
    }
}

/// Index of the coordinate closest to `target`
fn nearest_index(coords: &[f64], target: f64) -> Option<usize> {
    coords
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - target).abs().total_cmp(&(*b - target).abs()))
        .map(|(i, _)| i)
}

/// Move the origin of the longitude axis `dim` to `centre.lon0`.
///
/// Longitudes are shifted and wrapped into [0, 360) (or (-180, 180]), then
/// the axis is reordered so the new coordinates ascend.
pub fn center_lon(
    field: &GriddedField<f64>,
    dim: &str,
    centre: &LonCentre,
) -> Result<GriddedField<f64>> {
    let coords = field.coords(dim)?;

    let lon0 = if centre.nearest {
        match nearest_index(coords, centre.lon0) {
            Some(i) => coords[i],
            None => centre.lon0,
        }
    } else {
        centre.lon0
    };

    let shifted: Vec<f64> = coords
        .iter()
        .map(|&lon| {
            let lon = (lon - lon0 + 360.0).rem_euclid(360.0);
            if centre.wrap && lon > 180.0 {
                lon - 360.0
            } else {
                lon
            }
        })
        .collect();

    let mut order: Vec<usize> = (0..shifted.len()).collect();
    order.sort_by(|&a, &b| shifted[a].total_cmp(&shifted[b]));

    log::debug!(
        "Recentring '{}' on {} (wrap: {})",
        dim,
        lon0,
        centre.wrap
    );

    let sorted = order.iter().map(|&i| shifted[i]).collect();
    field.select_indices(dim, &order)?.assign_coords(dim, sorted)
}

/// Recentre `lon` on zero and wrap to (-180, 180]
pub fn centre_zero(field: &GriddedField<f64>) -> Result<GriddedField<f64>> {
    center_lon(field, LON_DIM, &LonCentre::new(0.0).wrapped())
}

/// Prepend the last longitude, shifted by -360, so the field wraps around
pub fn make_lon_periodic(field: &GriddedField<f64>) -> Result<GriddedField<f64>> {
    let coords = field.coords(LON_DIM)?;
    let n = coords.len();
    if n == 0 {
        return Err(AnalysisError::InvalidInput(
            "cannot extend an empty longitude axis".to_string(),
        ));
    }

    let mut indices = Vec::with_capacity(n + 1);
    indices.push(n - 1);
    indices.extend(0..n);

    let mut extended = Vec::with_capacity(n + 1);
    extended.push(coords[n - 1] - 360.0);
    extended.extend_from_slice(coords);

    field
        .select_indices(LON_DIM, &indices)?
        .assign_coords(LON_DIM, extended)
}

/// Resample `field` to `num` points along `dim` in Fourier space.
///
/// The axis is assumed periodic and evenly spaced. The spectrum is truncated
/// or zero-padded, splitting or folding the Nyquist component as needed. New
/// coordinates start at the original first coordinate with spacing
/// `dx · n / num`.
pub fn fourier_resample(
    field: &GriddedField<f64>,
    dim: &str,
    num: usize,
) -> Result<GriddedField<f64>> {
    let ax = field.axis_index(dim)?;
    let source = &field.axes()[ax];
    let nx = source.len();

    if num == 0 {
        return Err(AnalysisError::Configuration(format!(
            "cannot resample '{}' to zero points",
            dim
        )));
    }
    if nx == 0 {
        return Err(AnalysisError::InvalidInput(format!(
            "cannot resample empty axis '{}'",
            dim
        )));
    }

    let mut planner = RealFftPlanner::<f64>::new();
    let r2c = planner.plan_fft_forward(nx);
    let c2r = planner.plan_fft_inverse(num);

    let mut input = r2c.make_input_vec();
    let mut spectrum = r2c.make_output_vec();
    let mut padded = c2r.make_input_vec();
    let mut output = c2r.make_output_vec();

    let n = nx.min(num);
    let nyquist = n / 2 + 1;

    let mut shape = field.shape().to_vec();
    shape[ax] = num;
    let mut data = ArrayD::<f64>::zeros(IxDyn(&shape));

    for (lane_in, mut lane_out) in field
        .data()
        .lanes(ArrayAxis(ax))
        .into_iter()
        .zip(data.lanes_mut(ArrayAxis(ax)))
    {
        for (i, v) in input.iter_mut().zip(lane_in.iter()) {
            *i = *v;
        }
        r2c.process(&mut input, &mut spectrum)
            .map_err(|e| AnalysisError::Fft(e.to_string()))?;

        padded.fill(Complex64::new(0.0, 0.0));
        padded[..nyquist].copy_from_slice(&spectrum[..nyquist]);
        if n % 2 == 0 {
            if num < nx {
                padded[n / 2] *= 2.0;
            } else if nx < num {
                padded[n / 2] *= 0.5;
            }
        }

        // A real signal has a real DC term, and a real Nyquist term for even lengths
        padded[0].im = 0.0;
        if num % 2 == 0 {
            padded[num / 2].im = 0.0;
        }

        c2r.process(&mut padded, &mut output)
            .map_err(|e| AnalysisError::Fft(e.to_string()))?;

        for (o, v) in lane_out.iter_mut().zip(&output) {
            *o = v / nx as f64;
        }
    }

    let dx = source.spacing().unwrap_or(0.0);
    let start = source.coords[0];
    let coords = (0..num)
        .map(|i| start + i as f64 * dx * nx as f64 / num as f64)
        .collect();

    log::debug!("Fourier resampled '{}' from {} to {} points", dim, nx, num);

    let mut axes = field.axes().to_vec();
    axes[ax] = Axis::new(dim, coords);
    GriddedField::new(data, axes)
}

/// Bracketing indices and weight of the upper neighbour for linear
/// interpolation of `target` on monotonic `coords`
fn bracket(coords: &[f64], target: f64) -> Option<(usize, usize, f64)> {
    if coords.len() == 1 {
        return if (coords[0] - target).abs() <= 1e-9 * coords[0].abs().max(1.0) {
            Some((0, 0, 0.0))
        } else {
            None
        };
    }

    let span = (coords[coords.len() - 1] - coords[0]).abs();
    let slack = 1e-9 * span.max(1.0);
    coords.windows(2).enumerate().find_map(|(i, w)| {
        let (lo, hi) = if w[0] <= w[1] { (w[0], w[1]) } else { (w[1], w[0]) };
        if target >= lo - slack && target <= hi + slack {
            let weight = ((target - w[0]) / (w[1] - w[0])).clamp(0.0, 1.0);
            Some((i, i + 1, weight))
        } else {
            None
        }
    })
}

/// Linearly interpolate `field` along `dim` onto `targets`.
///
/// The axis must be monotonic. Targets outside its range are rejected.
pub fn interp_linear(
    field: &GriddedField<f64>,
    dim: &str,
    targets: &[f64],
) -> Result<GriddedField<f64>> {
    let ax = field.axis_index(dim)?;
    let source = &field.axes()[ax];

    if source.is_empty() {
        return Err(AnalysisError::InvalidInput(format!(
            "cannot interpolate along empty axis '{}'",
            dim
        )));
    }
    if !source.is_monotonic() {
        return Err(AnalysisError::InvalidInput(format!(
            "axis '{}' must be monotonic for interpolation",
            dim
        )));
    }

    let brackets = targets
        .iter()
        .map(|&t| {
            bracket(&source.coords, t).ok_or_else(|| {
                AnalysisError::InvalidInput(format!(
                    "{} = {} lies outside the range of the data ({})",
                    dim, t, source
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut shape = field.shape().to_vec();
    shape[ax] = targets.len();
    let mut data = ArrayD::<f64>::zeros(IxDyn(&shape));

    for (lane_in, mut lane_out) in field
        .data()
        .lanes(ArrayAxis(ax))
        .into_iter()
        .zip(data.lanes_mut(ArrayAxis(ax)))
    {
        for (out, &(i0, i1, w)) in lane_out.iter_mut().zip(&brackets) {
            *out = (1.0 - w) * lane_in[i0] + w * lane_in[i1];
        }
    }

    let mut axes = field.axes().to_vec();
    axes[ax] = Axis::new(dim, targets.to_vec());
    GriddedField::new(data, axes)
}

/// Select the grid points nearest to `targets` along `dim`.
///
/// The result keeps the coordinates of the selected grid points.
pub fn select_nearest(
    field: &GriddedField<f64>,
    dim: &str,
    targets: &[f64],
) -> Result<GriddedField<f64>> {
    let coords = field.coords(dim)?;
    let indices = targets
        .iter()
        .map(|&t| {
            nearest_index(coords, t).ok_or_else(|| {
                AnalysisError::InvalidInput(format!("axis '{}' has no samples", dim))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    field.select_indices(dim, &indices)
}

/// How `resample_latlon` builds values on the new grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleMethod {
    /// Fourier resampling along longitude, linear interpolation along latitude
    #[default]
    Interpolate,
    /// Nearest existing grid point
    Nearest,
}

/// Target grid for `resample_latlon`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResampleConfig {
    /// Number of latitudes; half the input's when unset
    pub nlat: Option<usize>,
    /// Number of longitudes; half the input's when unset
    pub nlon: Option<usize>,
    /// Explicit target latitudes, overriding `nlat`
    pub lats: Option<Vec<f64>>,
    /// Explicit target longitudes, overriding `nlon` (nearest method only;
    /// Fourier resampling fixes its own longitudes)
    pub lons: Option<Vec<f64>>,
    /// Resampling method
    pub method: ResampleMethod,
}

impl ResampleConfig {
    /// Resample to `nlat` x `nlon` points
    pub fn new(nlat: usize, nlon: usize, method: ResampleMethod) -> Self {
        Self {
            nlat: Some(nlat),
            nlon: Some(nlon),
            method,
            ..Self::default()
        }
    }
}

/// Evenly spaced targets between the extremes of `coords`, or the explicit
/// targets when given
fn target_coords(
    axis: &Axis,
    count: Option<usize>,
    explicit: Option<&Vec<f64>>,
) -> Result<Vec<f64>> {
    if let Some(values) = explicit {
        return Ok(values.clone());
    }

    let n = count.unwrap_or(axis.len() / 2);
    if n == 0 {
        return Err(AnalysisError::Configuration(format!(
            "cannot resample '{}' to zero points",
            axis.name
        )));
    }

    let min = axis.coords.iter().copied().fold(f64::INFINITY, f64::min);
    let max = axis.coords.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut coords = Axis::linspace(axis.name.as_str(), min, max, n, true).coords;
    // Keep the last target exactly on the data range
    if let Some(last) = coords.last_mut() {
        if n > 1 {
            *last = max;
        }
    }
    Ok(coords)
}

/// Resample a field onto a new latitude-longitude grid
pub fn resample_latlon(
    field: &GriddedField<f64>,
    config: &ResampleConfig,
) -> Result<GriddedField<f64>> {
    let lat = field.axis(LAT_DIM)?;
    let lon = field.axis(LON_DIM)?;
    let new_lat = target_coords(lat, config.nlat, config.lats.as_ref())?;

    log::debug!(
        "Resampling {:?}{:?} with {:?}",
        field.dims(),
        field.shape(),
        config.method
    );

    match config.method {
        ResampleMethod::Interpolate => {
            let nlon = config.nlon.unwrap_or(lon.len() / 2);
            let resampled = fourier_resample(field, LON_DIM, nlon)?;
            interp_linear(&resampled, LAT_DIM, &new_lat)
        }
        ResampleMethod::Nearest => {
            let new_lon = target_coords(lon, config.nlon, config.lons.as_ref())?;
            let resampled = select_nearest(field, LAT_DIM, &new_lat)?;
            select_nearest(&resampled, LON_DIM, &new_lon)
        }
    }
}
