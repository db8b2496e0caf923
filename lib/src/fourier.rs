//! General-purpose Fourier transforms over named axes
//!
//! Transforms any subset of a field's axes with `rustfft`, centres the zero
//! frequency of each transformed axis and relabels it `F_<name>`.

use crate::error::{AnalysisError, Result};
use crate::field::{Axis, ComplexField, GriddedField};
use ndarray::{ArrayD, Axis as ArrayAxis};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

/// Prefix given to the name of a transformed axis
pub const TRANSFORMED_PREFIX: &str = "F_";

/// Which axes of a field a transform runs over
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AxisSelection {
    /// Every axis of the field
    #[default]
    All,
    /// Axes given by name
    Named(Vec<String>),
    /// Axes given by position; negative positions count from the last axis
    Positional(Vec<isize>),
}

impl AxisSelection {
    /// Select axes by name
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AxisSelection::Named(names.into_iter().map(Into::into).collect())
    }

    /// Select axes by position
    pub fn positional(positions: impl Into<Vec<isize>>) -> Self {
        AxisSelection::Positional(positions.into())
    }

    /// Build a selection from optional by-name and by-position lists.
    ///
    /// At most one of them may be given; neither means all axes.
    pub fn from_options(dims: Option<Vec<String>>, axes: Option<Vec<isize>>) -> Result<Self> {
        match (dims, axes) {
            (Some(_), Some(_)) => Err(AnalysisError::Configuration(
                "cannot select transform axes both by name and by position".to_string(),
            )),
            (Some(dims), None) => Ok(AxisSelection::Named(dims)),
            (None, Some(axes)) => Ok(AxisSelection::Positional(axes)),
            (None, None) => Ok(AxisSelection::All),
        }
    }

    /// Resolve the selection to array positions on `field`
    pub fn resolve<T: Clone>(&self, field: &GriddedField<T>) -> Result<Vec<usize>> {
        let ndim = field.ndim();
        let positions = match self {
            AxisSelection::All => (0..ndim).collect(),
            AxisSelection::Named(names) => names
                .iter()
                .map(|name| field.axis_index(name))
                .collect::<Result<Vec<_>>>()?,
            AxisSelection::Positional(axes) => axes
                .iter()
                .map(|&p| {
                    let resolved = if p < 0 { p + ndim as isize } else { p };
                    if resolved < 0 || resolved >= ndim as isize {
                        Err(AnalysisError::InvalidInput(format!(
                            "axis position {} out of range for {} dimensions",
                            p, ndim
                        )))
                    } else {
                        Ok(resolved as usize)
                    }
                })
                .collect::<Result<Vec<_>>>()?,
        };

        for (i, p) in positions.iter().enumerate() {
            if positions[..i].contains(p) {
                return Err(AnalysisError::InvalidInput(format!(
                    "axis '{}' selected more than once",
                    field.axes()[*p].name
                )));
            }
        }

        Ok(positions)
    }
}

/// Sample frequencies of an `n`-point DFT with sample spacing `d`, in
/// transform order: 0, 1, ..., then the negative frequencies.
pub fn fftfreq(n: usize, d: f64) -> Vec<f64> {
    let scale = 1.0 / (n as f64 * d);
    let positive = (n + 1) / 2;
    (0..n)
        .map(|i| {
            let k = if i < positive {
                i as isize
            } else {
                i as isize - n as isize
            };
            k as f64 * scale
        })
        .collect()
}

/// Move the zero-frequency entry to the centre
pub fn fftshift<T: Clone>(values: &[T]) -> Vec<T> {
    let mut shifted = values.to_vec();
    shifted.rotate_right(values.len() / 2);
    shifted
}

/// Undo `fftshift`
pub fn ifftshift<T: Clone>(values: &[T]) -> Vec<T> {
    let mut shifted = values.to_vec();
    shifted.rotate_left(values.len() / 2);
    shifted
}

/// Frequencies of an `n`-point DFT in centred (shifted) order
pub fn shifted_fftfreq(n: usize, d: f64) -> Vec<f64> {
    fftshift(&fftfreq(n, d))
}

/// Run `fft` over every lane of `data` along `ax`
pub(crate) fn transform_axis(data: &mut ArrayD<Complex64>, ax: usize, fft: &dyn Fft<f64>) {
    let n = data.shape()[ax];
    let mut buffer = vec![Complex64::new(0.0, 0.0); n];
    let mut scratch = vec![Complex64::new(0.0, 0.0); fft.get_inplace_scratch_len()];

    for mut lane in data.lanes_mut(ArrayAxis(ax)) {
        for (b, v) in buffer.iter_mut().zip(lane.iter()) {
            *b = *v;
        }
        fft.process_with_scratch(&mut buffer, &mut scratch);
        for (v, b) in lane.iter_mut().zip(&buffer) {
            *v = *b;
        }
    }
}

/// Rotate every lane along `ax` by half its length (fftshift or ifftshift)
pub(crate) fn shift_axis(data: &mut ArrayD<Complex64>, ax: usize, inverse: bool) {
    let n = data.shape()[ax];
    let mut buffer = vec![Complex64::new(0.0, 0.0); n];

    for mut lane in data.lanes_mut(ArrayAxis(ax)) {
        for (b, v) in buffer.iter_mut().zip(lane.iter()) {
            *b = *v;
        }
        if inverse {
            buffer.rotate_left(n / 2);
        } else {
            buffer.rotate_right(n / 2);
        }
        for (v, b) in lane.iter_mut().zip(&buffer) {
            *v = *b;
        }
    }
}

/// Fourier transform of a real field over the selected axes.
///
/// Each transformed axis is frequency-centred and renamed `F_<name>`. Its
/// coordinates are whole cycles over the axis span, unless the axis is listed
/// in `scale_dims`, in which case they are frequencies in inverse units of
/// the axis, derived from the first coordinate spacing.
pub fn fft(
    field: &GriddedField<f64>,
    selection: &AxisSelection,
    scale_dims: &[&str],
) -> Result<ComplexField> {
    fft_complex(&field.to_complex(), selection, scale_dims)
}

/// Fourier transform of a complex field; see [`fft`]
pub fn fft_complex(
    field: &ComplexField,
    selection: &AxisSelection,
    scale_dims: &[&str],
) -> Result<ComplexField> {
    let positions = selection.resolve(field)?;
    let scale_positions = scale_dims
        .iter()
        .map(|dim| field.axis_index(dim))
        .collect::<Result<Vec<_>>>()?;

    log::debug!(
        "Fourier transform over {:?} of field {:?}{:?}",
        positions
            .iter()
            .map(|&p| field.axes()[p].name.as_str())
            .collect::<Vec<_>>(),
        field.dims(),
        field.shape()
    );

    let (mut data, mut axes) = field.clone().into_parts();
    let mut planner = FftPlanner::<f64>::new();

    for &ax in &positions {
        let source = &field.axes()[ax];
        let n = source.len();
        if n == 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "cannot transform empty axis '{}'",
                source.name
            )));
        }

        let spacing = if scale_positions.contains(&ax) {
            let dx = source.spacing().ok_or_else(|| {
                AnalysisError::InvalidInput(format!(
                    "axis '{}' needs at least two samples to scale its frequencies",
                    source.name
                ))
            })?;
            if dx == 0.0 || !dx.is_finite() {
                return Err(AnalysisError::InvalidInput(format!(
                    "axis '{}' has invalid sample spacing {}",
                    source.name, dx
                )));
            }
            if !source.is_uniform(1e-6) {
                log::warn!(
                    "Axis '{}' is not evenly spaced; scaling by its first spacing {}",
                    source.name,
                    dx
                );
            }
            dx
        } else {
            1.0 / n as f64
        };

        let plan = planner.plan_fft_forward(n);
        transform_axis(&mut data, ax, plan.as_ref());
        shift_axis(&mut data, ax, false);

        axes[ax] = Axis::new(
            format!("{}{}", TRANSFORMED_PREFIX, source.name),
            shifted_fftfreq(n, spacing),
        );
    }

    GriddedField::new(data, axes)
}

/// Inverse of [`fft_complex`] over the selected axes of a spectrum.
///
/// Named selections may use either the transformed (`F_lon`) or the original
/// (`lon`) axis name. Each inverted axis loses its `F_` prefix and takes its
/// coordinates from the matching axis in `restore` (same name and length),
/// or sample indices when there is none.
pub fn ifft(
    spectrum: &ComplexField,
    selection: &AxisSelection,
    restore: &[Axis],
) -> Result<ComplexField> {
    let selection = match selection {
        AxisSelection::Named(names) => AxisSelection::Named(
            names
                .iter()
                .map(|name| {
                    let transformed = format!("{}{}", TRANSFORMED_PREFIX, name);
                    if !spectrum.has_axis(name) && spectrum.has_axis(&transformed) {
                        transformed
                    } else {
                        name.clone()
                    }
                })
                .collect(),
        ),
        other => other.clone(),
    };
    let positions = selection.resolve(spectrum)?;

    let (mut data, mut axes) = spectrum.clone().into_parts();
    let mut planner = FftPlanner::<f64>::new();

    for &ax in &positions {
        let source = &spectrum.axes()[ax];
        let n = source.len();
        if n == 0 {
            return Err(AnalysisError::InvalidInput(format!(
                "cannot invert empty axis '{}'",
                source.name
            )));
        }

        shift_axis(&mut data, ax, true);
        let plan = planner.plan_fft_inverse(n);
        transform_axis(&mut data, ax, plan.as_ref());

        let scale = 1.0 / n as f64;
        for mut lane in data.lanes_mut(ArrayAxis(ax)) {
            lane.mapv_inplace(|v| v * scale);
        }

        let name = source
            .name
            .strip_prefix(TRANSFORMED_PREFIX)
            .unwrap_or(source.name.as_str())
            .to_string();
        axes[ax] = restore
            .iter()
            .find(|a| a.name == name && a.len() == n)
            .cloned()
            .unwrap_or_else(|| Axis::indices(name, n));
    }

    GriddedField::new(data, axes)
}
