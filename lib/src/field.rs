//! Labeled N-dimensional fields
//!
//! A `GriddedField` pairs an `ndarray::ArrayD` with one named coordinate axis
//! per array dimension, in the same order as the array's dimensions. This is
//! the data model every analysis routine in the crate consumes and produces.

use crate::error::{AnalysisError, Result};
use ndarray::{ArrayD, Axis as ArrayAxis, IxDyn, Zip};
use num_complex::Complex64;
use std::collections::HashSet;
use std::fmt;

/// A named coordinate axis
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    /// Axis name, unique within a field
    pub name: String,
    /// Coordinate value of each sample along the axis
    pub coords: Vec<f64>,
}

impl Axis {
    /// Create a new axis
    pub fn new(name: impl Into<String>, coords: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            coords,
        }
    }

    /// Evenly spaced coordinates from `start` towards `stop`.
    ///
    /// With `endpoint = true` the last coordinate is `stop`; otherwise the
    /// interval is half open, which is the natural layout for a full
    /// revolution of longitude.
    pub fn linspace(name: impl Into<String>, start: f64, stop: f64, n: usize, endpoint: bool) -> Self {
        let divisions = if endpoint { n.saturating_sub(1) } else { n };
        let step = if divisions == 0 {
            0.0
        } else {
            (stop - start) / divisions as f64
        };
        let coords = (0..n).map(|i| start + i as f64 * step).collect();
        Self::new(name, coords)
    }

    /// Sample indices 0, 1, ..., n-1 as coordinates
    pub fn indices(name: impl Into<String>, n: usize) -> Self {
        Self::new(name, (0..n).map(|i| i as f64).collect())
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Whether the axis has no samples
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Spacing between the first two coordinates
    pub fn spacing(&self) -> Option<f64> {
        match self.coords.as_slice() {
            [first, second, ..] => Some(second - first),
            _ => None,
        }
    }

    /// Whether the coordinates are strictly increasing or strictly decreasing
    pub fn is_monotonic(&self) -> bool {
        let increasing = self.coords.windows(2).all(|w| w[1] > w[0]);
        let decreasing = self.coords.windows(2).all(|w| w[1] < w[0]);
        increasing || decreasing
    }

    /// Whether all consecutive spacings match the first one within `tolerance`
    pub fn is_uniform(&self, tolerance: f64) -> bool {
        match self.spacing() {
            Some(dx) => self
                .coords
                .windows(2)
                .all(|w| ((w[1] - w[0]) - dx).abs() <= tolerance * dx.abs().max(1.0)),
            None => true,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.coords.first(), self.coords.last()) {
            (Some(first), Some(last)) => write!(
                f,
                "{}[{}] {:.4} .. {:.4}",
                self.name,
                self.len(),
                first,
                last
            ),
            _ => write!(f, "{}[0]", self.name),
        }
    }
}

/// An N-dimensional array with named, ordered axes
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedField<T> {
    data: ArrayD<T>,
    axes: Vec<Axis>,
}

/// A field holding complex values, e.g. a raw Fourier transform
pub type ComplexField = GriddedField<Complex64>;

fn check_axes(shape: &[usize], axes: &[Axis]) -> Result<()> {
    if shape.len() != axes.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "array has {} dimensions but {} axes were given",
            shape.len(),
            axes.len()
        )));
    }

    let mut seen = HashSet::new();
    for (len, axis) in shape.iter().zip(axes) {
        if *len != axis.len() {
            return Err(AnalysisError::InvalidInput(format!(
                "axis '{}' has {} coordinates but the array has length {}",
                axis.name,
                axis.len(),
                len
            )));
        }
        if !seen.insert(axis.name.as_str()) {
            return Err(AnalysisError::InvalidInput(format!(
                "duplicate axis name '{}'",
                axis.name
            )));
        }
    }

    Ok(())
}

impl<T: Clone> GriddedField<T> {
    /// Create a field from an array and its axes
    pub fn new(data: ArrayD<T>, axes: Vec<Axis>) -> Result<Self> {
        check_axes(data.shape(), &axes)?;
        Ok(Self { data, axes })
    }

    /// Create a field from row-major values laid out along `axes`
    pub fn from_shape_vec(axes: Vec<Axis>, values: Vec<T>) -> Result<Self> {
        let shape: Vec<usize> = axes.iter().map(Axis::len).collect();
        let data = ArrayD::from_shape_vec(IxDyn(&shape), values)
            .map_err(|e| AnalysisError::InvalidInput(format!("bad field shape: {}", e)))?;
        Self::new(data, axes)
    }

    /// Create a field by evaluating `f` at the coordinates of every grid point.
    ///
    /// The closure receives one coordinate value per axis, in axis order.
    pub fn from_fn<F>(axes: Vec<Axis>, mut f: F) -> Result<Self>
    where
        F: FnMut(&[f64]) -> T,
    {
        let shape: Vec<usize> = axes.iter().map(Axis::len).collect();
        let mut point = vec![0.0; axes.len()];
        let data = ArrayD::from_shape_fn(IxDyn(&shape), |index| {
            for (d, axis) in axes.iter().enumerate() {
                point[d] = axis.coords[index[d]];
            }
            f(&point)
        });
        Self::new(data, axes)
    }

    /// The underlying array
    pub fn data(&self) -> &ArrayD<T> {
        &self.data
    }

    /// Consume the field, returning the array and the axes
    pub fn into_parts(self) -> (ArrayD<T>, Vec<Axis>) {
        (self.data, self.axes)
    }

    /// All axes, in array order
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Axis names, in array order
    pub fn dims(&self) -> Vec<&str> {
        self.axes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.axes.len()
    }

    /// Array shape
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Whether the field has an axis called `name`
    pub fn has_axis(&self, name: &str) -> bool {
        self.axes.iter().any(|a| a.name == name)
    }

    /// Position of the axis called `name`
    pub fn axis_index(&self, name: &str) -> Result<usize> {
        self.axes
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| AnalysisError::MissingAxis {
                axis: name.to_string(),
                available: self.axes.iter().map(|a| a.name.clone()).collect(),
            })
    }

    /// The axis called `name`
    pub fn axis(&self, name: &str) -> Result<&Axis> {
        let index = self.axis_index(name)?;
        Ok(&self.axes[index])
    }

    /// Coordinates of the axis called `name`
    pub fn coords(&self, name: &str) -> Result<&[f64]> {
        Ok(&self.axis(name)?.coords)
    }

    /// Value at a multi-dimensional index
    pub fn get(&self, index: &[usize]) -> Option<&T> {
        self.data.get(index)
    }

    /// Apply `f` to every value, keeping the axes
    pub fn map<U, F>(&self, f: F) -> GriddedField<U>
    where
        F: FnMut(&T) -> U,
    {
        GriddedField {
            data: self.data.map(f),
            axes: self.axes.clone(),
        }
    }

    /// Combine two fields on the same grid point by point.
    ///
    /// Both fields must have the same axis names and shape; coordinates are
    /// taken from `self`.
    pub fn zip_with<F>(&self, other: &GriddedField<T>, mut f: F) -> Result<GriddedField<T>>
    where
        F: FnMut(&T, &T) -> T,
    {
        if self.dims() != other.dims() || self.shape() != other.shape() {
            return Err(AnalysisError::InvalidInput(format!(
                "fields are not on the same grid: {:?}{:?} vs {:?}{:?}",
                self.dims(),
                self.shape(),
                other.dims(),
                other.shape()
            )));
        }

        let data = Zip::from(&self.data)
            .and(&other.data)
            .map_collect(|a, b| f(a, b));

        Ok(GriddedField {
            data,
            axes: self.axes.clone(),
        })
    }

    /// Replace the axis at position `index`.
    ///
    /// The new axis must have the same length; its name must not clash with
    /// another axis.
    pub fn with_axis(mut self, index: usize, axis: Axis) -> Result<Self> {
        if index >= self.axes.len() {
            return Err(AnalysisError::InvalidInput(format!(
                "axis position {} out of range for {} dimensions",
                index,
                self.axes.len()
            )));
        }
        let mut axes = self.axes.clone();
        axes[index] = axis;
        check_axes(self.data.shape(), &axes)?;
        self.axes = axes;
        Ok(self)
    }

    /// Rename the axis `from` to `to`
    pub fn rename_axis(self, from: &str, to: &str) -> Result<Self> {
        let index = self.axis_index(from)?;
        let coords = self.axes[index].coords.clone();
        self.with_axis(index, Axis::new(to, coords))
    }

    /// Replace the coordinates of the axis `name`
    pub fn assign_coords(self, name: &str, coords: Vec<f64>) -> Result<Self> {
        let index = self.axis_index(name)?;
        self.with_axis(index, Axis::new(name, coords))
    }

    /// Select samples by position along the axis `name`, in the given order
    pub fn select_indices(&self, name: &str, indices: &[usize]) -> Result<Self> {
        let ax = self.axis_index(name)?;
        let len = self.axes[ax].len();
        if let Some(bad) = indices.iter().find(|&&i| i >= len) {
            return Err(AnalysisError::InvalidInput(format!(
                "index {} out of range for axis '{}' of length {}",
                bad, name, len
            )));
        }

        let data = self.data.select(ArrayAxis(ax), indices);
        let mut axes = self.axes.clone();
        axes[ax].coords = indices.iter().map(|&i| self.axes[ax].coords[i]).collect();

        Ok(Self { data, axes })
    }

    /// Select the samples whose coordinate lies in `[lo, hi]` along `name`.
    ///
    /// The selection keeps the original sample order and does not depend on
    /// whether the axis is ascending or descending.
    pub fn select_range(&self, name: &str, lo: f64, hi: f64) -> Result<Self> {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let indices: Vec<usize> = self
            .coords(name)?
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c >= lo && c <= hi)
            .map(|(i, _)| i)
            .collect();
        self.select_indices(name, &indices)
    }
}

impl GriddedField<f64> {
    /// Multiply every lane along `name` by `weights`
    pub fn scale_along(&self, name: &str, weights: &[f64]) -> Result<Self> {
        let ax = self.axis_index(name)?;
        if weights.len() != self.axes[ax].len() {
            return Err(AnalysisError::InvalidInput(format!(
                "{} weights given for axis '{}' of length {}",
                weights.len(),
                name,
                self.axes[ax].len()
            )));
        }

        let mut data = self.data.clone();
        for mut lane in data.lanes_mut(ArrayAxis(ax)) {
            for (value, weight) in lane.iter_mut().zip(weights) {
                *value *= weight;
            }
        }

        Ok(Self {
            data,
            axes: self.axes.clone(),
        })
    }

    /// Average over the axis `name`, removing it from the field
    pub fn mean_axis(&self, name: &str) -> Result<Self> {
        let ax = self.axis_index(name)?;
        let data = self.data.mean_axis(ArrayAxis(ax)).ok_or_else(|| {
            AnalysisError::InvalidInput(format!("cannot average over empty axis '{}'", name))
        })?;
        let mut axes = self.axes.clone();
        axes.remove(ax);
        Ok(Self { data, axes })
    }

    /// Deviation from the mean along `name`, keeping the field's shape
    pub fn anomaly(&self, name: &str) -> Result<Self> {
        let ax = self.axis_index(name)?;
        let mean = self
            .data
            .mean_axis(ArrayAxis(ax))
            .ok_or_else(|| {
                AnalysisError::InvalidInput(format!("cannot average over empty axis '{}'", name))
            })?
            .insert_axis(ArrayAxis(ax));
        Ok(Self {
            data: &self.data - &mean,
            axes: self.axes.clone(),
        })
    }

    /// Promote to a complex field with zero imaginary part
    pub fn to_complex(&self) -> ComplexField {
        self.map(|&v| Complex64::new(v, 0.0))
    }

    /// Largest absolute value, 0 for an empty field
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }
}

impl GriddedField<Complex64> {
    /// Magnitude of every value
    pub fn norm(&self) -> GriddedField<f64> {
        self.map(|c| c.norm())
    }

    /// Real part of every value
    pub fn re(&self) -> GriddedField<f64> {
        self.map(|c| c.re)
    }

    /// Imaginary part of every value
    pub fn im(&self) -> GriddedField<f64> {
        self.map(|c| c.im)
    }
}
