//! Iscaxr Library
//!
//! Spectral analysis of gridded atmospheric model output. Fields are
//! n-dimensional arrays with named coordinate axes (`time`, `lat`, `lon`, ...).
//! Provides N-dimensional Fourier transforms over named axes, zonal
//! wavenumber-frequency dispersion spectra, equatorial symmetric and
//! antisymmetric wave spectra, cosine-squared tapering and lat/lon grid
//! utilities.

pub mod dispersion;
pub mod domain;
pub mod equatorial;
pub mod error;
pub mod field;
pub mod fourier;
pub mod synthetic;
pub mod window;

pub use dispersion::{
    dispersion_spectrum, find_peak, zonal_dispersion, DispersionConfig, SignConvention,
    SpectralPeak,
};
pub use domain::{
    center_lon, make_lon_periodic, resample_latlon, LonCentre, ResampleConfig, ResampleMethod,
};
pub use equatorial::{equatorial_waves, EquatorialConfig};
pub use error::{AnalysisError, Result};
pub use field::{Axis, ComplexField, GriddedField};
pub use fourier::{fft, ifft, AxisSelection};
pub use num_complex::Complex64;
pub use window::{window_taper, DEFAULT_TAPER_WIDTH};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
///
/// Sets up logging when the `env_logger` feature is enabled.
pub fn init() {
    #[cfg(all(not(target_arch = "wasm32"), feature = "env_logger"))]
    {
        // A second call (e.g. from several tests) is harmless
        let _ = env_logger::try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        init();
        init();
        assert!(!VERSION.is_empty());
    }
}
