//! CastShadow Rust Extensions
//!
//! Synthesizes a cast shadow for a cutout foreground subject composited
//! onto a background, driven by a light direction (azimuth + elevation) and
//! an optional depth map, with Python bindings via PyO3 and WASM bindings
//! for JavaScript.
//!
//! ## Image Format
//! Every layer is RGBA8: an array of shape (height, width, 4) with u8
//! channels (0-255). Foreground, background and depth map must share the
//! same width and height.
//!
//! ## Pipeline
//! alpha mask -> contact profile -> light vector -> projection -> blur ->
//! composite. See [`layer_effects::cast_shadow`] for the entry points.
//!
//! ```ignore
//! use castshadow_rust::{synthesize_shadow, ShadowParams};
//!
//! let params = ShadowParams::default().with_angle(30.0).with_elevation(40.0);
//! let layers = synthesize_shadow(fg.view(), bg.view(), None, &params)?;
//! ```

pub mod error;
pub mod filters;
pub mod layer_effects;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::{Result, ShadowError};
pub use layer_effects::cast_shadow::{
    synthesize_shadow, synthesize_shadow_cancellable, ShadowLayers, ShadowParams,
};
pub use layer_effects::contact::{contact_profile, contact_profile_checked, ContactProfile};
pub use layer_effects::light::LightVector;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::prelude::*;

    use crate::layer_effects::cast_shadow::{
        synthesize_shadow, ShadowParams, DEFAULT_ANGLE, DEFAULT_BLUR_RADIUS, DEFAULT_ELEVATION,
    };
    use crate::layer_effects::contact::contact_profile_checked;
    use crate::layer_effects::light::LightVector;

    // ========================================================================
    // Cast Shadow
    // ========================================================================

    /// Synthesize a cast shadow and composite it.
    ///
    /// # Arguments
    /// * `foreground` - RGBA cutout (height, width, 4) as u8
    /// * `background` - RGBA background, same size
    /// * `depth` - Optional grayscale depth map (red channel read, bright = near)
    /// * `angle` - Light azimuth in degrees (0 = shadow points down)
    /// * `elevation` - Light elevation in degrees (0-90)
    /// * `blur_radius` - Shadow blur sigma in pixels
    ///
    /// # Returns
    /// Tuple (mask, shadow, composite), all RGBA u8 of the input size
    #[pyfunction]
    #[pyo3(signature = (foreground, background, depth=None, angle=DEFAULT_ANGLE, elevation=DEFAULT_ELEVATION, blur_radius=DEFAULT_BLUR_RADIUS))]
    pub fn cast_shadow_rgba<'py>(
        py: Python<'py>,
        foreground: PyReadonlyArray3<'py, u8>,
        background: PyReadonlyArray3<'py, u8>,
        depth: Option<PyReadonlyArray3<'py, u8>>,
        angle: f64,
        elevation: f64,
        blur_radius: f32,
    ) -> PyResult<(
        Bound<'py, PyArray3<u8>>,
        Bound<'py, PyArray3<u8>>,
        Bound<'py, PyArray3<u8>>,
    )> {
        let params = ShadowParams {
            angle_degrees: angle,
            elevation_degrees: elevation,
            blur_radius,
        };
        let depth_view = depth.as_ref().map(|d| d.as_array());
        let layers = synthesize_shadow(
            foreground.as_array(),
            background.as_array(),
            depth_view,
            &params,
        )?;

        Ok((
            layers.mask.into_pyarray(py),
            layers.shadow.into_pyarray(py),
            layers.composite.into_pyarray(py),
        ))
    }

    /// Shadow displacement (dx, dy) for a light direction.
    #[pyfunction]
    #[pyo3(signature = (angle=DEFAULT_ANGLE, elevation=DEFAULT_ELEVATION))]
    pub fn light_vector(angle: f64, elevation: f64) -> (f64, f64) {
        let v = LightVector::from_angles(angle, elevation);
        (v.dx, v.dy)
    }

    /// Lowest visible row per column; `height` for empty columns.
    ///
    /// Raises ValueError unless `image` has 4 channels.
    #[pyfunction]
    pub fn contact_profile(image: PyReadonlyArray3<'_, u8>) -> PyResult<Vec<usize>> {
        Ok(contact_profile_checked(image.as_array())?.into_vec())
    }

    #[pymodule]
    pub fn castshadow_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(cast_shadow_rgba, m)?)?;
        m.add_function(wrap_pyfunction!(light_vector, m)?)?;
        m.add_function(wrap_pyfunction!(contact_profile, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::castshadow_rust;
