//! Cast shadow synthesis for a cutout subject on a background.
//!
//! Pipeline:
//! 1. Extract the alpha mask of the foreground (for display)
//! 2. Find each column's ground-contact row
//! 3. Turn azimuth + elevation into a light displacement
//! 4. Project visible pixels along it, optionally shortened by a depth map
//! 5. Blur the projected shadow
//! 6. Multiply the shadow onto the background and draw the foreground on top
//!
//! All inputs must share the foreground's width and height; nothing is
//! resized. Each call is independent and holds no state between calls.

use std::sync::atomic::{AtomicBool, Ordering};

use ndarray::{Array3, ArrayView3};

use super::compositor::composite_shadow;
use super::contact::contact_profile;
use super::light::LightVector;
use super::projector::project_shadow_cancellable;
use crate::error::{Result, ShadowError};
use crate::filters::blur::blur_shadow_rgba;
use crate::filters::core::{dims, ensure_rgba, ensure_same_dims};
use crate::filters::mask::alpha_mask_rgba;

/// Default light azimuth in degrees.
pub const DEFAULT_ANGLE: f64 = 45.0;
/// Default light elevation in degrees.
pub const DEFAULT_ELEVATION: f64 = 30.0;
/// Default blur standard deviation in pixels.
pub const DEFAULT_BLUR_RADIUS: f32 = 11.0;

/// Light and softening settings for one synthesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowParams {
    /// Compass-style azimuth; 0 casts the shadow straight down.
    pub angle_degrees: f64,
    /// Light elevation, expected in (0, 90]. Values <= 0 use the maximum
    /// shadow length.
    pub elevation_degrees: f64,
    /// Gaussian standard deviation of the shadow blur; 0 disables it.
    pub blur_radius: f32,
}

impl Default for ShadowParams {
    fn default() -> Self {
        Self {
            angle_degrees: DEFAULT_ANGLE,
            elevation_degrees: DEFAULT_ELEVATION,
            blur_radius: DEFAULT_BLUR_RADIUS,
        }
    }
}

impl ShadowParams {
    pub fn with_angle(mut self, angle_degrees: f64) -> Self {
        self.angle_degrees = angle_degrees;
        self
    }

    pub fn with_elevation(mut self, elevation_degrees: f64) -> Self {
        self.elevation_degrees = elevation_degrees;
        self
    }

    pub fn with_blur_radius(mut self, blur_radius: f32) -> Self {
        self.blur_radius = blur_radius;
        self
    }

    /// Reject non-finite angles and negative or non-finite blur radii.
    pub fn validate(&self) -> Result<()> {
        if !self.angle_degrees.is_finite() {
            return Err(ShadowError::InvalidParameter {
                name: "angle",
                value: self.angle_degrees,
            });
        }
        if !self.elevation_degrees.is_finite() {
            return Err(ShadowError::InvalidParameter {
                name: "elevation",
                value: self.elevation_degrees,
            });
        }
        if !self.blur_radius.is_finite() || self.blur_radius < 0.0 {
            return Err(ShadowError::InvalidParameter {
                name: "blur_radius",
                value: self.blur_radius as f64,
            });
        }
        Ok(())
    }

    pub fn light_vector(&self) -> LightVector {
        LightVector::from_angles(self.angle_degrees, self.elevation_degrees)
    }
}

/// The three images produced by a synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowLayers {
    /// Foreground alpha as opaque gray
    pub mask: Array3<u8>,
    /// Blurred shadow, black with opacity in alpha
    pub shadow: Array3<u8>,
    /// Background + shadow + foreground
    pub composite: Array3<u8>,
}

/// Synthesize a cast shadow and composite it.
///
/// # Arguments
/// * `foreground` - RGBA cutout subject (height, width, 4)
/// * `background` - RGBA background, same size
/// * `depth` - Optional grayscale depth map, same size; bright = near
/// * `params` - Light direction and blur
///
/// # Errors
/// `DimensionMismatch` if the layers differ in size, `InvalidBuffer` if a
/// layer is not RGBA, `InvalidParameter` for non-finite settings.
pub fn synthesize_shadow(
    foreground: ArrayView3<u8>,
    background: ArrayView3<u8>,
    depth: Option<ArrayView3<u8>>,
    params: &ShadowParams,
) -> Result<ShadowLayers> {
    let never = AtomicBool::new(false);
    synthesize_shadow_cancellable(foreground, background, depth, params, &never)
}

/// Same as [`synthesize_shadow`], stopping with `Cancelled` once `cancel`
/// is raised. The flag is checked between stages and between projection
/// row batches.
pub fn synthesize_shadow_cancellable(
    foreground: ArrayView3<u8>,
    background: ArrayView3<u8>,
    depth: Option<ArrayView3<u8>>,
    params: &ShadowParams,
    cancel: &AtomicBool,
) -> Result<ShadowLayers> {
    params.validate()?;
    ensure_rgba(foreground)?;
    ensure_rgba(background)?;
    ensure_same_dims("background", foreground, background)?;
    if let Some(depth) = depth {
        ensure_rgba(depth)?;
        ensure_same_dims("depth", foreground, depth)?;
    }

    let checkpoint = || {
        if cancel.load(Ordering::Relaxed) {
            Err(ShadowError::Cancelled)
        } else {
            Ok(())
        }
    };

    let (width, height) = dims(foreground);
    log::debug!(
        "casting shadow on {}x{} (angle {}, elevation {}, blur {}, depth map: {})",
        width,
        height,
        params.angle_degrees,
        params.elevation_degrees,
        params.blur_radius,
        depth.is_some()
    );

    let mask = alpha_mask_rgba(foreground);
    let contact = contact_profile(foreground);
    checkpoint()?;

    let light = params.light_vector();
    log::debug!("light vector ({:.2}, {:.2}), length {:.2}", light.dx, light.dy, light.length());

    let (raw_shadow, stats) = project_shadow_cancellable(foreground, depth, &contact, light, cancel)?;
    log::debug!(
        "projected {} pixels, {} clipped",
        stats.contributions,
        stats.clipped
    );
    if stats.contributions > 0 && stats.clipped == stats.contributions {
        log::warn!("shadow falls entirely outside the {}x{} canvas", width, height);
    }
    checkpoint()?;

    let shadow = blur_shadow_rgba(raw_shadow.view(), params.blur_radius);
    checkpoint()?;

    let composite = composite_shadow(background, shadow.view(), foreground);

    Ok(ShadowLayers {
        mask,
        shadow,
        composite,
    })
}
