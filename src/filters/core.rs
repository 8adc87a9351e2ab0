//! Core utilities shared by the shadow filters.
//!
//! This module provides:
//! - Gaussian kernel generation
//! - RGBA buffer construction and validation
//! - Opacity <-> channel conversion

use ndarray::{Array3, ArrayView3};

use crate::error::{Result, ShadowError};

/// Number of channels in every buffer handled by this crate.
pub const RGBA_CHANNELS: usize = 4;

/// Index of the alpha channel.
pub const ALPHA: usize = 3;

/// Generate a 1D Gaussian kernel.
///
/// # Arguments
/// * `sigma` - Standard deviation of the Gaussian
///
/// # Returns
/// Normalized 1D kernel as Vec<f32>
pub fn gaussian_kernel_1d(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }

    // Kernel size = 6 sigma (covers 99.7% of distribution), ensure odd
    let kernel_size = ((sigma * 6.0).ceil() as usize) | 1;
    let half = kernel_size / 2;

    let mut kernel: Vec<f32> = (0..kernel_size)
        .map(|i| {
            let x = i as f32 - half as f32;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    // Normalize
    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }

    kernel
}

/// Build an RGBA buffer from flat row-major bytes.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
pub fn rgba_from_raw(data: &[u8], width: usize, height: usize) -> Result<Array3<u8>> {
    let expected = width * height * RGBA_CHANNELS;
    if data.len() != expected {
        return Err(ShadowError::InvalidBuffer {
            expected,
            found: data.len(),
        });
    }

    Array3::from_shape_vec((height, width, RGBA_CHANNELS), data.to_vec()).map_err(|_| {
        ShadowError::InvalidBuffer {
            expected,
            found: data.len(),
        }
    })
}

/// Flatten an RGBA buffer back into row-major bytes.
pub fn rgba_into_raw(image: Array3<u8>) -> Vec<u8> {
    if image.is_standard_layout() {
        image.into_raw_vec_and_offset().0
    } else {
        image.iter().copied().collect()
    }
}

/// Reject arrays that are not (height, width, 4).
pub fn ensure_rgba(image: ArrayView3<u8>) -> Result<()> {
    let (height, width, channels) = image.dim();
    if channels != RGBA_CHANNELS {
        return Err(ShadowError::InvalidBuffer {
            expected: width * height * RGBA_CHANNELS,
            found: image.len(),
        });
    }
    Ok(())
}

/// (width, height) of an image array.
#[inline]
pub fn dims(image: ArrayView3<u8>) -> (usize, usize) {
    let (height, width, _) = image.dim();
    (width, height)
}

/// Check that `layer` has the same width/height as the foreground.
pub fn ensure_same_dims(
    layer: &'static str,
    foreground: ArrayView3<u8>,
    other: ArrayView3<u8>,
) -> Result<()> {
    let expected = dims(foreground);
    let found = dims(other);
    if expected != found {
        return Err(ShadowError::DimensionMismatch {
            layer,
            expected,
            found,
        });
    }
    Ok(())
}

/// Convert opacity (0.0-1.0) to a channel value (0-255).
///
/// Out-of-range opacity is clamped here rather than left to wrap.
#[inline]
pub fn opacity_to_u8(opacity: f32) -> u8 {
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}
