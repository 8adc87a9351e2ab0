//! Gaussian blur for shadow layers.
//!
//! Softens the hard projected shadow to approximate a penumbra. Only the
//! alpha channel carries information; color channels of the output are
//! always black.
//!
//! The blur is a separable 2-pass convolution with edge clamping (samples
//! past the border repeat the border pixel, nothing wraps around). Every
//! output value is computed independently from the previous pass, so the
//! parallel passes are deterministic.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis, Zip};

use super::core::{gaussian_kernel_1d, ALPHA, RGBA_CHANNELS};

/// Apply Gaussian blur to a shadow layer.
///
/// # Arguments
/// * `shadow` - Shadow layer (height, width, 4) as u8, opacity in alpha
/// * `sigma` - Standard deviation of the Gaussian kernel in pixels
///
/// # Returns
/// Blurred shadow layer with same dimensions
pub fn blur_shadow_rgba(shadow: ArrayView3<u8>, sigma: f32) -> Array3<u8> {
    let (height, width, _) = shadow.dim();
    let alpha = shadow.index_axis(Axis(2), ALPHA).mapv(|v| v as f32);

    let blurred = if sigma > 0.0 && height > 0 && width > 0 {
        blur_alpha_f32(alpha.view(), sigma)
    } else {
        alpha
    };

    let mut output = Array3::<u8>::zeros((height, width, RGBA_CHANNELS));
    Zip::from(output.index_axis_mut(Axis(2), ALPHA))
        .and(&blurred)
        .par_for_each(|out, &v| *out = v.round().clamp(0.0, 255.0) as u8);

    log::debug!(
        "blurred {}x{} shadow with sigma {} ({} taps)",
        width,
        height,
        sigma,
        gaussian_kernel_1d(sigma).len()
    );

    output
}

/// Apply separable 1D Gaussian blur to an alpha field (any value range).
pub fn blur_alpha_f32(alpha: ArrayView2<f32>, sigma: f32) -> Array2<f32> {
    let (height, width) = alpha.dim();
    let kernel = gaussian_kernel_1d(sigma);
    let half = kernel.len() / 2;

    let mut temp = Array2::<f32>::zeros((height, width));
    let mut result = Array2::<f32>::zeros((height, width));

    // Horizontal pass
    Zip::indexed(&mut temp).par_for_each(|(y, x), out| {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let sx = (x as isize + ki as isize - half as isize)
                .clamp(0, width as isize - 1) as usize;
            sum += alpha[[y, sx]] * kv;
        }
        *out = sum;
    });

    // Vertical pass
    Zip::indexed(&mut result).par_for_each(|(y, x), out| {
        let mut sum = 0.0f32;
        for (ki, &kv) in kernel.iter().enumerate() {
            let sy = (y as isize + ki as isize - half as isize)
                .clamp(0, height as isize - 1) as usize;
            sum += temp[[sy, x]] * kv;
        }
        *out = sum;
    });

    result
}
