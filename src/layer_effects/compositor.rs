//! Final compositing of background, shadow and foreground.
//!
//! Steps, in order:
//! 1. Start from the background.
//! 2. Multiply the shadow in, weighted by shadow alpha:
//!    `out = base * (1 - a) + (base * shadow / 255) * a`
//! 3. Draw the foreground over the result:
//!    `out = fg * fg_a + out * (1 - fg_a)`
//!
//! Color channels use the formulas above as-is (straight, not
//! premultiplied). The alpha channel takes the Porter-Duff union
//! `a_src + a_dst * (1 - a_src)` at each step.

use ndarray::{Array3, ArrayView3, Axis, Zip};

use crate::filters::core::ALPHA;

/// Multiply-blend one shadow pixel onto a base pixel.
#[inline]
pub fn multiply_over(base: &mut [f32; 4], shadow: [f32; 4]) {
    let a = shadow[3];
    if a <= 0.0 {
        return;
    }
    for c in 0..3 {
        base[c] = base[c] * (1.0 - a) + base[c] * shadow[c] * a;
    }
    base[3] = a + base[3] * (1.0 - a);
}

/// Draw one straight-alpha pixel over a base pixel.
#[inline]
pub fn alpha_over(base: &mut [f32; 4], src: [f32; 4]) {
    let a = src[3];
    if a <= 0.0 {
        return;
    }
    for c in 0..3 {
        base[c] = src[c] * a + base[c] * (1.0 - a);
    }
    base[3] = a + base[3] * (1.0 - a);
}

#[inline]
fn to_unit(px: ndarray::ArrayView1<u8>) -> [f32; 4] {
    [
        px[0] as f32 / 255.0,
        px[1] as f32 / 255.0,
        px[2] as f32 / 255.0,
        px[ALPHA] as f32 / 255.0,
    ]
}

/// Composite shadow and foreground over the background.
///
/// # Arguments
/// * `background` - RGBA background (height, width, 4)
/// * `shadow` - Blurred shadow layer, same size
/// * `foreground` - RGBA foreground, same size
///
/// # Returns
/// Composite RGBA image with same dimensions
pub fn composite_shadow(
    background: ArrayView3<u8>,
    shadow: ArrayView3<u8>,
    foreground: ArrayView3<u8>,
) -> Array3<u8> {
    let mut output = background.to_owned();

    Zip::from(output.lanes_mut(Axis(2)))
        .and(shadow.lanes(Axis(2)))
        .and(foreground.lanes(Axis(2)))
        .par_for_each(|mut out, sh, fg| {
            let mut px = to_unit(out.view());
            multiply_over(&mut px, to_unit(sh));
            alpha_over(&mut px, to_unit(fg));
            for c in 0..4 {
                out[c] = (px[c].clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        });

    output
}
