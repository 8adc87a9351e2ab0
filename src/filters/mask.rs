//! Alpha mask extraction.
//!
//! Produces a grayscale visualization of the foreground's coverage:
//! R=G=B=alpha, A=255.

use ndarray::{Array3, ArrayView3, Axis, Zip};

use super::core::{ALPHA, RGBA_CHANNELS};

/// Extract the alpha channel of an RGBA u8 image as an opaque gray image.
///
/// # Arguments
/// * `input` - 3D array view of shape (height, width, 4) with RGBA u8 values
///
/// # Returns
/// New array of the same shape with alpha copied into RGB and A=255
pub fn alpha_mask_rgba(input: ArrayView3<u8>) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, RGBA_CHANNELS));

    Zip::from(output.lanes_mut(Axis(2)))
        .and(input.lanes(Axis(2)))
        .par_for_each(|mut out, px| {
            let a = px[ALPHA];
            out[0] = a;
            out[1] = a;
            out[2] = a;
            out[3] = 255;
        });

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_copies_alpha_to_rgb() {
        let mut img = Array3::<u8>::zeros((1, 2, 4));
        img[[0, 0, 0]] = 200;
        img[[0, 0, 3]] = 77;
        img[[0, 1, 1]] = 10;
        img[[0, 1, 3]] = 0;

        let mask = alpha_mask_rgba(img.view());

        assert_eq!(mask.dim(), (1, 2, 4));
        assert_eq!(&mask.as_slice().unwrap()[..4], &[77, 77, 77, 255]);
        assert_eq!(&mask.as_slice().unwrap()[4..], &[0, 0, 0, 255]);
    }

    #[test]
    fn test_mask_ignores_color() {
        let mut a = Array3::<u8>::zeros((3, 3, 4));
        let mut b = Array3::<u8>::zeros((3, 3, 4));
        a[[1, 1, 3]] = 255;
        b[[1, 1, 3]] = 255;
        b[[1, 1, 0]] = 255;
        b[[2, 2, 2]] = 90;

        assert_eq!(alpha_mask_rgba(a.view()), alpha_mask_rgba(b.view()));
    }
}
