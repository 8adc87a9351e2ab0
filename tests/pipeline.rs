//! End-to-end tests of the cast shadow pipeline.

use std::sync::atomic::AtomicBool;

use castshadow_rust::filters::core::rgba_from_raw;
use castshadow_rust::layer_effects::projector::project_shadow;
use castshadow_rust::{
    contact_profile, synthesize_shadow, synthesize_shadow_cancellable, LightVector, ShadowError,
    ShadowParams,
};
use ndarray::{Array3, Axis};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Opaque square of `size` at (x0, y0) on a transparent canvas.
fn square_foreground(width: usize, height: usize, x0: usize, y0: usize, size: usize) -> Array3<u8> {
    let mut fg = Array3::<u8>::zeros((height, width, 4));
    for y in y0..y0 + size {
        for x in x0..x0 + size {
            fg[[y, x, 0]] = 30;
            fg[[y, x, 1]] = 200;
            fg[[y, x, 2]] = 90;
            fg[[y, x, 3]] = 255;
        }
    }
    fg
}

fn solid_background(width: usize, height: usize, rgb: [u8; 3]) -> Array3<u8> {
    let mut bg = Array3::<u8>::from_elem((height, width, 4), 255);
    for c in 0..3 {
        bg.index_axis_mut(Axis(2), c).fill(rgb[c]);
    }
    bg
}

/// Mean row of the nonzero shadow alpha, weighted by alpha.
fn shadow_centroid_y(shadow: &Array3<u8>) -> f64 {
    let mut total = 0.0;
    let mut weighted = 0.0;
    for ((y, _, c), &v) in shadow.indexed_iter() {
        if c == 3 && v > 0 {
            total += v as f64;
            weighted += v as f64 * y as f64;
        }
    }
    weighted / total
}

#[test]
fn test_pipeline_is_deterministic() {
    init_logging();
    let fg = square_foreground(64, 128, 20, 10, 16);
    let bg = solid_background(64, 128, [180, 170, 160]);
    let mut depth = Array3::<u8>::zeros((128, 64, 4));
    for ((y, x, _), v) in depth.indexed_iter_mut() {
        *v = ((x + y * 2) % 256) as u8;
    }
    let params = ShadowParams::default().with_angle(20.0).with_elevation(50.0).with_blur_radius(3.0);

    let a = synthesize_shadow(fg.view(), bg.view(), Some(depth.view()), &params).unwrap();
    let b = synthesize_shadow(fg.view(), bg.view(), Some(depth.view()), &params).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_zero_angle_shadow_drops_straight_down() {
    init_logging();
    let fg = square_foreground(60, 260, 20, 10, 20);
    let bg = solid_background(60, 260, [255, 255, 255]);
    let params = ShadowParams::default().with_angle(0.0).with_elevation(45.0).with_blur_radius(0.0);

    let light = params.light_vector();
    assert!(light.dx.abs() < 1e-9);
    assert!((light.dy - 200.0).abs() < 1e-6);

    let layers = synthesize_shadow(fg.view(), bg.view(), None, &params).unwrap();
    for y in 0..260 {
        for x in 0..60 {
            let inside = (20..40).contains(&x) && (210..230).contains(&y);
            assert_eq!(layers.shadow[[y, x, 3]] > 0, inside, "at ({}, {})", x, y);
        }
    }
}

#[test]
fn test_empty_columns_have_sentinel_and_no_shadow() {
    let fg = square_foreground(30, 40, 10, 5, 5);
    let profile = contact_profile(fg.view());
    let light = LightVector::from_angles(0.0, 80.0);
    let (shadow, _) = project_shadow(fg.view(), None, &profile, light);

    for x in (0..10).chain(15..30) {
        assert_eq!(profile.get(x), 40);
        assert!(shadow.index_axis(Axis(1), x).iter().all(|&v| v == 0));
    }
    for x in 10..15 {
        assert_eq!(profile.get(x), 9);
    }
}

#[test]
fn test_mid_gray_depth_halves_displacement() {
    init_logging();
    let fg = square_foreground(40, 300, 10, 10, 10);
    let bg = solid_background(40, 300, [200, 200, 200]);
    let mut depth = Array3::<u8>::zeros((300, 40, 4));
    depth.index_axis_mut(Axis(2), 0).fill(128);
    let params = ShadowParams::default().with_angle(0.0).with_elevation(45.0).with_blur_radius(0.0);

    let flat = synthesize_shadow(fg.view(), bg.view(), None, &params).unwrap();
    let scaled = synthesize_shadow(fg.view(), bg.view(), Some(depth.view()), &params).unwrap();

    // Subject rows 10..20 have centroid 14.5
    let flat_shift = shadow_centroid_y(&flat.shadow) - 14.5;
    let scaled_shift = shadow_centroid_y(&scaled.shadow) - 14.5;
    let ratio = scaled_shift / flat_shift;
    assert!((ratio - (1.0 - 128.0 / 255.0)).abs() < 0.01, "ratio {}", ratio);
}

#[test]
fn test_long_shadow_is_clipped_without_error() {
    init_logging();
    let fg = square_foreground(32, 32, 8, 8, 8);
    let bg = solid_background(32, 32, [90, 90, 90]);
    // Grazing light: 1000 px shadow on a 32 px canvas
    let params = ShadowParams::default().with_angle(135.0).with_elevation(0.0);

    let layers = synthesize_shadow(fg.view(), bg.view(), None, &params).unwrap();
    assert!(layers.shadow.iter().all(|&v| v == 0));
    // With no shadow, composite is the foreground over the background
    assert_eq!(layers.composite[[0, 0, 0]], 90);
    assert_eq!(layers.composite[[10, 10, 1]], 200);
}

#[test]
fn test_full_shadow_darkens_background() {
    init_logging();
    let fg = square_foreground(40, 120, 10, 5, 12);
    let bg = solid_background(40, 120, [220, 210, 200]);
    let params = ShadowParams::default().with_angle(0.0).with_elevation(70.0).with_blur_radius(0.0);

    let layers = synthesize_shadow(fg.view(), bg.view(), None, &params).unwrap();

    // 200 / tan(70) ≈ 72.8, so row 5 lands on 78, clear of the subject
    let (y, x) = (80, 15);
    assert_eq!(layers.shadow[[y, x, 3]], 255);
    assert_eq!(fg[[y, x, 3]], 0);
    for c in 0..3 {
        assert!(layers.composite[[y, x, c]] <= 1, "channel {} = {}", c, layers.composite[[y, x, c]]);
    }
    // Foreground pixels are drawn over untouched
    assert_eq!(layers.composite[[6, 12, 1]], 200);
    // Far from the shadow the background is unchanged
    assert_eq!(layers.composite[[115, 2, 0]], 220);
}

#[test]
fn test_blurred_shadow_softens_edges() {
    let fg = square_foreground(64, 200, 20, 10, 20);
    let bg = solid_background(64, 200, [255, 255, 255]);
    let params = ShadowParams::default().with_angle(0.0).with_elevation(60.0).with_blur_radius(4.0);

    let layers = synthesize_shadow(fg.view(), bg.view(), None, &params).unwrap();
    let shadow_alpha = layers.shadow.index_axis(Axis(2), 3);
    let partial = shadow_alpha.iter().filter(|&&v| v > 0 && v < 255).count();
    assert!(partial > 0);
    assert!(layers
        .shadow
        .index_axis(Axis(2), 0)
        .iter()
        .all(|&v| v == 0));
}

#[test]
fn test_mask_layer() {
    let fg = square_foreground(10, 10, 2, 2, 3);
    let bg = solid_background(10, 10, [0, 0, 0]);
    let layers = synthesize_shadow(fg.view(), bg.view(), None, &ShadowParams::default()).unwrap();

    assert_eq!(layers.mask[[3, 3, 0]], 255);
    assert_eq!(layers.mask[[0, 0, 0]], 0);
    assert!(layers.mask.index_axis(Axis(2), 3).iter().all(|&v| v == 255));
}

#[test]
fn test_dimension_mismatch_is_fatal() {
    let fg = square_foreground(16, 16, 2, 2, 4);
    let bg = solid_background(16, 12, [0, 0, 0]);

    let err = synthesize_shadow(fg.view(), bg.view(), None, &ShadowParams::default()).unwrap_err();
    assert_eq!(
        err,
        ShadowError::DimensionMismatch {
            layer: "background",
            expected: (16, 16),
            found: (16, 12),
        }
    );
}

#[test]
fn test_cancelled_synthesis() {
    let fg = square_foreground(16, 16, 2, 2, 4);
    let bg = solid_background(16, 16, [0, 0, 0]);
    let cancel = AtomicBool::new(true);

    let err = synthesize_shadow_cancellable(fg.view(), bg.view(), None, &ShadowParams::default(), &cancel)
        .unwrap_err();
    assert_eq!(err, ShadowError::Cancelled);
}

#[test]
fn test_flat_buffers_roundtrip_through_pipeline() {
    let (width, height) = (8, 6);
    let mut fg_raw = vec![0u8; width * height * 4];
    // One opaque pixel at (3, 1)
    fg_raw[(width + 3) * 4..(width + 3) * 4 + 4].copy_from_slice(&[255, 0, 0, 255]);
    let bg_raw = vec![255u8; width * height * 4];

    let fg = rgba_from_raw(&fg_raw, width, height).unwrap();
    let bg = rgba_from_raw(&bg_raw, width, height).unwrap();
    let layers = synthesize_shadow(fg.view(), bg.view(), None, &ShadowParams::default()).unwrap();

    assert_eq!(layers.composite[[1, 3, 0]], 255);
    assert_eq!(layers.composite[[1, 3, 1]], 0);
}
