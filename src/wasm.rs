//! WebAssembly exports for the cast shadow pipeline.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images cross
//! the boundary as flat RGBA byte arrays (`ImageData.data` layout), so
//! `data.length == width * height * 4`.

use wasm_bindgen::prelude::*;

use crate::filters::core::{rgba_from_raw, rgba_into_raw};
use crate::layer_effects::cast_shadow::{synthesize_shadow, ShadowParams};
use crate::layer_effects::light::LightVector;

/// Output of [`cast_shadow_wasm`], one flat RGBA buffer per layer.
#[wasm_bindgen]
pub struct ShadowResult {
    mask: Vec<u8>,
    shadow: Vec<u8>,
    composite: Vec<u8>,
}

#[wasm_bindgen]
impl ShadowResult {
    /// Foreground alpha as opaque gray
    #[wasm_bindgen(getter)]
    pub fn mask(&self) -> Vec<u8> {
        self.mask.clone()
    }

    /// Blurred shadow layer
    #[wasm_bindgen(getter)]
    pub fn shadow(&self) -> Vec<u8> {
        self.shadow.clone()
    }

    /// Background with shadow and foreground
    #[wasm_bindgen(getter)]
    pub fn composite(&self) -> Vec<u8> {
        self.composite.clone()
    }
}

// ============================================================================
// Cast Shadow
// ============================================================================

/// Synthesize a cast shadow and composite it.
///
/// # Arguments
/// * `foreground` - Flat RGBA bytes of the cutout subject
/// * `background` - Flat RGBA bytes of the background, same size
/// * `depth` - Optional flat RGBA bytes of a grayscale depth map
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `angle` - Light azimuth in degrees
/// * `elevation` - Light elevation in degrees
/// * `blur_radius` - Shadow blur sigma in pixels
#[wasm_bindgen]
pub fn cast_shadow_wasm(
    foreground: &[u8],
    background: &[u8],
    depth: Option<Vec<u8>>,
    width: usize,
    height: usize,
    angle: f64,
    elevation: f64,
    blur_radius: f32,
) -> Result<ShadowResult, JsError> {
    let fg = rgba_from_raw(foreground, width, height)?;
    let bg = rgba_from_raw(background, width, height)?;
    let depth = depth
        .map(|d| rgba_from_raw(&d, width, height))
        .transpose()?;

    let params = ShadowParams {
        angle_degrees: angle,
        elevation_degrees: elevation,
        blur_radius,
    };
    let layers = synthesize_shadow(fg.view(), bg.view(), depth.as_ref().map(|d| d.view()), &params)?;

    Ok(ShadowResult {
        mask: rgba_into_raw(layers.mask),
        shadow: rgba_into_raw(layers.shadow),
        composite: rgba_into_raw(layers.composite),
    })
}

/// Shadow displacement `[dx, dy]` for a light direction.
#[wasm_bindgen]
pub fn light_vector_wasm(angle: f64, elevation: f64) -> Vec<f64> {
    let v = LightVector::from_angles(angle, elevation);
    vec![v.dx, v.dy]
}
