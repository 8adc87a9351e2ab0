//! Shadow projection.
//!
//! Every visible foreground pixel is pushed along the light vector onto the
//! ground plane and deposits opacity at its destination. The displacement
//! can be shortened per pixel by a depth map for parallax-correct shadows.
//!
//! ## Depth convention
//!
//! Only the red channel of the depth map is read, and it is assumed to be a
//! grayscale "nearness" map: 255 means nearest to the viewer and casts no
//! displacement, 0 means farthest and casts the full light vector
//! (`scale = 1 - red / 255`). An inverted or colored depth map will still
//! produce a shadow, just not a meaningful one.
//!
//! ## Accumulation
//!
//! Several source pixels can land on the same destination. The destination
//! keeps the maximum opacity of all contributions, so the result does not
//! depend on processing order. The parallel projector gives each worker
//! thread one partial buffer for its band of rows and merges partials with
//! an element-wise max.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

use ndarray::{Array2, Array3, ArrayView3, Axis, Zip};
use rayon::prelude::*;

use super::contact::ContactProfile;
use super::light::LightVector;
use crate::error::{Result, ShadowError};
use crate::filters::core::{opacity_to_u8, ALPHA, RGBA_CHANNELS};

/// Rows handed to a worker between cancellation checks.
pub const ROW_BATCH: usize = 32;

/// Opacity lost for every `FALLOFF_STEP` rows past the contact row.
const FALLOFF_PER_STEP: f64 = 0.05;
const FALLOFF_STEP: f64 = 10.0;

/// Counters gathered during projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionStats {
    /// Visible foreground pixels considered
    pub contributions: usize,
    /// Contributions that fell outside the canvas and were dropped
    pub clipped: usize,
}

impl ProjectionStats {
    fn merge(self, other: Self) -> Self {
        Self {
            contributions: self.contributions + other.contributions,
            clipped: self.clipped + other.clipped,
        }
    }
}

/// Opacity field plus counters, one per worker.
struct Partial {
    alpha: Array2<u8>,
    stats: ProjectionStats,
}

impl Partial {
    fn new(height: usize, width: usize) -> Self {
        Self {
            alpha: Array2::zeros((height, width)),
            stats: ProjectionStats::default(),
        }
    }

    fn merge(mut self, other: Self) -> Self {
        Zip::from(&mut self.alpha)
            .and(&other.alpha)
            .par_for_each(|a, &b| *a = (*a).max(b));
        self.stats = self.stats.merge(other.stats);
        self
    }
}

/// Inputs shared by every projected pixel.
struct Projection<'a> {
    foreground: ArrayView3<'a, u8>,
    depth: Option<ArrayView3<'a, u8>>,
    contact: &'a ContactProfile,
    light: LightVector,
}

impl Projection<'_> {
    /// Depth scale factor for a source pixel (1.0 without a depth map).
    #[inline]
    fn scale(&self, x: usize, y: usize) -> f64 {
        match &self.depth {
            Some(depth) => 1.0 - depth[[y, x, 0]] as f64 / 255.0,
            None => 1.0,
        }
    }

    /// Destination and opacity of a source pixel, `None` if off-canvas.
    #[inline]
    fn project(&self, x: usize, y: usize) -> Option<(usize, usize, u8)> {
        let (height, width, _) = self.foreground.dim();
        let (dx, dy) = self.light.scaled(self.scale(x, y));

        // Round half up
        let sx = (x as f64 + dx + 0.5).floor();
        let sy = (y as f64 + dy + 0.5).floor();
        if !(sx >= 0.0 && sx < width as f64 && sy >= 0.0 && sy < height as f64) {
            return None;
        }

        Some((sx as usize, sy as usize, opacity_to_u8(falloff(y, self.contact.get(x)) as f32)))
    }

    fn accumulate_rows(&self, rows: Range<usize>, acc: &mut Partial) {
        let width = self.foreground.dim().1;
        for y in rows {
            for x in 0..width {
                if self.foreground[[y, x, ALPHA]] == 0 {
                    continue;
                }
                acc.stats.contributions += 1;
                match self.project(x, y) {
                    Some((sx, sy, opacity)) => accumulate_max(&mut acc.alpha, sx, sy, opacity),
                    None => acc.stats.clipped += 1,
                }
            }
        }
    }
}

/// Opacity of a source pixel given its column's contact row.
///
/// Fades by 5% for every 10 rows past the contact row. Only the lower bound
/// is applied here: rows before the contact row give values above 1.0, and
/// the caller clamps when converting to a channel value.
#[inline]
pub fn falloff(y: usize, contact: usize) -> f64 {
    let d = (y as f64 - contact as f64) / FALLOFF_STEP;
    (1.0 - d * FALLOFF_PER_STEP).max(0.0)
}

/// Keep the larger of the existing and incoming opacity.
#[inline]
pub fn accumulate_max(alpha: &mut Array2<u8>, x: usize, y: usize, opacity: u8) {
    let dst = &mut alpha[[y, x]];
    *dst = (*dst).max(opacity);
}

fn into_shadow_layer(alpha: Array2<u8>) -> Array3<u8> {
    let (height, width) = alpha.dim();
    let mut shadow = Array3::<u8>::zeros((height, width, RGBA_CHANNELS));
    shadow.index_axis_mut(Axis(2), ALPHA).assign(&alpha);
    shadow
}

impl<'a> Projection<'a> {
    /// Bundle the inputs, checking they describe the same canvas.
    ///
    /// # Panics
    /// If `depth` differs from `foreground` in width/height, or `contact`
    /// was computed for a different size.
    fn new(
        foreground: &'a ArrayView3<'_, u8>,
        depth: &'a Option<ArrayView3<'_, u8>>,
        contact: &'a ContactProfile,
        light: LightVector,
    ) -> Self {
        let (height, width, _) = foreground.dim();
        if let Some(depth) = depth {
            let (depth_height, depth_width, _) = depth.dim();
            assert_eq!(
                (depth_width, depth_height),
                (width, height),
                "depth map must match the foreground size"
            );
        }
        assert_eq!(
            (contact.width(), contact.height()),
            (width, height),
            "contact profile must match the foreground size"
        );

        Self {
            foreground: foreground.view(),
            depth: depth.as_ref().map(|d| d.view()),
            contact,
            light,
        }
    }
}

/// Project the shadow of `foreground` in parallel.
///
/// # Arguments
/// * `foreground` - RGBA foreground (height, width, 4)
/// * `depth` - Optional RGBA depth map of the same size, red channel read
/// * `contact` - Contact profile of `foreground`
/// * `light` - Light displacement
///
/// # Returns
/// Raw shadow layer (black, opacity in alpha) and projection counters
///
/// # Panics
/// If `depth` or `contact` do not match the foreground's width/height.
/// [`crate::synthesize_shadow`] checks sizes and returns an error instead.
pub fn project_shadow(
    foreground: ArrayView3<u8>,
    depth: Option<ArrayView3<u8>>,
    contact: &ContactProfile,
    light: LightVector,
) -> (Array3<u8>, ProjectionStats) {
    let (height, width, _) = foreground.dim();
    let projection = Projection::new(&foreground, &depth, contact, light);

    let merged = project_batches(&projection, || false)
        .unwrap_or_else(|| Partial::new(height, width));
    (into_shadow_layer(merged.alpha), merged.stats)
}

/// Same as [`project_shadow`], polling `cancel` between row batches.
///
/// # Panics
/// Same preconditions as [`project_shadow`].
pub fn project_shadow_cancellable(
    foreground: ArrayView3<u8>,
    depth: Option<ArrayView3<u8>>,
    contact: &ContactProfile,
    light: LightVector,
    cancel: &AtomicBool,
) -> Result<(Array3<u8>, ProjectionStats)> {
    let projection = Projection::new(&foreground, &depth, contact, light);

    let merged = project_batches(&projection, || cancel.load(Ordering::Relaxed))
        .ok_or(ShadowError::Cancelled)?;
    Ok((into_shadow_layer(merged.alpha), merged.stats))
}

/// Split rows into one band per worker thread and max-merge the partials.
///
/// Each band is walked in `ROW_BATCH` steps; `None` is returned as soon as
/// `is_cancelled` reports true at a batch boundary.
fn project_batches<F>(projection: &Projection<'_>, is_cancelled: F) -> Option<Partial>
where
    F: Fn() -> bool + Sync,
{
    let (height, width, _) = projection.foreground.dim();
    let workers = rayon::current_num_threads().clamp(1, height.max(1));
    let band = height.div_ceil(workers).max(1);

    let merged = (0..workers)
        .into_par_iter()
        .map(|worker| {
            let rows = (worker * band).min(height)..((worker + 1) * band).min(height);
            let mut acc = Partial::new(height, width);
            for start in rows.clone().step_by(ROW_BATCH) {
                if is_cancelled() {
                    return None;
                }
                projection.accumulate_rows(start..(start + ROW_BATCH).min(rows.end), &mut acc);
            }
            Some(acc)
        })
        .try_reduce_with(|a, b| Some(a.merge(b)));

    let merged = match merged {
        Some(partial) => partial?,
        None => Partial::new(height, width),
    };

    if is_cancelled() {
        return None;
    }
    Some(merged)
}

/// Single-threaded projection, row by row in order.
///
/// # Panics
/// Same preconditions as [`project_shadow`].
pub fn project_shadow_serial(
    foreground: ArrayView3<u8>,
    depth: Option<ArrayView3<u8>>,
    contact: &ContactProfile,
    light: LightVector,
) -> (Array3<u8>, ProjectionStats) {
    let (height, width, _) = foreground.dim();
    let projection = Projection::new(&foreground, &depth, contact, light);

    let mut acc = Partial::new(height, width);
    projection.accumulate_rows(0..height, &mut acc);
    (into_shadow_layer(acc.alpha), acc.stats)
}
