//! Ground-contact detection.
//!
//! For each column, finds the lowest row where the foreground is visible.
//! That row is treated as where the subject touches the ground plane.

use ndarray::{ArrayView3, Axis};
use rayon::prelude::*;

use crate::error::Result;
use crate::filters::core::{ensure_rgba, ALPHA};

/// Per-column contact rows of a foreground image.
///
/// `contact[x]` is the y of the lowest pixel with alpha > 0 in column x, or
/// `height` when the column is fully transparent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactProfile {
    rows: Vec<usize>,
    height: usize,
}

impl ContactProfile {
    /// Contact row for column `x` (`height` when there is none).
    ///
    /// # Panics
    /// If `x >= self.width()`.
    #[inline]
    pub fn get(&self, x: usize) -> usize {
        self.rows[x]
    }

    /// Whether column `x` contains any visible foreground pixel.
    ///
    /// # Panics
    /// If `x >= self.width()`.
    #[inline]
    pub fn has_contact(&self, x: usize) -> bool {
        self.rows[x] < self.height
    }

    /// Image height, also the "no contact" sentinel.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.rows.len()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.rows
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.rows
    }
}

/// Compute the contact profile of an RGBA foreground.
///
/// Columns are scanned bottom-up independently of each other.
///
/// # Panics
/// If `foreground` has fewer than 4 channels; see [`contact_profile_checked`].
pub fn contact_profile(foreground: ArrayView3<u8>) -> ContactProfile {
    let (height, width, _) = foreground.dim();
    let alpha = foreground.index_axis(Axis(2), ALPHA);

    let rows: Vec<usize> = (0..width)
        .into_par_iter()
        .map(|x| {
            (0..height)
                .rev()
                .find(|&y| alpha[[y, x]] > 0)
                .unwrap_or(height)
        })
        .collect();

    if log::log_enabled!(log::Level::Trace) {
        let touching = rows.iter().filter(|&&y| y < height).count();
        log::trace!("contact profile: {} of {} columns touch ground", touching, width);
    }

    ContactProfile { rows, height }
}

/// Same as [`contact_profile`], rejecting arrays that are not RGBA.
pub fn contact_profile_checked(foreground: ArrayView3<u8>) -> Result<ContactProfile> {
    ensure_rgba(foreground)?;
    Ok(contact_profile(foreground))
}
