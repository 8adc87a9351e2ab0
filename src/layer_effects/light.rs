//! Light direction to shadow displacement.
//!
//! Azimuth is compass-style: 0 degrees casts the shadow straight down (+y),
//! 90 degrees casts it toward -x. Elevation controls length: low light gives
//! long shadows, light overhead gives almost none.

/// Length used when the light sits on or below the horizon.
pub const MAX_SHADOW_LENGTH: f64 = 1000.0;

/// Shadow length at 45 degrees elevation.
pub const SHADOW_LENGTH_SCALE: f64 = 200.0;

/// Displacement applied to a fully displaced (scale = 1) shadow pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightVector {
    pub dx: f64,
    pub dy: f64,
}

impl LightVector {
    /// Derive the displacement from azimuth and elevation in degrees.
    ///
    /// Elevation <= 0 falls back to `MAX_SHADOW_LENGTH` instead of dividing
    /// by `tan(0)`. Elevation above 90 is not rejected; `tan` then yields a
    /// negative length, which reverses the shadow.
    pub fn from_angles(angle_degrees: f64, elevation_degrees: f64) -> Self {
        let rad = angle_degrees.to_radians();
        let dir_x = -rad.sin();
        let dir_y = rad.cos();

        let length = if elevation_degrees <= 0.0 {
            MAX_SHADOW_LENGTH
        } else {
            SHADOW_LENGTH_SCALE / elevation_degrees.to_radians().tan()
        };

        Self {
            dx: dir_x * length,
            dy: dir_y * length,
        }
    }

    /// Magnitude of the displacement.
    pub fn length(&self) -> f64 {
        self.dx.hypot(self.dy)
    }

    /// The displacement shrunk by a depth scale factor.
    #[inline]
    pub fn scaled(&self, scale: f64) -> (f64, f64) {
        (self.dx * scale, self.dy * scale)
    }
}
