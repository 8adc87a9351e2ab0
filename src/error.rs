//! Error types for shadow synthesis.

use thiserror::Error;

/// Errors returned by the shadow pipeline and buffer helpers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShadowError {
    /// A layer does not share the foreground's width/height.
    #[error("{layer} is {}x{} but foreground is {}x{}", .found.0, .found.1, .expected.0, .expected.1)]
    DimensionMismatch {
        layer: &'static str,
        /// (width, height) of the foreground
        expected: (usize, usize),
        /// (width, height) of the offending layer
        found: (usize, usize),
    },

    /// Flat buffer length or channel count does not describe an RGBA image.
    #[error("invalid RGBA buffer: expected {expected} values, found {found}")]
    InvalidBuffer { expected: usize, found: usize },

    /// A synthesis parameter is outside its domain.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// The caller raised the cancellation flag.
    #[error("shadow synthesis cancelled")]
    Cancelled,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ShadowError>;

#[cfg(feature = "python")]
impl From<ShadowError> for pyo3::PyErr {
    fn from(err: ShadowError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
