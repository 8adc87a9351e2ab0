//! Filter modules shared by the shadow pipeline.
//!
//! ## Supported Format
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | RGBA8 | (H, W, 4) | u8 | RGB + alpha, 0-255, row-major |
//!
//! Every layer (foreground, background, depth, mask, shadow, composite) is
//! an RGBA8 array of this shape. Shadow layers keep black color channels
//! and carry their opacity in alpha.
//!
//! ## Architecture
//!
//! - **Pure** - Filters take views and return new arrays, no shared state
//! - **Same size** - Output dimensions always equal input dimensions
//! - **Thread-safe** - Per-pixel work is spread across threads with rayon

pub mod core;
pub mod mask;
pub mod blur;
