//! Cast shadow effect, split into its stages.
//!
//! ## Stages
//! - **Contact** - Per-column ground-contact rows (`contact.rs`)
//! - **Light** - Azimuth + elevation to displacement (`light.rs`)
//! - **Projection** - Depth-scaled pixel projection with max accumulation (`projector.rs`)
//! - **Compositing** - Multiply shadow, then foreground over (`compositor.rs`)
//!
//! `cast_shadow.rs` chains them together with the alpha mask and blur
//! filters from [`crate::filters`].

pub mod contact;
pub mod light;
pub mod projector;
pub mod compositor;
pub mod cast_shadow;
