//! Vector math re-exported from [`glam`].
//!
//! ```
//! use tessel_core::math::Vec2;
//!
//! let cursor = Vec2::new(120.0, 48.0);
//! let frame_origin = Vec2::new(100.0, 40.0);
//! assert_eq!(cursor - frame_origin, Vec2::new(20.0, 8.0));
//! ```

pub use glam::{Vec2, vec2};

/// Clamp a point into the rectangle `[0, bounds]`.
#[inline]
pub fn clamp_to_bounds(point: Vec2, bounds: Vec2) -> Vec2 {
    point.clamp(Vec2::ZERO, bounds.max(Vec2::ZERO))
}
