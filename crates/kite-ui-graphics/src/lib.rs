//! Pure geometry for Kite.
//!
//! Sizes, points, rectangles and edge insets used by the layout engine and the
//! mount projector. All values are `f32`; an infinite extent is a legal value
//! meaning "no limit" and is never replaced by a large finite number.

mod geometry;

pub use geometry::*;

pub mod prelude {
    pub use crate::geometry::{EdgeInsets, Point, Rect, Size};
}
