//! Axis definitions for flex layouts.

use kite_ui_graphics::{EdgeInsets, Point, Size};

use crate::SizeRange;

/// Identifies the primary direction for measuring and placing children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal main axis.
    Horizontal,
    /// Vertical main axis.
    Vertical,
}

impl Axis {
    /// Returns true if this axis is horizontal.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Axis::Horizontal)
    }

    /// Returns true if this axis is vertical.
    pub fn is_vertical(self) -> bool {
        matches!(self, Axis::Vertical)
    }

    pub fn cross(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    /// Extent of `size` along this axis.
    pub fn main(self, size: Size) -> f32 {
        match self {
            Axis::Horizontal => size.width,
            Axis::Vertical => size.height,
        }
    }

    /// Extent of `size` across this axis.
    pub fn cross_of(self, size: Size) -> f32 {
        self.cross().main(size)
    }

    pub fn size(self, main: f32, cross: f32) -> Size {
        match self {
            Axis::Horizontal => Size::new(main, cross),
            Axis::Vertical => Size::new(cross, main),
        }
    }

    pub fn point(self, main: f32, cross: f32) -> Point {
        match self {
            Axis::Horizontal => Point::new(main, cross),
            Axis::Vertical => Point::new(cross, main),
        }
    }

    /// `(min, max)` of the range along this axis.
    pub fn bounds(self, range: &SizeRange) -> (f32, f32) {
        (self.main(range.min), self.main(range.max))
    }

    pub fn range(self, main: (f32, f32), cross: (f32, f32)) -> SizeRange {
        SizeRange::new(self.size(main.0, cross.0), self.size(main.1, cross.1))
    }

    /// Leading and trailing insets along this axis.
    pub fn insets(self, insets: &EdgeInsets) -> (f32, f32) {
        match self {
            Axis::Horizontal => (insets.left, insets.right),
            Axis::Vertical => (insets.top, insets.bottom),
        }
    }
}
