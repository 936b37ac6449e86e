//! Relative dimensions and the producer-declared size.

use kite_ui_graphics::Size;

use crate::SizeRange;

/// A length that is either automatic, absolute, or a fraction of the parent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RelativeDimension {
    #[default]
    Auto,
    Points(f32),
    /// Fraction of the parent extent; `0.5` is fifty percent.
    Percent(f32),
}

impl RelativeDimension {
    pub fn points(value: f32) -> Self {
        RelativeDimension::Points(value)
    }

    pub fn percent(fraction: f32) -> Self {
        RelativeDimension::Percent(fraction)
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, RelativeDimension::Auto)
    }

    /// Resolves against `parent`. A percent of an undefined (NaN or infinite)
    /// parent resolves as `auto`.
    pub fn resolve(&self, auto: f32, parent: f32) -> f32 {
        match *self {
            RelativeDimension::Auto => auto,
            RelativeDimension::Points(points) => points,
            RelativeDimension::Percent(fraction) => {
                if parent.is_finite() {
                    fraction * parent
                } else {
                    auto
                }
            }
        }
    }
}

impl From<f32> for RelativeDimension {
    fn from(points: f32) -> Self {
        RelativeDimension::Points(points)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RelativeSize {
    pub width: RelativeDimension,
    pub height: RelativeDimension,
}

impl RelativeSize {
    pub fn new(width: RelativeDimension, height: RelativeDimension) -> Self {
        Self { width, height }
    }

    pub fn resolve(&self, parent: Size, auto: Size) -> Size {
        Size::new(
            self.width.resolve(auto.width, parent.width),
            self.height.resolve(auto.height, parent.height),
        )
    }
}

impl From<Size> for RelativeSize {
    fn from(size: Size) -> Self {
        Self::new(
            RelativeDimension::Points(size.width),
            RelativeDimension::Points(size.height),
        )
    }
}

/// A min/max pair of relative sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RelativeSizeRange {
    pub min: RelativeSize,
    pub max: RelativeSize,
}

impl RelativeSizeRange {
    pub fn new(min: RelativeSize, max: RelativeSize) -> Self {
        Self { min, max }
    }

    pub fn exactly(size: RelativeSize) -> Self {
        Self::new(size, size)
    }

    /// Resolves both ends against `parent`. Auto components take the matching
    /// bound of `auto_range`; the result is repaired so it always forms a
    /// valid range.
    pub fn resolve(&self, parent: Size, auto_range: SizeRange) -> SizeRange {
        let min = self.min.resolve(parent, auto_range.min);
        let max = self.max.resolve(parent, auto_range.max);
        let fix_min = |value: f32, fallback: f32| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                fallback
            }
        };
        let min = Size::new(
            fix_min(min.width, auto_range.min.width),
            fix_min(min.height, auto_range.min.height),
        );
        let max = Size::new(max.width.max(min.width), max.height.max(min.height));
        SizeRange::new(min, max)
    }
}

/// The size a producer declares for itself.
///
/// `width`/`height` pin the extent (clamped by the min/max pair); otherwise the
/// min/max pair alone bounds it. Everything defaults to `auto`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ComponentSize {
    pub width: RelativeDimension,
    pub height: RelativeDimension,
    pub min_width: RelativeDimension,
    pub min_height: RelativeDimension,
    pub max_width: RelativeDimension,
    pub max_height: RelativeDimension,
}

impl ComponentSize {
    pub fn auto() -> Self {
        Self::default()
    }

    pub fn fixed(width: f32, height: f32) -> Self {
        Self {
            width: RelativeDimension::Points(width),
            height: RelativeDimension::Points(height),
            ..Self::default()
        }
    }

    pub fn with_width(mut self, width: impl Into<RelativeDimension>) -> Self {
        self.width = width.into();
        self
    }

    pub fn with_height(mut self, height: impl Into<RelativeDimension>) -> Self {
        self.height = height.into();
        self
    }

    pub fn with_min(mut self, width: RelativeDimension, height: RelativeDimension) -> Self {
        self.min_width = width;
        self.min_height = height;
        self
    }

    pub fn with_max(mut self, width: RelativeDimension, height: RelativeDimension) -> Self {
        self.max_width = width;
        self.max_height = height;
        self
    }

    pub fn is_auto(&self) -> bool {
        *self == Self::default()
    }

    /// Resolves the declared size against the parent's size.
    pub fn resolve(&self, parent: Size) -> SizeRange {
        let axis = |exact: RelativeDimension,
                    min: RelativeDimension,
                    max: RelativeDimension,
                    parent: f32| {
            let mut lo = min.resolve(0.0, parent);
            if !lo.is_finite() || lo < 0.0 {
                lo = 0.0;
            }
            let hi = max.resolve(f32::INFINITY, parent).max(lo);
            let exact = exact.resolve(f32::NAN, parent);
            if exact.is_finite() {
                let pinned = exact.max(lo).min(hi);
                (pinned, pinned)
            } else {
                (lo, hi)
            }
        };
        let (min_w, max_w) = axis(self.width, self.min_width, self.max_width, parent.width);
        let (min_h, max_h) = axis(self.height, self.min_height, self.max_height, parent.height);
        SizeRange::new(Size::new(min_w, min_h), Size::new(max_w, max_h))
    }
}

impl From<RelativeSizeRange> for ComponentSize {
    fn from(range: RelativeSizeRange) -> Self {
        Self {
            min_width: range.min.width,
            min_height: range.min.height,
            max_width: range.max.width,
            max_height: range.max.height,
            ..Self::default()
        }
    }
}
