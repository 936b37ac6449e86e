use std::fmt;

use kite_ui_graphics::{EdgeInsets, Size};

/// Tolerance used when checking a measured size against a range.
const CONTAINMENT_EPSILON: f32 = 1e-3;

/// Inclusive bounds a node's measured size must fall within.
///
/// `min` is always finite and non-negative; `max` is at least `min` on both
/// axes and may be infinite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeRange {
    pub min: Size,
    pub max: Size,
}

impl SizeRange {
    /// Creates a range, panicking if the bounds break the range contract.
    pub fn new(min: Size, max: Size) -> Self {
        assert!(
            min.width.is_finite() && min.height.is_finite(),
            "size range minimum must be finite: {min}"
        );
        assert!(
            min.width >= 0.0 && min.height >= 0.0,
            "size range minimum must be non-negative: {min}"
        );
        assert!(
            max.width >= min.width && max.height >= min.height,
            "size range maximum {max} must not be below minimum {min}"
        );
        Self { min, max }
    }

    /// Fallible twin of [`SizeRange::new`].
    pub fn try_new(min: Size, max: Size) -> Option<Self> {
        let valid = min.width.is_finite()
            && min.height.is_finite()
            && min.width >= 0.0
            && min.height >= 0.0
            && max.width >= min.width
            && max.height >= min.height;
        valid.then_some(Self { min, max })
    }

    pub fn tight(size: Size) -> Self {
        Self::new(size, size)
    }

    /// `[0, max]` on both axes.
    pub fn loose(max: Size) -> Self {
        Self::new(Size::ZERO, max)
    }

    /// `[0, ∞)` on both axes.
    pub fn unconstrained() -> Self {
        Self {
            min: Size::ZERO,
            max: Size::INFINITE,
        }
    }

    pub fn is_tight(&self) -> bool {
        self.min == self.max
    }

    /// The size along axes where `min == max`, NaN elsewhere.
    ///
    /// Percentages resolve against this; an undefined extent makes a percent
    /// dimension fall back to its auto value.
    pub fn definite_size(&self) -> Size {
        let pick = |min: f32, max: f32| if min == max { min } else { f32::NAN };
        Size::new(
            pick(self.min.width, self.max.width),
            pick(self.min.height, self.max.height),
        )
    }

    /// Clamps `size` into this range. NaN components become the minimum.
    pub fn clamp(&self, size: Size) -> Size {
        let clamp_axis = |value: f32, min: f32, max: f32| {
            if value.is_nan() {
                min
            } else {
                value.max(min).min(max)
            }
        };
        Size::new(
            clamp_axis(size.width, self.min.width, self.max.width),
            clamp_axis(size.height, self.min.height, self.max.height),
        )
    }

    /// Whether `size` falls within the range, allowing a small float tolerance.
    pub fn contains(&self, size: Size) -> bool {
        let within = |value: f32, min: f32, max: f32| {
            value.is_finite()
                && value >= min - CONTAINMENT_EPSILON
                && value <= max + CONTAINMENT_EPSILON
        };
        within(size.width, self.min.width, self.max.width)
            && within(size.height, self.min.height, self.max.height)
    }

    /// Narrows this range by `other`.
    ///
    /// Each bound of `self` is clamped into `other`, so the result always lies
    /// inside `other` even when the two ranges do not overlap.
    pub fn intersect(&self, other: &SizeRange) -> SizeRange {
        let axis = |min: f32, max: f32, o_min: f32, o_max: f32| {
            let lo = min.max(o_min).min(o_max);
            let hi = max.min(o_max).max(lo);
            (lo, hi)
        };
        let (min_w, max_w) = axis(
            self.min.width,
            self.max.width,
            other.min.width,
            other.max.width,
        );
        let (min_h, max_h) = axis(
            self.min.height,
            self.max.height,
            other.min.height,
            other.max.height,
        );
        SizeRange::new(Size::new(min_w, min_h), Size::new(max_w, max_h))
    }

    /// Shrinks both bounds by `insets`, flooring at zero.
    pub fn deflate(&self, insets: EdgeInsets) -> SizeRange {
        let h = insets.horizontal_sum();
        let v = insets.vertical_sum();
        SizeRange::new(
            Size::new(
                (self.min.width - h).max(0.0),
                (self.min.height - v).max(0.0),
            ),
            Size::new(
                (self.max.width - h).max(0.0),
                (self.max.height - v).max(0.0),
            ),
        )
    }
}

impl Default for SizeRange {
    fn default() -> Self {
        Self::unconstrained()
    }
}

impl fmt::Display for SizeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_clamps_into_other() {
        let own = SizeRange::new(Size::new(10.0, 10.0), Size::new(50.0, 50.0));
        let offered = SizeRange::new(Size::new(20.0, 0.0), Size::new(30.0, 5.0));
        let narrowed = own.intersect(&offered);
        assert_eq!(narrowed.min, Size::new(20.0, 5.0));
        assert_eq!(narrowed.max, Size::new(30.0, 5.0));
    }

    #[test]
    fn deflate_floors_at_zero() {
        let range = SizeRange::new(Size::new(4.0, 4.0), Size::new(100.0, f32::INFINITY));
        let inner = range.deflate(EdgeInsets::uniform(5.0));
        assert_eq!(inner.min, Size::ZERO);
        assert_eq!(inner.max.width, 90.0);
        assert!(inner.max.height.is_infinite());
    }

    #[test]
    fn definite_size_only_on_tight_axes() {
        let range = SizeRange::new(Size::new(40.0, 0.0), Size::new(40.0, 100.0));
        let definite = range.definite_size();
        assert_eq!(definite.width, 40.0);
        assert!(definite.height.is_nan());
    }

    #[test]
    fn try_new_rejects_inverted_bounds() {
        assert!(SizeRange::try_new(Size::new(5.0, 5.0), Size::new(4.0, 10.0)).is_none());
        assert!(SizeRange::try_new(Size::new(f32::INFINITY, 0.0), Size::INFINITE).is_none());
    }
}
