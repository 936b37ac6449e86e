use std::fmt;
use std::sync::Arc;

use kite_ui_graphics::{EdgeInsets, Size};

use crate::{FlexItem, FlexboxStyle, SizeRange};

/// Sizing function for leaves whose size depends on content (text, images).
pub trait IntrinsicMeasure: Send + Sync {
    /// Returns the preferred size within `range`. The engine clamps the result.
    fn measure(&self, range: SizeRange) -> Size;
}

impl<F> IntrinsicMeasure for F
where
    F: Fn(SizeRange) -> Size + Send + Sync,
{
    fn measure(&self, range: SizeRange) -> Size {
        self(range)
    }
}

/// Flexbox parameters for a stacking container.
///
/// `items` is indexed parallel to the container's children; missing entries
/// use [`FlexItem::default`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlexboxSpec {
    pub style: FlexboxStyle,
    pub items: Vec<FlexItem>,
}

impl FlexboxSpec {
    pub fn new(style: FlexboxStyle) -> Self {
        Self {
            style,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = FlexItem>) -> Self {
        self.items = items.into_iter().collect();
        self
    }

    pub fn item(&self, index: usize) -> FlexItem {
        self.items.get(index).copied().unwrap_or_default()
    }
}

/// How a node turns a size range into its own size and child placements.
#[derive(Clone, Default)]
pub enum LayoutPolicy {
    /// No children; takes the minimum of its resolved range.
    #[default]
    Leaf,
    /// No children; sized by a measure function.
    Measure(Arc<dyn IntrinsicMeasure>),
    /// Wraps one child at the origin, clamping the child's size.
    Single,
    /// Wraps one child inset by fixed edges.
    Inset(EdgeInsets),
    /// Stacks every child at the origin; takes the largest child size.
    Overlay,
    Flexbox(FlexboxSpec),
}

impl LayoutPolicy {
    pub fn measure<F>(measure: F) -> Self
    where
        F: Fn(SizeRange) -> Size + Send + Sync + 'static,
    {
        LayoutPolicy::Measure(Arc::new(measure))
    }

    pub fn flexbox(style: FlexboxStyle, items: impl IntoIterator<Item = FlexItem>) -> Self {
        LayoutPolicy::Flexbox(FlexboxSpec::new(style).with_items(items))
    }

    pub fn name(&self) -> &'static str {
        match self {
            LayoutPolicy::Leaf => "leaf",
            LayoutPolicy::Measure(_) => "measure",
            LayoutPolicy::Single => "single",
            LayoutPolicy::Inset(_) => "inset",
            LayoutPolicy::Overlay => "overlay",
            LayoutPolicy::Flexbox(_) => "flexbox",
        }
    }
}

impl fmt::Debug for LayoutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutPolicy::Inset(insets) => f.debug_tuple("Inset").field(insets).finish(),
            LayoutPolicy::Flexbox(spec) => f.debug_tuple("Flexbox").field(spec).finish(),
            other => f.write_str(match other {
                LayoutPolicy::Leaf => "Leaf",
                LayoutPolicy::Measure(_) => "Measure(..)",
                LayoutPolicy::Single => "Single",
                _ => "Overlay",
            }),
        }
    }
}
