//! Layout contracts & policies for Kite
//!
//! Value types for relative dimensions and size ranges, and the single-pass
//! flexbox algorithm that stacking containers use. Nothing here knows about
//! producers or tree nodes; the tree walk lives in `kite-ui` and drives these
//! pieces through the [`Measurable`] trait.

mod alignment;
mod arrangement;
mod axis;
mod measure;
mod dimension;
mod flexbox;
mod policy;
mod size_range;

pub use alignment::*;
pub use arrangement::*;
pub use axis::*;
pub use measure::*;
pub use dimension::*;
pub use flexbox::*;
pub use policy::*;
pub use size_range::*;

pub use kite_ui_graphics::{EdgeInsets, Point, Rect, Size};

pub mod prelude {
    pub use crate::measure::{Measurable, Measured, Placed};
    pub use crate::dimension::{ComponentSize, RelativeDimension, RelativeSize, RelativeSizeRange};
    pub use crate::flexbox::{FlexChild, FlexDirection, FlexItem, FlexWrap, FlexboxStyle};
    pub use crate::policy::{FlexboxSpec, LayoutPolicy};
    pub use crate::size_range::SizeRange;
}
