//! Layout, view recycling and mounting on top of the Kite reconciler.
//!
//! [`compute_layout`] walks a reconciled tree and produces an immutable
//! [`Layout`]; a [`MountProjector`] then projects that layout onto live views
//! drawn from per-container [`ViewPoolMap`]s. [`HostingRoot`] ties the steps
//! together for one root view.

mod debug;
mod error;
mod headless;
mod host;
mod layout;
mod mount;
mod pool;

pub use debug::{count_nodes, format_layout, log_layout};
pub use error::{HostError, LayoutError};
pub use headless::{headless_view_class, HeadlessView};
pub use host::{HostingRoot, LayoutOutput, LayoutPass};
pub use layout::{compute_layout, Layout, LayoutChild};
pub use mount::{MountProjector, MountSummary};
pub use pool::{PoolKey, ViewHandle, ViewId, ViewPool, ViewPoolMap};

pub use kite_core::{
    BuildTrigger, CommitOutcome, Element, NativeView, Producer, ReconcilerConfig, ViewAttribute,
    ViewClass, ViewConfiguration,
};
pub use kite_ui_layout::{EdgeInsets, Point, Rect, Size, SizeRange};

pub mod prelude {
    pub use crate::{compute_layout, HostingRoot, Layout, MountProjector, ViewHandle};
    pub use kite_core::prelude::*;
}
