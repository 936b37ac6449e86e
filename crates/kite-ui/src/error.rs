use std::fmt;

use kite_core::{BuildError, NodeId};
use kite_ui_layout::{Size, SizeRange};

/// Failure while computing a layout.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutError {
    /// A node's computed size fell outside the range it was offered.
    RangeViolation {
        node: NodeId,
        size: Size,
        range: SizeRange,
    },
    /// The range handed to the engine breaks the range contract (negative or
    /// infinite minimum, or a maximum below the minimum).
    InvalidRange { range: SizeRange },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::RangeViolation { node, size, range } => {
                write!(f, "node #{node} measured {size}, outside of {range}")
            }
            LayoutError::InvalidRange { range } => write!(f, "invalid size range {range}"),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Anything that aborts a hosting pass.
#[derive(Debug)]
pub enum HostError {
    Build(BuildError),
    Layout(LayoutError),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::Build(err) => write!(f, "build failed: {err}"),
            HostError::Layout(err) => write!(f, "layout failed: {err}"),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::Build(err) => Some(err),
            HostError::Layout(err) => Some(err),
        }
    }
}

impl From<BuildError> for HostError {
    fn from(err: BuildError) -> Self {
        HostError::Build(err)
    }
}

impl From<LayoutError> for HostError {
    fn from(err: LayoutError) -> Self {
        HostError::Layout(err)
    }
}
