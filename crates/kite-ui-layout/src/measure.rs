use kite_ui_graphics::{Point, Size};

use crate::SizeRange;

/// A child that a container policy can measure.
///
/// The policy never sees the child's subtree; `Output` is whatever the caller
/// wants carried back alongside the size (for the tree walk it is the child's
/// finished layout).
pub trait Measurable {
    type Output;
    type Error;

    /// Measures the child so its size lands inside `range`. `parent_size` is
    /// the container's definite content size, NaN on axes that are not
    /// definite.
    fn measure(
        &self,
        range: SizeRange,
        parent_size: Size,
    ) -> Result<Measured<Self::Output>, Self::Error>;
}

/// Result of measuring one child.
#[derive(Clone, Debug, PartialEq)]
pub struct Measured<T> {
    pub size: Size,
    pub output: T,
}

impl<T> Measured<T> {
    pub fn new(size: Size, output: T) -> Self {
        Self { size, output }
    }
}

/// A measured child and where its parent placed it.
#[derive(Clone, Debug, PartialEq)]
pub struct Placed<T> {
    pub position: Point,
    pub measured: Measured<T>,
}

/// Result of running a container policy.
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerLayout<T> {
    pub size: Size,
    /// One entry per child, in child order.
    pub children: Vec<Placed<T>>,
}
