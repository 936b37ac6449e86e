//! Layout tree walk.
//!
//! Resolves each node's declared size against the range its parent offers,
//! then hands its children to the node's [`LayoutPolicy`]. Container
//! policies see children only through [`Measurable`], so a child's subtree
//! is laid out on demand whenever the policy measures it.

use std::sync::Arc;

use kite_core::{NodeId, TreeNode};
use kite_ui_layout::{
    ContainerLayout, FlexChild, LayoutPolicy, Measurable, Measured, Point, Rect, Size, SizeRange,
};

use crate::LayoutError;

/// Immutable, per-generation layout of one node and its children.
#[derive(Clone, Debug)]
pub struct Layout {
    node: Arc<TreeNode>,
    size: Size,
    children: Vec<LayoutChild>,
}

/// A child layout and its position in the parent's coordinate space.
#[derive(Clone, Debug)]
pub struct LayoutChild {
    pub position: Point,
    pub layout: Layout,
}

impl Layout {
    pub fn node(&self) -> &Arc<TreeNode> {
        &self.node
    }

    pub fn node_id(&self) -> NodeId {
        self.node.id()
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn children(&self) -> &[LayoutChild] {
        &self.children
    }

    /// Finds the layout of `id` and its frame relative to this layout's origin.
    pub fn find(&self, id: NodeId) -> Option<(&Layout, Rect)> {
        self.find_at(id, Point::ZERO)
    }

    fn find_at(&self, id: NodeId, origin: Point) -> Option<(&Layout, Rect)> {
        if self.node_id() == id {
            return Some((self, Rect::new(origin, self.size)));
        }
        self.children
            .iter()
            .find_map(|child| child.layout.find_at(id, origin + child.position))
    }

    /// Every node's frame relative to this layout's origin, in pre-order.
    pub fn frames(&self) -> Vec<(NodeId, Rect)> {
        let mut frames = Vec::new();
        self.collect_frames(Point::ZERO, &mut frames);
        frames
    }

    fn collect_frames(&self, origin: Point, frames: &mut Vec<(NodeId, Rect)>) {
        frames.push((self.node_id(), Rect::new(origin, self.size)));
        for child in &self.children {
            child.layout.collect_frames(origin + child.position, frames);
        }
    }
}

/// Computes the layout of `tree` within `range`.
///
/// Percentages on the root resolve against the definite axes of `range`.
pub fn compute_layout(tree: &Arc<TreeNode>, range: SizeRange) -> Result<Layout, LayoutError> {
    if SizeRange::try_new(range.min, range.max).is_none() {
        return Err(LayoutError::InvalidRange { range });
    }
    layout_node(tree, range, range.definite_size())
}

fn layout_node(
    node: &Arc<TreeNode>,
    range: SizeRange,
    parent_size: Size,
) -> Result<Layout, LayoutError> {
    let producer = node.producer();
    let own = producer.size().resolve(parent_size).intersect(&range);

    let (size, children) = match producer.layout_policy() {
        LayoutPolicy::Leaf => (own.min, Vec::new()),
        LayoutPolicy::Measure(measure) => {
            let size = measure.measure(own);
            if !own.contains(size) {
                return Err(LayoutError::RangeViolation {
                    node: node.id(),
                    size,
                    range: own,
                });
            }
            (size, Vec::new())
        }
        LayoutPolicy::Single => match node.children().first() {
            Some(child) => {
                let child = layout_node(child, own, own.definite_size())?;
                let size = own.clamp(child.size);
                (size, vec![LayoutChild::at(Point::ZERO, child)])
            }
            None => (own.min, Vec::new()),
        },
        LayoutPolicy::Inset(insets) => match node.children().first() {
            Some(child) => {
                let inner = own.deflate(insets);
                let child = layout_node(child, inner, inner.definite_size())?;
                let size = own.clamp(Size::new(
                    child.size.width + insets.horizontal_sum(),
                    child.size.height + insets.vertical_sum(),
                ));
                let origin = Point::new(insets.left, insets.top);
                (size, vec![LayoutChild::at(origin, child)])
            }
            None => (
                own.clamp(Size::new(insets.horizontal_sum(), insets.vertical_sum())),
                Vec::new(),
            ),
        },
        LayoutPolicy::Overlay => {
            let loose = SizeRange::new(Size::ZERO, own.max);
            let parent = own.definite_size();
            let mut extent = Size::ZERO;
            let mut children = Vec::with_capacity(node.children().len());
            for child in node.children() {
                let child = layout_node(child, loose, parent)?;
                extent.width = extent.width.max(child.size.width);
                extent.height = extent.height.max(child.size.height);
                children.push(LayoutChild::at(Point::ZERO, child));
            }
            (own.clamp(extent), children)
        }
        LayoutPolicy::Flexbox(spec) => {
            let flex_children: Vec<FlexChild<NodeMeasurable<'_>>> = node
                .children()
                .iter()
                .enumerate()
                .map(|(index, child)| FlexChild::new(NodeMeasurable { node: child }, spec.item(index)))
                .collect();
            let ContainerLayout { size, children } = spec.style.layout(&flex_children, own)?;
            let children = children
                .into_iter()
                .map(|placed| LayoutChild::at(placed.position, placed.measured.output))
                .collect();
            (size, children)
        }
    };

    if !range.contains(size) {
        return Err(LayoutError::RangeViolation {
            node: node.id(),
            size,
            range,
        });
    }
    log::trace!("laid out #{} at {size} within {range}", node.id());
    Ok(Layout {
        node: Arc::clone(node),
        size,
        children,
    })
}

impl LayoutChild {
    fn at(position: Point, layout: Layout) -> Self {
        Self { position, layout }
    }
}

/// Adapts a child tree node to the flexbox algorithm.
struct NodeMeasurable<'a> {
    node: &'a Arc<TreeNode>,
}

impl Measurable for NodeMeasurable<'_> {
    type Output = Layout;
    type Error = LayoutError;

    fn measure(&self, range: SizeRange, parent_size: Size) -> Result<Measured<Layout>, LayoutError> {
        let layout = layout_node(self.node, range, parent_size)?;
        Ok(Measured::new(layout.size, layout))
    }
}

#[cfg(test)]
#[path = "tests/layout_tests.rs"]
mod tests;
