use super::*;
use kite_core::{
    BuildTrigger, Capabilities, Children, Element, Producer, Reconciler, ReconcilerConfig,
    RenderContext, RuntimeHandle, StateUpdateMap,
};
use kite_testing::{CounterProducer, TestLeaf, TestStack};
use kite_ui_layout::{
    AlignItems, ComponentSize, EdgeInsets, FlexItem, FlexboxStyle, JustifyContent,
    RelativeDimension,
};

fn tree(root: Element) -> Arc<TreeNode> {
    Reconciler::new(ReconcilerConfig::default(), RuntimeHandle::detached())
        .build(root, None, StateUpdateMap::default(), BuildTrigger::empty())
        .expect("build succeeds")
        .generation
        .tree
}

fn child_frames(layout: &Layout) -> Vec<Rect> {
    layout
        .children()
        .iter()
        .map(|child| Rect::new(child.position, child.layout.size()))
        .collect()
}

struct Padded {
    insets: EdgeInsets,
    child: Element,
}

impl Producer for Padded {
    fn capabilities(&self) -> Capabilities {
        Capabilities::SINGLE
    }

    fn render(&self, _cx: &mut RenderContext<'_>) -> Children {
        Children::One(self.child.clone())
    }

    fn layout_policy(&self) -> LayoutPolicy {
        LayoutPolicy::Inset(self.insets)
    }
}

struct Layers(Vec<Element>);

impl Producer for Layers {
    fn capabilities(&self) -> Capabilities {
        Capabilities::MULTI
    }

    fn render(&self, _cx: &mut RenderContext<'_>) -> Children {
        Children::Many(self.0.clone())
    }
}

#[test]
fn grow_splits_shortfall_by_factor() {
    let root = TestStack::row(vec![
        TestLeaf::new("a").element(),
        TestLeaf::new("b").element(),
        TestLeaf::new("c").element(),
    ])
    .with_items(vec![FlexItem::grow(1.0), FlexItem::grow(2.0), FlexItem::grow(1.0)])
    .with_size(ComponentSize::fixed(40.0, 10.0))
    .element();

    let layout = compute_layout(&tree(root), SizeRange::unconstrained()).expect("layout");

    assert_eq!(layout.size(), Size::new(40.0, 10.0));
    assert_eq!(
        child_frames(&layout),
        vec![
            Rect::new(Point::new(0.0, 0.0), Size::new(10.0, 10.0)),
            Rect::new(Point::new(10.0, 0.0), Size::new(20.0, 10.0)),
            Rect::new(Point::new(30.0, 0.0), Size::new(10.0, 10.0)),
        ]
    );
}

#[test]
fn shrink_stops_at_zero() {
    let root = TestStack::row(vec![
        TestLeaf::sized("a", 40.0, 10.0).element(),
        TestLeaf::sized("b", 40.0, 10.0).element(),
        TestLeaf::sized("c", 40.0, 10.0).element(),
    ])
    .with_items(vec![FlexItem::shrink(1.0), FlexItem::shrink(1.0), FlexItem::default()])
    .element();

    let layout = compute_layout(&tree(root), SizeRange::tight(Size::new(30.0, 10.0)))
        .expect("layout");

    let widths: Vec<f32> = layout
        .children()
        .iter()
        .map(|child| child.layout.size().width)
        .collect();
    assert_eq!(widths, vec![0.0, 0.0, 40.0]);
    assert_eq!(layout.size(), Size::new(30.0, 10.0));
}

#[test]
fn unbounded_column_keeps_content_size() {
    let root = TestStack::new(
        FlexboxStyle::column().with_align_items(AlignItems::Start),
        vec![
            TestLeaf::sized("a", 10.0, 10.0).element(),
            TestLeaf::sized("b", 20.0, 5.0).element(),
        ],
    )
    .element();

    let layout = compute_layout(&tree(root), SizeRange::unconstrained()).expect("layout");

    assert_eq!(layout.size(), Size::new(20.0, 15.0));
    assert_eq!(
        child_frames(&layout),
        vec![
            Rect::new(Point::new(0.0, 0.0), Size::new(10.0, 10.0)),
            Rect::new(Point::new(0.0, 10.0), Size::new(20.0, 5.0)),
        ]
    );
}

#[test]
fn percent_resolves_against_resolved_parent() {
    let root = TestStack::new(
        FlexboxStyle::row().with_justify(JustifyContent::End),
        vec![TestLeaf::new("half")
            .with_size(ComponentSize::auto().with_width(RelativeDimension::percent(0.5)))
            .element()],
    )
    .with_size(ComponentSize::fixed(200.0, 20.0))
    .element();

    let layout = compute_layout(&tree(root), SizeRange::unconstrained()).expect("layout");

    assert_eq!(
        child_frames(&layout),
        vec![Rect::new(Point::new(100.0, 0.0), Size::new(100.0, 20.0))]
    );
}

#[test]
fn inset_offsets_child_and_adds_edges() {
    let root: Element = Arc::new(Padded {
        insets: EdgeInsets::symmetric(5.0, 2.0),
        child: TestLeaf::sized("body", 30.0, 10.0).element(),
    });

    let layout = compute_layout(&tree(root), SizeRange::unconstrained()).expect("layout");

    assert_eq!(layout.size(), Size::new(40.0, 14.0));
    assert_eq!(
        child_frames(&layout),
        vec![Rect::new(Point::new(5.0, 2.0), Size::new(30.0, 10.0))]
    );
}

#[test]
fn overlay_takes_largest_child() {
    let root: Element = Arc::new(Layers(vec![
        TestLeaf::sized("wide", 50.0, 5.0).element(),
        TestLeaf::sized("tall", 10.0, 30.0).element(),
    ]));

    let layout = compute_layout(&tree(root), SizeRange::loose(Size::new(100.0, 100.0)))
        .expect("layout");

    assert_eq!(layout.size(), Size::new(50.0, 30.0));
    assert!(layout
        .children()
        .iter()
        .all(|child| child.position == Point::ZERO));
}

#[test]
fn single_child_wraps_its_content() {
    let tree = tree(CounterProducer::new(0).element());

    let layout = compute_layout(&tree, SizeRange::loose(Size::new(100.0, 100.0))).expect("layout");

    assert_eq!(layout.size(), Size::new(40.0, 20.0));
    assert_eq!(layout.frames().len(), tree.count());
}

#[test]
fn measured_size_outside_range_is_an_error() {
    let tree = tree(
        TestStack::row(vec![TestLeaf::new("text")
            .with_measure(|_| Size::new(50.0, 500.0))
            .element()])
        .element(),
    );
    let text_id = tree.children()[0].id();

    let err = compute_layout(&tree, SizeRange::loose(Size::new(100.0, 100.0)))
        .expect_err("oversized measurement");

    match err {
        LayoutError::RangeViolation { node, size, .. } => {
            assert_eq!(node, text_id);
            assert_eq!(size, Size::new(50.0, 500.0));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn invalid_range_is_rejected() {
    let tree = tree(TestLeaf::new("leaf").element());
    let range = SizeRange {
        min: Size::new(10.0, 10.0),
        max: Size::new(5.0, 5.0),
    };

    assert_eq!(
        compute_layout(&tree, range).expect_err("inverted range"),
        LayoutError::InvalidRange { range }
    );
}

#[test]
fn every_node_lands_inside_its_range() {
    let root = TestStack::column(vec![
        TestStack::row(vec![
            TestLeaf::sized("a", 30.0, 10.0).element(),
            TestLeaf::new("b")
                .with_measure(|range: SizeRange| range.clamp(Size::new(25.0, 12.0)))
                .element(),
        ])
        .with_items(vec![FlexItem::default(), FlexItem::grow(1.0)])
        .element(),
        CounterProducer::new(3).element(),
    ])
    .element();
    let range = SizeRange::new(Size::new(0.0, 0.0), Size::new(120.0, 80.0));

    let tree = tree(root);
    let layout = compute_layout(&tree, range).expect("layout");

    assert!(range.contains(layout.size()));
    let frames = layout.frames();
    assert_eq!(frames.len(), tree.count());
    for (_, frame) in frames {
        assert!(frame.width >= 0.0 && frame.height >= 0.0);
        assert!(frame.max_x() <= 120.0 + 1e-3 && frame.max_y() <= 80.0 + 1e-3);
    }
}
