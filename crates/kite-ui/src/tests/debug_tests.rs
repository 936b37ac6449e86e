use super::*;
use crate::compute_layout;
use kite_core::{BuildTrigger, Reconciler, ReconcilerConfig, RuntimeHandle, StateUpdateMap};
use kite_testing::{TestLeaf, TestStack};
use kite_ui_layout::{Size, SizeRange};

fn sample() -> Layout {
    let root = TestStack::row(vec![
        TestLeaf::sized("a", 10.0, 10.0).element(),
        TestLeaf::sized("b", 20.0, 10.0).element(),
    ])
    .element();
    let tree = Reconciler::new(ReconcilerConfig::default(), RuntimeHandle::detached())
        .build(root, None, StateUpdateMap::default(), BuildTrigger::empty())
        .expect("build")
        .generation
        .tree;
    compute_layout(&tree, SizeRange::loose(Size::new(100.0, 100.0))).expect("layout")
}

#[test]
fn test_count_nodes() {
    assert_eq!(count_nodes(&sample()), 3);
}

#[test]
fn format_uses_absolute_frames() {
    let text = format_layout(&sample());
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("TestStack#"));
    assert!(lines[2].starts_with("  TestLeaf#"));
    assert!(lines[2].ends_with("[10.0, 0.0, 20.0 x 10.0]"));
}
