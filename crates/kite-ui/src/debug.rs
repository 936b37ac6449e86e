//! Debug formatting for layouts.

use std::fmt::Write;

use kite_ui_layout::Point;

use crate::layout::Layout;

/// One line per node: class, id, absolute frame.
pub fn format_layout(layout: &Layout) -> String {
    let mut output = String::new();
    format_layout_into(layout, Point::ZERO, 0, &mut output);
    output
}

fn format_layout_into(layout: &Layout, origin: Point, depth: usize, output: &mut String) {
    let indent = "  ".repeat(depth);
    let size = layout.size();
    let _ = writeln!(
        output,
        "{indent}{}#{} [{:.1}, {:.1}, {:.1} x {:.1}]",
        layout.node().class(),
        layout.node_id(),
        origin.x,
        origin.y,
        size.width,
        size.height
    );
    for child in layout.children() {
        format_layout_into(&child.layout, origin + child.position, depth + 1, output);
    }
}

pub fn log_layout(layout: &Layout) {
    if log::log_enabled!(log::Level::Debug) {
        log::debug!("layout:\n{}", format_layout(layout));
    }
}

pub fn count_nodes(layout: &Layout) -> usize {
    1 + layout
        .children()
        .iter()
        .map(|child| count_nodes(&child.layout))
        .sum::<usize>()
}

#[cfg(test)]
#[path = "tests/debug_tests.rs"]
mod tests;
