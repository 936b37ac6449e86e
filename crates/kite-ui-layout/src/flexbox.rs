//! Single-pass flexbox used by stacking containers.

use kite_ui_graphics::{EdgeInsets, Point, Size};

use crate::{
    AlignContent, AlignItems, AlignSelf, Axis, ContainerLayout, Distribution, JustifyContent,
    Measurable, Measured, Placed, RelativeDimension, SizeRange,
};

const EPSILON: f32 = 1e-4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlexDirection {
    #[default]
    Column,
    Row,
    ColumnReverse,
    RowReverse,
}

impl FlexDirection {
    pub fn axis(self) -> Axis {
        match self {
            FlexDirection::Row | FlexDirection::RowReverse => Axis::Horizontal,
            FlexDirection::Column | FlexDirection::ColumnReverse => Axis::Vertical,
        }
    }

    pub fn is_reversed(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

/// Offsets of an absolutely positioned child from the container's edges.
/// `Auto` leaves an edge unset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AbsoluteInsets {
    pub left: RelativeDimension,
    pub top: RelativeDimension,
    pub right: RelativeDimension,
    pub bottom: RelativeDimension,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum FlexPosition {
    #[default]
    Relative,
    /// Taken out of the flow and placed against the container's frame.
    Absolute(AbsoluteInsets),
}

/// Per-child flex parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlexItem {
    pub spacing_before: f32,
    pub spacing_after: f32,
    pub margin: EdgeInsets,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    /// `Auto` measures the child with an unconstrained main axis.
    pub flex_basis: RelativeDimension,
    pub align_self: AlignSelf,
    pub position: FlexPosition,
}

impl Default for FlexItem {
    fn default() -> Self {
        Self {
            spacing_before: 0.0,
            spacing_after: 0.0,
            margin: EdgeInsets::ZERO,
            flex_grow: 0.0,
            flex_shrink: 0.0,
            flex_basis: RelativeDimension::Auto,
            align_self: AlignSelf::Auto,
            position: FlexPosition::Relative,
        }
    }
}

impl FlexItem {
    pub fn grow(factor: f32) -> Self {
        Self {
            flex_grow: factor,
            ..Self::default()
        }
    }

    pub fn shrink(factor: f32) -> Self {
        Self {
            flex_shrink: factor,
            ..Self::default()
        }
    }

    pub fn absolute(insets: AbsoluteInsets) -> Self {
        Self {
            position: FlexPosition::Absolute(insets),
            ..Self::default()
        }
    }

    pub fn with_basis(mut self, basis: impl Into<RelativeDimension>) -> Self {
        self.flex_basis = basis.into();
        self
    }

    pub fn with_margin(mut self, margin: EdgeInsets) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_align_self(mut self, align: AlignSelf) -> Self {
        self.align_self = align;
        self
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self.position, FlexPosition::Absolute(_))
    }
}

/// Container-level flex parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlexboxStyle {
    pub direction: FlexDirection,
    /// Space inserted between consecutive in-flow children.
    pub spacing: f32,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub align_content: AlignContent,
    pub wrap: FlexWrap,
    pub padding: EdgeInsets,
}

impl FlexboxStyle {
    pub fn row() -> Self {
        Self {
            direction: FlexDirection::Row,
            ..Self::default()
        }
    }

    pub fn column() -> Self {
        Self::default()
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_justify(mut self, justify: JustifyContent) -> Self {
        self.justify_content = justify;
        self
    }

    pub fn with_align_items(mut self, align: AlignItems) -> Self {
        self.align_items = align;
        self
    }

    pub fn with_wrap(mut self, wrap: FlexWrap) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_padding(mut self, padding: EdgeInsets) -> Self {
        self.padding = padding;
        self
    }
}

/// A child handed to [`FlexboxStyle::layout`].
pub struct FlexChild<M> {
    pub measurable: M,
    pub item: FlexItem,
}

impl<M> FlexChild<M> {
    pub fn new(measurable: M, item: FlexItem) -> Self {
        Self { measurable, item }
    }
}

struct Entry<T> {
    index: usize,
    item: FlexItem,
    align: AlignItems,
    margin_main: (f32, f32),
    margin_cross: (f32, f32),
    cross_bounds: (f32, f32),
    main: f32,
    cross: f32,
    measured: Measured<T>,
}

impl<T> Entry<T> {
    fn outer_main(&self) -> f32 {
        self.item.spacing_before
            + self.margin_main.0
            + self.main
            + self.margin_main.1
            + self.item.spacing_after
    }

    fn outer_cross(&self) -> f32 {
        self.margin_cross.0 + self.cross + self.margin_cross.1
    }

    fn apply(&mut self, axis: Axis, measured: Measured<T>) {
        self.main = axis.main(measured.size);
        self.cross = axis.cross_of(measured.size);
        self.measured = measured;
    }
}

struct Line<T> {
    entries: Vec<Entry<T>>,
    cross: f32,
}

impl<T> Line<T> {
    fn new(entries: Vec<Entry<T>>) -> Self {
        Self { entries, cross: 0.0 }
    }

    fn main_sum(&self, spacing: f32) -> f32 {
        let gaps = self.entries.len().saturating_sub(1) as f32 * spacing;
        self.entries.iter().map(Entry::outer_main).sum::<f32>() + gaps
    }
}

impl FlexboxStyle {
    /// Lays out `children` inside `range`.
    ///
    /// Children are measured once with their basis (or an unconstrained main
    /// axis), flexed to fit the main bounds, re-measured where their main
    /// extent changed, aligned on the cross axis and finally positioned. The
    /// returned size includes padding; placements are in the container's
    /// coordinate space and come back in child order.
    pub fn layout<M: Measurable>(
        &self,
        children: &[FlexChild<M>],
        range: SizeRange,
    ) -> Result<ContainerLayout<M::Output>, M::Error> {
        let axis = self.direction.axis();
        let inner = range.deflate(self.padding);
        let (min_main, max_main) = axis.bounds(&inner);
        let (min_cross, max_cross) = axis.cross().bounds(&inner);
        let parent_size = inner.definite_size();
        let parent_main = axis.main(parent_size);
        let definite_cross = (min_cross == max_cross).then_some(min_cross);
        let single_line = self.wrap == FlexWrap::NoWrap || !max_main.is_finite();

        let mut slots: Vec<Option<Placed<M::Output>>> = children.iter().map(|_| None).collect();
        let mut entries = Vec::with_capacity(children.len());

        for (index, child) in children.iter().enumerate() {
            if child.item.is_absolute() {
                continue;
            }
            let align = child.item.align_self.resolve(self.align_items);
            let margin_main = axis.insets(&child.item.margin);
            let margin_cross = axis.cross().insets(&child.item.margin);
            let cross_margin = margin_cross.0 + margin_cross.1;
            let cross_bounds = match definite_cross {
                Some(cross) if align == AlignItems::Stretch && single_line => {
                    let tight = (cross - cross_margin).max(0.0);
                    (tight, tight)
                }
                _ => (0.0, (max_cross - cross_margin).max(0.0)),
            };
            let basis = child.item.flex_basis.resolve(f32::NAN, parent_main);
            let main_bounds = if basis.is_finite() {
                let basis = basis.max(0.0);
                (basis, basis)
            } else {
                (0.0, f32::INFINITY)
            };
            let measured = child
                .measurable
                .measure(axis.range(main_bounds, cross_bounds), parent_size)?;
            entries.push(Entry {
                index,
                item: child.item,
                align,
                margin_main,
                margin_cross,
                cross_bounds,
                main: axis.main(measured.size),
                cross: axis.cross_of(measured.size),
                measured,
            });
        }

        let mut lines = self.break_lines(entries, single_line, max_main);

        for line in &mut lines {
            let sum = line.main_sum(self.spacing);
            let mains: Vec<f32> = line.entries.iter().map(|e| e.main).collect();
            let targets = if sum < min_main - EPSILON {
                let grow: Vec<f32> = line.entries.iter().map(|e| e.item.flex_grow).collect();
                distribute_growth(&mains, &grow, min_main - sum)
            } else if sum > max_main + EPSILON {
                let shrink: Vec<f32> = line.entries.iter().map(|e| e.item.flex_shrink).collect();
                distribute_shrink(&mains, &shrink, sum - max_main)
            } else {
                None
            };
            let Some(targets) = targets else { continue };
            for (entry, target) in line.entries.iter_mut().zip(targets) {
                if (entry.main - target).abs() <= EPSILON {
                    continue;
                }
                let measured = children[entry.index]
                    .measurable
                    .measure(axis.range((target, target), entry.cross_bounds), parent_size)?;
                entry.apply(axis, measured);
            }
        }

        for line in &mut lines {
            line.cross = line
                .entries
                .iter()
                .map(Entry::outer_cross)
                .fold(0.0, f32::max);
        }
        if single_line {
            if let Some(line) = lines.first_mut() {
                line.cross = line.cross.max(min_cross).min(max_cross);
            }
        }

        let content_main = lines
            .iter()
            .map(|line| line.main_sum(self.spacing))
            .fold(0.0, f32::max);
        let container_main = content_main.max(min_main).min(max_main);
        let total_cross: f32 = lines.iter().map(|line| line.cross).sum();
        let container_cross = total_cross.max(min_cross).min(max_cross);

        let line_distribution = if single_line {
            Distribution::default()
        } else {
            self.align_content
                .distribute(container_cross - total_cross, lines.len())
        };

        for line in &mut lines {
            line.cross += line_distribution.grow_each;
            for entry in &mut line.entries {
                if entry.align != AlignItems::Stretch {
                    continue;
                }
                let target = (line.cross - entry.margin_cross.0 - entry.margin_cross.1).max(0.0);
                if (entry.cross - target).abs() <= EPSILON {
                    continue;
                }
                let measured = children[entry.index].measurable.measure(
                    axis.range((entry.main, entry.main), (target, target)),
                    parent_size,
                )?;
                entry.apply(axis, measured);
            }
        }

        let padding = self.padding;
        let reversed = self.direction.is_reversed();
        let mut line_cursor = line_distribution.leading;
        for (line_index, line) in lines.into_iter().enumerate() {
            if line_index > 0 {
                line_cursor += line_distribution.between;
            }
            let free = container_main - line.main_sum(self.spacing);
            let Line { entries, cross } = line;
            let line_start = if self.wrap == FlexWrap::WrapReverse {
                container_cross - line_cursor - cross
            } else {
                line_cursor
            };
            line_cursor += cross;

            let distribution = self.justify_content.distribute(free, entries.len());
            let mut cursor = distribution.leading;
            for (position, entry) in entries.into_iter().enumerate() {
                if position > 0 {
                    cursor += self.spacing + distribution.between;
                }
                cursor += entry.item.spacing_before + entry.margin_main.0;
                let main_pos = if reversed {
                    container_main - cursor - entry.main
                } else {
                    cursor
                };
                cursor += entry.main + entry.margin_main.1 + entry.item.spacing_after;

                let (lead, trail) = entry.margin_cross;
                let cross_pos = line_start + lead + entry.align.offset(cross - lead - trail, entry.cross);
                let local = axis.point(main_pos, cross_pos);
                slots[entry.index] = Some(Placed {
                    position: Point::new(local.x + padding.left, local.y + padding.top),
                    measured: entry.measured,
                });
            }
        }

        let content = axis.size(container_main, container_cross);
        let size = Size::new(
            content.width + padding.horizontal_sum(),
            content.height + padding.vertical_sum(),
        );

        for (index, child) in children.iter().enumerate() {
            let FlexPosition::Absolute(insets) = child.item.position else {
                continue;
            };
            slots[index] = Some(place_absolute(child, &insets, size, padding)?);
        }

        Ok(ContainerLayout {
            size,
            children: slots.into_iter().flatten().collect(),
        })
    }

    fn break_lines<T>(&self, entries: Vec<Entry<T>>, single_line: bool, max_main: f32) -> Vec<Line<T>> {
        if single_line {
            return if entries.is_empty() {
                Vec::new()
            } else {
                vec![Line::new(entries)]
            };
        }
        let mut lines = Vec::new();
        let mut current: Vec<Entry<T>> = Vec::new();
        let mut sum = 0.0;
        for entry in entries {
            let extent = entry.outer_main();
            if current.is_empty() {
                sum = extent;
            } else if sum + self.spacing + extent > max_main + EPSILON {
                lines.push(Line::new(std::mem::take(&mut current)));
                sum = extent;
            } else {
                sum += self.spacing + extent;
            }
            current.push(entry);
        }
        if !current.is_empty() {
            lines.push(Line::new(current));
        }
        lines
    }
}

fn place_absolute<M: Measurable>(
    child: &FlexChild<M>,
    insets: &AbsoluteInsets,
    container: Size,
    padding: EdgeInsets,
) -> Result<Placed<M::Output>, M::Error> {
    let left = insets.left.resolve(f32::NAN, container.width);
    let right = insets.right.resolve(f32::NAN, container.width);
    let top = insets.top.resolve(f32::NAN, container.height);
    let bottom = insets.bottom.resolve(f32::NAN, container.height);

    let span = |start: f32, end: f32, extent: f32| {
        if start.is_finite() && end.is_finite() {
            let pinned = (extent - start - end).max(0.0);
            (pinned, pinned)
        } else {
            (0.0, f32::INFINITY)
        }
    };
    let (min_w, max_w) = span(left, right, container.width);
    let (min_h, max_h) = span(top, bottom, container.height);
    let range = SizeRange::new(Size::new(min_w, min_h), Size::new(max_w, max_h));
    let measured = child.measurable.measure(range, container)?;

    let offset = |start: f32, end: f32, extent: f32, child: f32, fallback: f32| {
        if start.is_finite() {
            start
        } else if end.is_finite() {
            extent - end - child
        } else {
            fallback
        }
    };
    let x = offset(left, right, container.width, measured.size.width, padding.left);
    let y = offset(top, bottom, container.height, measured.size.height, padding.top);
    Ok(Placed {
        position: Point::new(x, y),
        measured,
    })
}

/// Splits `shortfall` across children in proportion to their grow factors.
fn distribute_growth(mains: &[f32], factors: &[f32], shortfall: f32) -> Option<Vec<f32>> {
    let total: f32 = factors.iter().filter(|f| **f > 0.0).sum();
    if total <= 0.0 {
        return None;
    }
    Some(
        mains
            .iter()
            .zip(factors)
            .map(|(main, factor)| main + shortfall * factor.max(0.0) / total)
            .collect(),
    )
}

/// Removes `excess` in proportion to shrink factors. Children that would go
/// below zero are frozen at zero and the rest is redistributed.
fn distribute_shrink(mains: &[f32], factors: &[f32], mut excess: f32) -> Option<Vec<f32>> {
    let mut sizes = mains.to_vec();
    let mut frozen: Vec<bool> = factors.iter().map(|factor| *factor <= 0.0).collect();
    if frozen.iter().all(|f| *f) {
        return None;
    }
    loop {
        let total: f32 = factors
            .iter()
            .zip(&frozen)
            .filter(|(_, frozen)| !**frozen)
            .map(|(factor, _)| *factor)
            .sum();
        if excess <= EPSILON || total <= 0.0 {
            break;
        }
        let mut clamped = false;
        for i in 0..sizes.len() {
            if !frozen[i] && sizes[i] - excess * factors[i] / total <= 0.0 {
                excess -= sizes[i];
                sizes[i] = 0.0;
                frozen[i] = true;
                clamped = true;
            }
        }
        if !clamped {
            for i in 0..sizes.len() {
                if !frozen[i] {
                    sizes[i] -= excess * factors[i] / total;
                }
            }
            break;
        }
    }
    Some(sizes)
}

#[cfg(test)]
#[path = "tests/flexbox_tests.rs"]
mod tests;
