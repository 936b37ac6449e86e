//! Distribution of free space along the main axis and between lines.

/// How leftover main-axis space is distributed among a line's children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JustifyContent {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// How leftover cross-axis space is distributed among lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlignContent {
    #[default]
    Start,
    End,
    Center,
    SpaceBetween,
    SpaceAround,
    Stretch,
}

/// Offsets produced by distributing free space across `count` items.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Distribution {
    /// Offset before the first item.
    pub leading: f32,
    /// Extra space inserted between consecutive items.
    pub between: f32,
    /// Extra extent added to every item (only `AlignContent::Stretch`).
    pub grow_each: f32,
}

impl JustifyContent {
    /// Distributes `free` space among `count` items.
    ///
    /// Negative free space follows the CSS fallbacks: the spacing modes
    /// collapse to `Start` (between) or `Center` (around/evenly), and
    /// `Center`/`End` may push items before the start edge.
    pub fn distribute(self, free: f32, count: usize) -> Distribution {
        let n = count as f32;
        match self {
            JustifyContent::Start => Distribution::default(),
            JustifyContent::Center => Distribution {
                leading: free / 2.0,
                ..Distribution::default()
            },
            JustifyContent::End => Distribution {
                leading: free,
                ..Distribution::default()
            },
            JustifyContent::SpaceBetween => {
                if free > 0.0 && count > 1 {
                    Distribution {
                        between: free / (n - 1.0),
                        ..Distribution::default()
                    }
                } else {
                    Distribution::default()
                }
            }
            JustifyContent::SpaceAround => {
                if free > 0.0 && count > 0 {
                    let gap = free / n;
                    Distribution {
                        leading: gap / 2.0,
                        between: gap,
                        ..Distribution::default()
                    }
                } else {
                    Self::Center.distribute(free, count)
                }
            }
            JustifyContent::SpaceEvenly => {
                if free > 0.0 {
                    let gap = free / (n + 1.0);
                    Distribution {
                        leading: gap,
                        between: gap,
                        ..Distribution::default()
                    }
                } else {
                    Self::Center.distribute(free, count)
                }
            }
        }
    }
}

impl AlignContent {
    /// Distributes `free` cross space among `count` lines.
    pub fn distribute(self, free: f32, count: usize) -> Distribution {
        match self {
            AlignContent::Start => JustifyContent::Start.distribute(free, count),
            AlignContent::End => JustifyContent::End.distribute(free, count),
            AlignContent::Center => JustifyContent::Center.distribute(free, count),
            AlignContent::SpaceBetween => JustifyContent::SpaceBetween.distribute(free, count),
            AlignContent::SpaceAround => JustifyContent::SpaceAround.distribute(free, count),
            AlignContent::Stretch => {
                if free > 0.0 && count > 0 {
                    Distribution {
                        grow_each: free / count as f32,
                        ..Distribution::default()
                    }
                } else {
                    Distribution::default()
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/arrangement_tests.rs"]
mod tests;
