//! Cross-axis alignment of children within a line.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlignItems {
    Start,
    End,
    Center,
    /// Treated as `Start`; text baselines are not modelled.
    Baseline,
    #[default]
    Stretch,
}

/// Per-child override of the container's [`AlignItems`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlignSelf {
    #[default]
    Auto,
    Start,
    End,
    Center,
    Baseline,
    Stretch,
}

impl AlignSelf {
    pub fn resolve(self, container: AlignItems) -> AlignItems {
        match self {
            AlignSelf::Auto => container,
            AlignSelf::Start => AlignItems::Start,
            AlignSelf::End => AlignItems::End,
            AlignSelf::Center => AlignItems::Center,
            AlignSelf::Baseline => AlignItems::Baseline,
            AlignSelf::Stretch => AlignItems::Stretch,
        }
    }
}

impl AlignItems {
    /// Offset of a child of extent `child` inside a line of extent `line`.
    /// Margins are handled by the caller.
    pub fn offset(self, line: f32, child: f32) -> f32 {
        match self {
            AlignItems::Start | AlignItems::Baseline | AlignItems::Stretch => 0.0,
            AlignItems::Center => (line - child) / 2.0,
            AlignItems::End => line - child,
        }
    }
}
