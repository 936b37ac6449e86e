use bitflags::bitflags;

bitflags! {
    /// What caused a reconciliation pass. Empty means a fresh build.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BuildTrigger: u8 {
        const PROPS_UPDATE = 1 << 0;
        const STATE_UPDATE = 1 << 1;
        /// Global environment changed; nothing may be reused.
        const ENVIRONMENT_UPDATE = 1 << 2;
    }
}

impl BuildTrigger {
    pub fn is_fresh(self) -> bool {
        self.is_empty()
    }
}

/// How soon a requested state update should be reconciled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdateMode {
    /// Before the next paint.
    Synchronous,
    /// Batched with other updates.
    #[default]
    Asynchronous,
}
