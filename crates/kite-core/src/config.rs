//! Reconciler configuration.

const ENV_FASTER_STATE_UPDATES: &str = "KITE_FASTER_STATE_UPDATES";
const ENV_FASTER_PROPS_UPDATES: &str = "KITE_FASTER_PROPS_UPDATES";
const ENV_STRICT_IDENTITY: &str = "KITE_STRICT_IDENTITY";
const ENV_DEBUG: &str = "KITE_DEBUG";

/// Switches that control how aggressively the reconciler reuses subtrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Reuse non-dirty, reuse-aware nodes on state-update passes.
    pub faster_state_updates: bool,
    /// Reuse non-dirty, reuse-aware nodes on props-update passes too.
    pub faster_props_updates: bool,
    /// Reject more than one unkeyed sibling of the same class.
    pub strict_sibling_identity: bool,
    /// Dump every built tree at debug level.
    pub debug_dump: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            faster_state_updates: true,
            faster_props_updates: false,
            strict_sibling_identity: false,
            debug_dump: false,
        }
    }
}

impl ReconcilerConfig {
    /// Defaults overridden by `KITE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |name: &str, default: bool| match lookup(name) {
            Some(value) => parse_flag(&value).unwrap_or_else(|| {
                log::warn!("ignoring {name}={value:?}: expected a boolean");
                default
            }),
            None => default,
        };
        Self {
            faster_state_updates: flag(ENV_FASTER_STATE_UPDATES, defaults.faster_state_updates),
            faster_props_updates: flag(ENV_FASTER_PROPS_UPDATES, defaults.faster_props_updates),
            strict_sibling_identity: flag(ENV_STRICT_IDENTITY, defaults.strict_sibling_identity),
            debug_dump: flag(ENV_DEBUG, defaults.debug_dump),
        }
    }

    pub fn with_faster_state_updates(mut self, enabled: bool) -> Self {
        self.faster_state_updates = enabled;
        self
    }

    pub fn with_faster_props_updates(mut self, enabled: bool) -> Self {
        self.faster_props_updates = enabled;
        self
    }

    pub fn with_strict_sibling_identity(mut self, enabled: bool) -> Self {
        self.strict_sibling_identity = enabled;
        self
    }

    pub fn with_debug_dump(mut self, enabled: bool) -> Self {
        self.debug_dump = enabled;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_overrides_defaults() {
        let config = ReconcilerConfig::from_lookup(|name| match name {
            ENV_FASTER_STATE_UPDATES => Some("0".into()),
            ENV_STRICT_IDENTITY => Some("true".into()),
            ENV_DEBUG => Some("maybe".into()),
            _ => None,
        });
        assert!(!config.faster_state_updates);
        assert!(!config.faster_props_updates);
        assert!(config.strict_sibling_identity);
        assert!(!config.debug_dump);
    }
}
