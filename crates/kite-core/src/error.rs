use std::fmt;

use crate::{Arity, Key, NodeId, ProducerClass};

/// Errors that abort a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Two siblings share a class and an explicit key.
    AmbiguousIdentity {
        parent: NodeId,
        class: ProducerClass,
        key: Key,
    },
    /// Strict identity is on and a parent has several unkeyed children of one
    /// class.
    StrictIdentityViolation {
        parent: NodeId,
        class: ProducerClass,
        count: usize,
    },
    /// A producer returned more children than its arity allows.
    ProtocolViolation {
        node: NodeId,
        class: ProducerClass,
        expected: Arity,
        found: usize,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::AmbiguousIdentity { parent, class, key } => write!(
                f,
                "children of node {parent} share class {class} and key {key}"
            ),
            BuildError::StrictIdentityViolation {
                parent,
                class,
                count,
            } => write!(
                f,
                "node {parent} has {count} unkeyed children of class {class}; keys are required in strict mode"
            ),
            BuildError::ProtocolViolation {
                node,
                class,
                expected,
                found,
            } => write!(
                f,
                "{class} (node {node}) declared {expected:?} arity but produced {found} children"
            ),
        }
    }
}

impl std::error::Error for BuildError {}
