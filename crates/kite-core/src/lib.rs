#![doc = r"Core reconciliation runtime for Kite: producers, identity and state, and the tree reconciler."]

extern crate self as kite_core;

pub mod collections;
pub mod hash;
pub mod platform;
pub mod runtime;
pub mod view;

mod config;
mod context;
mod controller;
mod deferred;
mod error;
mod listener;
mod producer;
mod reconciler;
mod root;
mod scope;
mod tree;
mod trigger;

pub use config::ReconcilerConfig;
pub use context::{context_changed, ContextOverlay, ContextValue};
pub use controller::Controller;
pub use deferred::{DeferredId, DeferredQueue};
pub use error::BuildError;
pub use hash::key_of;
pub use listener::{noop_listener, BuildListener, NoopListener};
pub use platform::RuntimeScheduler;
pub use producer::{
    Arity, AsAny, Capabilities, Children, Element, Producer, ProducerClass, RenderContext,
    ReusePolicy, Statefulness,
};
pub use reconciler::{BuildResult, Generation, Reconciler, ReuseReport};
pub use root::{BuildOutput, BuildPass, CommitOutcome, ComponentRoot};
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle, StateUpdateMap};
pub use scope::{ScopeHandle, ScopeRoot, StateBox, StateMutator};
pub use tree::{ComponentKey, Disambiguator, TreeNode};
pub use trigger::{BuildTrigger, UpdateMode};
pub use view::{
    AttributeValue, NativeView, PersistentAttributeShape, ViewAttribute, ViewClass, ViewClassKey,
    ViewConfiguration,
};

use std::sync::atomic::{AtomicUsize, Ordering};

pub type Key = u64;
pub type NodeId = usize;

static NEXT_NODE_ID: AtomicUsize = AtomicUsize::new(1);

fn next_node_id() -> NodeId {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

pub mod prelude {
    pub use crate::{
        BuildTrigger, Capabilities, Children, Element, Producer, RenderContext, ScopeHandle,
        UpdateMode,
    };
    pub use kite_ui_layout::prelude::*;
}
