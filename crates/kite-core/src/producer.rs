//! The producer (component) protocol.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use kite_ui_layout::{ComponentSize, LayoutPolicy};

use crate::context::{ContextOverlay, ContextValue};
use crate::controller::Controller;
use crate::scope::{ScopeHandle, StateBox};
use crate::view::ViewConfiguration;
use crate::{Key, NodeId};

/// A producer shared between the generation that created it and any later
/// generation that reuses its node.
pub type Element = Arc<dyn Producer>;

/// Runtime class of a producer; the type half of a node's identity.
#[derive(Clone, Copy)]
pub struct ProducerClass {
    id: TypeId,
    name: &'static str,
}

impl ProducerClass {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name.
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path or generic arguments.
    pub fn name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for ProducerClass {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ProducerClass {}

impl Hash for ProducerClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ProducerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ProducerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Produces no children; `render` is never called.
    Leaf,
    /// Produces at most one child.
    Single,
    Multi,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Statefulness {
    Stateless,
    /// Owns a scope handle that survives across generations.
    Stateful,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReusePolicy {
    /// May be reused wholesale when not dirty and `should_reuse` agrees.
    ReuseAware,
    AlwaysRebuild,
}

/// Capability tag the reconciler dispatches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Capabilities {
    pub arity: Arity,
    pub state: Statefulness,
    pub reuse: ReusePolicy,
}

impl Capabilities {
    pub const LEAF: Capabilities = Capabilities::new(Arity::Leaf);
    pub const SINGLE: Capabilities = Capabilities::new(Arity::Single);
    pub const MULTI: Capabilities = Capabilities::new(Arity::Multi);

    pub const fn new(arity: Arity) -> Self {
        Self {
            arity,
            state: Statefulness::Stateless,
            reuse: ReusePolicy::AlwaysRebuild,
        }
    }

    pub const fn stateful(mut self) -> Self {
        self.state = Statefulness::Stateful;
        self
    }

    pub const fn reuse_aware(mut self) -> Self {
        self.reuse = ReusePolicy::ReuseAware;
        self
    }

    pub fn is_stateful(&self) -> bool {
        self.state == Statefulness::Stateful
    }

    pub fn is_reuse_aware(&self) -> bool {
        self.reuse == ReusePolicy::ReuseAware
    }
}

/// What `render` returned.
pub enum Children {
    None,
    One(Element),
    Many(Vec<Element>),
}

impl Children {
    pub fn len(&self) -> usize {
        match self {
            Children::None => 0,
            Children::One(_) => 1,
            Children::Many(children) => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<Element> {
        match self {
            Children::None => Vec::new(),
            Children::One(child) => vec![child],
            Children::Many(children) => children,
        }
    }
}

impl From<Element> for Children {
    fn from(child: Element) -> Self {
        Children::One(child)
    }
}

impl From<Option<Element>> for Children {
    fn from(child: Option<Element>) -> Self {
        child.map_or(Children::None, Children::One)
    }
}

impl From<Vec<Element>> for Children {
    fn from(children: Vec<Element>) -> Self {
        Children::Many(children)
    }
}

pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An immutable, side-effect-free description of a piece of UI.
///
/// Producers are constructed fresh every generation, possibly on a
/// background thread, and are never mutated afterwards.
pub trait Producer: AsAny + Send + Sync + 'static {
    fn class(&self) -> ProducerClass {
        ProducerClass::of::<Self>()
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::LEAF
    }

    /// Produces this node's children. Not called for leaf producers.
    fn render(&self, _cx: &mut RenderContext<'_>) -> Children {
        Children::None
    }

    /// State for a freshly created scope handle.
    fn initial_state(&self) -> Option<StateBox> {
        None
    }

    /// Explicit identifier that disambiguates same-class siblings.
    fn scope_key(&self) -> Option<Key> {
        None
    }

    /// Whether a non-dirty node built from `previous` may be reused for this
    /// producer. Only consulted for reuse-aware producers.
    fn should_reuse(&self, _previous: &dyn Producer) -> bool {
        true
    }

    fn view(&self) -> Option<ViewConfiguration> {
        None
    }

    fn size(&self) -> ComponentSize {
        ComponentSize::auto()
    }

    fn layout_policy(&self) -> LayoutPolicy {
        match self.capabilities().arity {
            Arity::Leaf => LayoutPolicy::Leaf,
            Arity::Single => LayoutPolicy::Single,
            Arity::Multi => LayoutPolicy::Overlay,
        }
    }

    /// Called once when this producer's scope handle is created.
    fn make_controller(&self) -> Option<Arc<dyn Controller>> {
        None
    }

    /// Context value made visible to this producer's descendants.
    fn provided_context(&self) -> Option<Arc<dyn ContextValue>> {
        None
    }
}

impl dyn Producer {
    pub fn downcast_ref<T: Producer>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Producer>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl fmt::Debug for dyn Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class())
    }
}

/// Explicit build context handed to `render`.
///
/// Carries the node being evaluated, its scope handle (if stateful) and the
/// context overlay visible at this point of the tree.
pub struct RenderContext<'a> {
    node_id: NodeId,
    scope: Option<&'a ScopeHandle>,
    overlay: &'a ContextOverlay,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(
        node_id: NodeId,
        scope: Option<&'a ScopeHandle>,
        overlay: &'a ContextOverlay,
    ) -> Self {
        Self {
            node_id,
            scope,
            overlay,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn scope(&self) -> Option<&'a ScopeHandle> {
        self.scope
    }

    /// Current state, downcast to `T`.
    pub fn state<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.scope.and_then(ScopeHandle::state_as::<T>)
    }

    /// Nearest context value of type `T` provided by an ancestor.
    pub fn context<T: ContextValue>(&self) -> Option<&'a T> {
        self.overlay.get::<T>()
    }

    pub fn overlay(&self) -> &'a ContextOverlay {
        self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    impl Producer for Plain {}

    struct Other;
    impl Producer for Other {}

    #[test]
    fn class_defaults_to_concrete_type() {
        let plain: Element = Arc::new(Plain);
        let other: Element = Arc::new(Other);
        assert_eq!(plain.class(), ProducerClass::of::<Plain>());
        assert_ne!(plain.class(), other.class());
        assert_eq!(plain.class().name(), "Plain");
    }

    #[test]
    fn downcast_goes_through_the_vtable() {
        let plain: Element = Arc::new(Plain);
        assert!(plain.is::<Plain>());
        assert!(plain.downcast_ref::<Other>().is_none());
    }

    #[test]
    fn default_policy_follows_arity() {
        assert!(matches!(Plain.layout_policy(), LayoutPolicy::Leaf));
        assert_eq!(Capabilities::MULTI.stateful().arity, Arity::Multi);
        assert!(Capabilities::SINGLE.reuse_aware().is_reuse_aware());
    }
}
