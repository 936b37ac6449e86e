use std::fmt::Write as _;
use std::sync::Arc;

use crate::context::ContextValue;
use crate::{Element, Key, NodeId, ProducerClass, ScopeHandle};

/// Second half of a node's identity under its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Disambiguator {
    Key(Key),
    /// Position among unkeyed siblings of the same class, in render order.
    Ordinal(usize),
}

/// Identity of a node among its siblings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    pub class: ProducerClass,
    pub disambiguator: Disambiguator,
}

impl ComponentKey {
    pub fn new(class: ProducerClass, disambiguator: Disambiguator) -> Self {
        Self {
            class,
            disambiguator,
        }
    }

    pub(crate) fn root(producer: &Element) -> Self {
        let disambiguator = producer
            .scope_key()
            .map_or(Disambiguator::Ordinal(0), Disambiguator::Key);
        Self::new(producer.class(), disambiguator)
    }
}

/// A reconciled node. Immutable; a reused node is shared by reference
/// between generations together with its whole subtree.
pub struct TreeNode {
    id: NodeId,
    key: ComponentKey,
    producer: Element,
    scope: Option<ScopeHandle>,
    context: Option<Arc<dyn ContextValue>>,
    children: Vec<Arc<TreeNode>>,
    fast_path: bool,
}

impl TreeNode {
    pub(crate) fn new(
        id: NodeId,
        key: ComponentKey,
        producer: Element,
        scope: Option<ScopeHandle>,
        context: Option<Arc<dyn ContextValue>>,
        children: Vec<Arc<TreeNode>>,
        fast_path: bool,
    ) -> Self {
        Self {
            id,
            key,
            producer,
            scope,
            context,
            children,
            fast_path,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn key(&self) -> ComponentKey {
        self.key
    }

    pub fn class(&self) -> ProducerClass {
        self.key.class
    }

    pub fn producer(&self) -> &Element {
        &self.producer
    }

    pub fn scope(&self) -> Option<&ScopeHandle> {
        self.scope.as_ref()
    }

    pub fn provided_context(&self) -> Option<&Arc<dyn ContextValue>> {
        self.context.as_ref()
    }

    pub fn children(&self) -> &[Arc<TreeNode>] {
        &self.children
    }

    /// Leaf appended without identity matching; gets a fresh id every
    /// generation.
    pub fn is_fast_path(&self) -> bool {
        self.fast_path
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(|child| child.count()).sum::<usize>()
    }

    pub fn find(&self, id: NodeId) -> Option<&TreeNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Depth-first pre-order visit with each node's parent id.
    pub fn visit(&self, visitor: &mut impl FnMut(&TreeNode, Option<NodeId>)) {
        self.visit_inner(None, visitor);
    }

    fn visit_inner(&self, parent: Option<NodeId>, visitor: &mut impl FnMut(&TreeNode, Option<NodeId>)) {
        visitor(self, parent);
        for child in &self.children {
            child.visit_inner(Some(self.id), visitor);
        }
    }

    /// Indented, one-line-per-node rendering of the subtree.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{indent}{}#{}", self.class(), self.id);
        if let crate::Disambiguator::Key(key) = self.key.disambiguator {
            let _ = write!(out, " key={key}");
        }
        if self.scope.is_some() {
            out.push_str(" [scope]");
        }
        if self.fast_path {
            out.push_str(" [leaf]");
        }
        out.push('\n');
        for child in &self.children {
            child.dump_into(out, depth + 1);
        }
    }
}

impl std::fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeNode")
            .field("id", &self.id)
            .field("class", &self.class())
            .field("children", &self.children)
            .finish()
    }
}
