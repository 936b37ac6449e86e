use super::*;
use crate::{Children, Producer, ScopeHandle, StateBox, StateMutator, StateUpdateMap};
use std::sync::atomic::{AtomicUsize, Ordering};

struct Label;

impl Producer for Label {}

struct Counter {
    key: Option<u64>,
    start: i32,
}

impl Counter {
    fn new(start: i32) -> Element {
        Arc::new(Counter { key: None, start })
    }

    fn keyed(key: u64, start: i32) -> Element {
        Arc::new(Counter {
            key: Some(key),
            start,
        })
    }
}

impl Producer for Counter {
    fn capabilities(&self) -> Capabilities {
        Capabilities::LEAF.stateful().reuse_aware()
    }

    fn initial_state(&self) -> Option<StateBox> {
        Some(Arc::new(self.start))
    }

    fn scope_key(&self) -> Option<u64> {
        self.key
    }
}

struct Stack {
    children: Vec<Element>,
    renders: Arc<AtomicUsize>,
}

fn stack(children: Vec<Element>) -> Element {
    Arc::new(Stack {
        children,
        renders: Arc::new(AtomicUsize::new(0)),
    })
}

impl Producer for Stack {
    fn capabilities(&self) -> Capabilities {
        Capabilities::MULTI.reuse_aware()
    }

    fn render(&self, _cx: &mut RenderContext<'_>) -> Children {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Children::Many(self.children.clone())
    }
}

struct Picky {
    version: u32,
}

impl Producer for Picky {
    fn capabilities(&self) -> Capabilities {
        Capabilities::LEAF.stateful().reuse_aware()
    }

    fn should_reuse(&self, previous: &dyn Producer) -> bool {
        previous
            .downcast_ref::<Picky>()
            .is_some_and(|previous| previous.version == self.version)
    }
}

#[derive(Debug, PartialEq)]
struct Theme(&'static str);

struct Themed {
    theme: &'static str,
    child: Element,
}

impl Producer for Themed {
    fn capabilities(&self) -> Capabilities {
        Capabilities::SINGLE.reuse_aware()
    }

    fn render(&self, _cx: &mut RenderContext<'_>) -> Children {
        Children::One(self.child.clone())
    }

    fn provided_context(&self) -> Option<Arc<dyn crate::ContextValue>> {
        Some(Arc::new(Theme(self.theme)))
    }
}

struct ThemeReader {
    seen: Arc<parking_lot::Mutex<Vec<&'static str>>>,
}

impl Producer for ThemeReader {
    fn capabilities(&self) -> Capabilities {
        Capabilities::SINGLE.stateful().reuse_aware()
    }

    fn render(&self, cx: &mut RenderContext<'_>) -> Children {
        if let Some(theme) = cx.context::<Theme>() {
            self.seen.lock().push(theme.0);
        }
        Children::None
    }
}

struct Greedy;

impl Producer for Greedy {
    fn capabilities(&self) -> Capabilities {
        Capabilities::SINGLE
    }

    fn render(&self, _cx: &mut RenderContext<'_>) -> Children {
        Children::Many(vec![Arc::new(Label), Arc::new(Label)])
    }
}

fn reconciler(config: ReconcilerConfig) -> Reconciler {
    Reconciler::new(config, RuntimeHandle::detached())
}

fn build(
    reconciler: &Reconciler,
    root: Element,
    previous: Option<&Generation>,
    updates: StateUpdateMap,
    trigger: BuildTrigger,
) -> BuildResult {
    match reconciler.build(root, previous, updates, trigger) {
        Ok(result) => result,
        Err(err) => panic!("build failed: {err}"),
    }
}

fn increment() -> StateMutator {
    Box::new(|state| {
        state.map(|value| Arc::new(*value.downcast::<i32>().expect("i32 state") + 1) as StateBox)
    })
}

fn updates_for(id: NodeId) -> StateUpdateMap {
    let mut updates = StateUpdateMap::default();
    updates.insert(id, vec![increment()]);
    updates
}

fn child(tree: &TreeNode, path: &[usize]) -> Arc<TreeNode> {
    let mut node = tree.children()[path[0]].clone();
    for index in &path[1..] {
        node = node.children()[*index].clone();
    }
    node
}

fn scope(node: &TreeNode) -> ScopeHandle {
    node.scope().cloned().expect("node has a scope")
}

#[test]
fn fresh_build_matches_handles_against_previous_generation() {
    let reconciler = reconciler(ReconcilerConfig::default());
    let make = || stack(vec![Counter::new(1), Counter::keyed(7, 2), Arc::new(Label)]);

    let first = build(&reconciler, make(), None, StateUpdateMap::default(), BuildTrigger::empty());
    let second = build(
        &reconciler,
        make(),
        Some(&first.generation),
        StateUpdateMap::default(),
        BuildTrigger::empty(),
    );

    let (old, new) = (&first.generation.tree, &second.generation.tree);
    assert_eq!(old.id(), new.id());
    for index in 0..2 {
        assert!(scope(&child(old, &[index])).ptr_eq(&scope(&child(new, &[index]))));
        assert_eq!(child(old, &[index]).id(), child(new, &[index]).id());
    }
    // Fast-path leaves are appended without identity matching.
    assert!(child(new, &[2]).is_fast_path());
    assert_ne!(child(old, &[2]).id(), child(new, &[2]).id());
    // Nothing is reused on a fresh build.
    assert!(second.report.reused.is_empty());
    assert!(second.removed_handles.is_empty());
}

#[test]
fn unkeyed_siblings_match_in_order() {
    let reconciler = reconciler(ReconcilerConfig::default());
    let first = build(
        &reconciler,
        stack(vec![Counter::new(10), Counter::new(20)]),
        None,
        StateUpdateMap::default(),
        BuildTrigger::empty(),
    );
    // Initial state only applies to fresh handles.
    let second = build(
        &reconciler,
        stack(vec![Counter::new(99), Counter::new(98), Counter::new(97)]),
        Some(&first.generation),
        StateUpdateMap::default(),
        BuildTrigger::empty(),
    );
    let values: Vec<i32> = (0..3)
        .map(|i| *scope(&child(&second.generation.tree, &[i])).state_as::<i32>().unwrap())
        .collect();
    assert_eq!(values, vec![10, 20, 97]);
}

#[test]
fn state_update_reevaluates_only_the_dirty_path() {
    let reconciler = reconciler(ReconcilerConfig::default());
    let make = || {
        stack(vec![
            stack(vec![Counter::new(0), Counter::new(5)]),
            Counter::new(9),
        ])
    };
    let first = build(&reconciler, make(), None, StateUpdateMap::default(), BuildTrigger::empty());
    let target = child(&first.generation.tree, &[0, 0]);

    let second = build(
        &reconciler,
        make(),
        Some(&first.generation),
        updates_for(target.id()),
        BuildTrigger::STATE_UPDATE,
    );

    let tree = &second.generation.tree;
    // Depth 2 leaf: root, inner stack and the leaf itself.
    assert_eq!(second.report.evaluated_count(), 3);
    assert!(second.report.was_evaluated(tree.id()));
    assert!(second.report.was_evaluated(target.id()));
    assert!(second.report.was_reused(child(tree, &[0, 1]).id()));
    assert!(second.report.was_reused(child(tree, &[1]).id()));
    assert!(Arc::ptr_eq(
        &child(tree, &[1]),
        &child(&first.generation.tree, &[1])
    ));
    assert_eq!(*scope(&child(tree, &[0, 0])).state_as::<i32>().unwrap(), 1);
    // Reused subtrees keep their handles registered.
    assert_eq!(second.generation.scope_root.len(), 3);
    assert_eq!(
        second.generation.scope_root.path_to_root(target.id()),
        vec![target.id(), child(tree, &[0]).id(), tree.id()]
    );
}

#[test]
fn reused_nodes_do_not_render() {
    let reconciler = reconciler(ReconcilerConfig::default());
    let renders = Arc::new(AtomicUsize::new(0));
    let make = |renders: &Arc<AtomicUsize>| {
        let inner: Element = Arc::new(Stack {
            children: vec![Counter::new(1)],
            renders: renders.clone(),
        });
        stack(vec![inner, Counter::new(2)])
    };
    let first = build(&reconciler, make(&renders), None, StateUpdateMap::default(), BuildTrigger::empty());
    let sibling = child(&first.generation.tree, &[1]);
    build(
        &reconciler,
        make(&renders),
        Some(&first.generation),
        updates_for(sibling.id()),
        BuildTrigger::STATE_UPDATE,
    );
    assert_eq!(renders.load(Ordering::SeqCst), 1);
}

#[test]
fn props_updates_reuse_only_when_enabled() {
    let make = || stack(vec![stack(vec![Counter::new(0)]), Counter::new(1)]);

    let plain = reconciler(ReconcilerConfig::default());
    let first = build(&plain, make(), None, StateUpdateMap::default(), BuildTrigger::empty());
    let second = build(
        &plain,
        make(),
        Some(&first.generation),
        StateUpdateMap::default(),
        BuildTrigger::PROPS_UPDATE,
    );
    assert!(second.report.reused.is_empty());

    let faster = reconciler(ReconcilerConfig::default().with_faster_props_updates(true));
    let third = build(
        &faster,
        make(),
        Some(&second.generation),
        StateUpdateMap::default(),
        BuildTrigger::PROPS_UPDATE,
    );
    // The root itself is reuse-aware and clean, so the whole tree is reused.
    assert_eq!(third.report.reused, vec![second.generation.tree.id()]);
    assert_eq!(third.report.evaluated_count(), 0);
}

#[test]
fn environment_update_disables_reuse() {
    let reconciler = reconciler(ReconcilerConfig::default());
    let make = || stack(vec![Counter::new(0), Counter::new(1)]);
    let first = build(&reconciler, make(), None, StateUpdateMap::default(), BuildTrigger::empty());
    let second = build(
        &reconciler,
        make(),
        Some(&first.generation),
        StateUpdateMap::default(),
        BuildTrigger::STATE_UPDATE | BuildTrigger::ENVIRONMENT_UPDATE,
    );
    assert!(second.report.reused.is_empty());
    assert_eq!(second.report.evaluated_count(), 3);
}

#[test]
fn disabling_faster_state_updates_evaluates_everything() {
    let reconciler = reconciler(ReconcilerConfig::default().with_faster_state_updates(false));
    let make = || stack(vec![Counter::new(0), Counter::new(1)]);
    let first = build(&reconciler, make(), None, StateUpdateMap::default(), BuildTrigger::empty());
    let target = child(&first.generation.tree, &[0]);
    let second = build(
        &reconciler,
        make(),
        Some(&first.generation),
        updates_for(target.id()),
        BuildTrigger::STATE_UPDATE,
    );
    assert!(second.report.reused.is_empty());
    assert_eq!(*scope(&child(&second.generation.tree, &[0])).state_as::<i32>().unwrap(), 1);
}

#[test]
fn reuse_predicate_can_veto() {
    let reconciler = reconciler(ReconcilerConfig::default());
    let make = |version| stack(vec![Arc::new(Picky { version }) as Element, Counter::new(0)]);
    let first = build(&reconciler, make(1), None, StateUpdateMap::default(), BuildTrigger::empty());
    let counter = child(&first.generation.tree, &[1]);

    let same = build(
        &reconciler,
        make(1),
        Some(&first.generation),
        updates_for(counter.id()),
        BuildTrigger::STATE_UPDATE,
    );
    assert!(same.report.was_reused(child(&same.generation.tree, &[0]).id()));

    let changed = build(
        &reconciler,
        make(2),
        Some(&same.generation),
        updates_for(counter.id()),
        BuildTrigger::STATE_UPDATE,
    );
    let picky = child(&changed.generation.tree, &[0]);
    assert!(changed.report.was_evaluated(picky.id()));
    // Evaluated, but identity is still carried over.
    assert!(scope(&picky).ptr_eq(&scope(&child(&same.generation.tree, &[0]))));
}

#[test]
fn changed_context_disables_reuse_below_provider() {
    let reconciler = reconciler(ReconcilerConfig::default());
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let make = |theme| {
        let reader = || -> Element { Arc::new(ThemeReader { seen: seen.clone() }) };
        let themed: Element = Arc::new(Themed {
            theme,
            child: stack(vec![reader(), reader()]),
        });
        stack(vec![themed, Counter::new(0)])
    };
    let first = build(&reconciler, make("light"), None, StateUpdateMap::default(), BuildTrigger::empty());
    assert_eq!(*seen.lock(), vec!["light", "light"]);
    let dirty_reader = child(&first.generation.tree, &[0, 0, 0]);

    // Same value: only the dirty reader re-renders.
    let second = build(
        &reconciler,
        make("light"),
        Some(&first.generation),
        updates_for(dirty_reader.id()),
        BuildTrigger::STATE_UPDATE,
    );
    assert!(second.report.was_reused(child(&second.generation.tree, &[0, 0, 1]).id()));
    assert_eq!(seen.lock().len(), 3);

    // New value: the clean reader under the provider re-renders too.
    let third = build(
        &reconciler,
        make("dark"),
        Some(&second.generation),
        updates_for(dirty_reader.id()),
        BuildTrigger::STATE_UPDATE,
    );
    let clean_reader = child(&third.generation.tree, &[0, 0, 1]);
    assert!(third.report.was_evaluated(clean_reader.id()));
    assert_eq!(*seen.lock(), vec!["light", "light", "light", "dark", "dark"]);
}

#[test]
fn vanished_and_scope_dropping_nodes_are_reported_removed() {
    let reconciler = reconciler(ReconcilerConfig::default());
    let first = build(
        &reconciler,
        stack(vec![Counter::new(0), Counter::keyed(3, 0)]),
        None,
        StateUpdateMap::default(),
        BuildTrigger::empty(),
    );
    let keyed = scope(&child(&first.generation.tree, &[1]));
    let second = build(
        &reconciler,
        stack(vec![Counter::new(0)]),
        Some(&first.generation),
        StateUpdateMap::default(),
        BuildTrigger::empty(),
    );
    assert_eq!(second.removed_handles.len(), 1);
    assert!(second.removed_handles[0].ptr_eq(&keyed));
    // Removal is reported, teardown is the committer's job.
    assert!(!keyed.is_torn_down());
}

#[test]
fn duplicate_explicit_keys_are_ambiguous() {
    let reconciler = reconciler(ReconcilerConfig::default());
    let result = reconciler.build(
        stack(vec![Counter::keyed(1, 0), Counter::keyed(1, 0)]),
        None,
        StateUpdateMap::default(),
        BuildTrigger::empty(),
    );
    assert!(matches!(
        result,
        Err(BuildError::AmbiguousIdentity { key: 1, .. })
    ));
}

#[test]
fn strict_mode_requires_keys_for_repeated_classes() {
    let strict = reconciler(ReconcilerConfig::default().with_strict_sibling_identity(true));
    let unkeyed = strict.build(
        stack(vec![Counter::new(0), Counter::new(0)]),
        None,
        StateUpdateMap::default(),
        BuildTrigger::empty(),
    );
    assert!(matches!(
        unkeyed,
        Err(BuildError::StrictIdentityViolation { count: 2, .. })
    ));

    let keyed = strict.build(
        stack(vec![
            Counter::keyed(1, 0),
            Counter::keyed(2, 0),
            Arc::new(Label),
            Arc::new(Label),
        ]),
        None,
        StateUpdateMap::default(),
        BuildTrigger::empty(),
    );
    assert!(keyed.is_ok());
}

#[test]
fn single_child_producer_returning_many_is_a_protocol_violation() {
    let reconciler = reconciler(ReconcilerConfig::default());
    let result = reconciler.build(
        stack(vec![Arc::new(Greedy)]),
        None,
        StateUpdateMap::default(),
        BuildTrigger::empty(),
    );
    match result {
        Err(BuildError::ProtocolViolation {
            expected, found, ..
        }) => {
            assert_eq!(expected, Arity::Single);
            assert_eq!(found, 2);
        }
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("expected a protocol violation"),
    }
}

#[test]
fn updates_for_unknown_nodes_are_dropped() {
    let reconciler = reconciler(ReconcilerConfig::default());
    let first = build(
        &reconciler,
        stack(vec![Counter::new(0)]),
        None,
        StateUpdateMap::default(),
        BuildTrigger::empty(),
    );
    let second = build(
        &reconciler,
        stack(vec![Counter::new(0)]),
        Some(&first.generation),
        updates_for(usize::MAX),
        BuildTrigger::STATE_UPDATE,
    );
    assert_eq!(second.report.evaluated_count(), 0);
    assert_eq!(second.report.reused, vec![first.generation.tree.id()]);
}
