//! Recyclable live views.
//!
//! Every container view owns a [`ViewPoolMap`]: one ordered pool per
//! [`PoolKey`] plus a cursor marking the next unvended entry. Views are
//! created lazily, hidden rather than destroyed when nobody claims them, and
//! only die with their container.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use kite_core::{
    NativeView, PersistentAttributeShape, ProducerClass, ViewClass, ViewClassKey,
    ViewConfiguration,
};

/// Identity of a live view, stable for as long as the view exists.
pub type ViewId = usize;

/// Shared handle to a live view. Not `Send`: views stay on the presentation
/// thread.
#[derive(Clone)]
pub struct ViewHandle(Rc<RefCell<Box<dyn NativeView>>>);

impl ViewHandle {
    pub fn new(view: Box<dyn NativeView>) -> Self {
        Self(Rc::new(RefCell::new(view)))
    }

    pub fn id(&self) -> ViewId {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &ViewHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn with<R>(&self, f: impl FnOnce(&dyn NativeView) -> R) -> R {
        f(&**self.0.borrow())
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut dyn NativeView) -> R) -> R {
        f(&mut **self.0.borrow_mut())
    }

    /// Runs `f` against the concrete view type, if it is a `T`.
    pub fn downcast_with<T: NativeView, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        self.with(|view| view.as_any().downcast_ref::<T>().map(f))
    }

    fn add_subview(&self, child: &ViewHandle) {
        let mut child = child.0.borrow_mut();
        self.0.borrow_mut().add_subview(&mut **child);
    }
}

impl fmt::Debug for ViewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewHandle({:#x})", self.id())
    }
}

/// Views are only vended for the exact key they were created for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub producer: ProducerClass,
    pub view: ViewClassKey,
    pub shape: PersistentAttributeShape,
}

impl PoolKey {
    pub fn new(producer: ProducerClass, config: &ViewConfiguration) -> Self {
        Self {
            producer,
            view: config.class().key(),
            shape: config.shape(),
        }
    }
}

struct PoolEntry {
    view: ViewHandle,
    hidden: bool,
}

/// Ordered views for one key and the next-unvended cursor.
#[derive(Default)]
pub struct ViewPool {
    entries: Vec<PoolEntry>,
    cursor: usize,
}

impl ViewPool {
    /// Vends the next view, creating one under `container` if the pool is
    /// exhausted.
    pub fn view_for(&mut self, class: &ViewClass, container: &ViewHandle) -> ViewHandle {
        if self.cursor == self.entries.len() {
            let view = ViewHandle::new(class.create());
            container.add_subview(&view);
            log::trace!("created {} view {view:?}", class.identifier());
            self.entries.push(PoolEntry {
                view,
                hidden: false,
            });
        }
        let entry = &mut self.entries[self.cursor];
        self.cursor += 1;
        if entry.hidden {
            entry.view.with_mut(|view| {
                view.will_leave_reuse_pool();
                view.set_hidden(false);
            });
            entry.hidden = false;
        }
        entry.view.clone()
    }

    /// Hides views past the cursor and rewinds it.
    pub fn reset(&mut self) {
        for entry in &mut self.entries[self.cursor..] {
            hide(entry);
        }
        self.cursor = 0;
    }

    pub fn hide_all(&mut self) {
        self.cursor = 0;
        self.reset();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn vended(&self) -> usize {
        self.cursor
    }

    pub fn views(&self) -> impl Iterator<Item = &ViewHandle> {
        self.entries.iter().map(|entry| &entry.view)
    }
}

fn hide(entry: &mut PoolEntry) {
    if entry.hidden {
        return;
    }
    entry.view.with_mut(|view| {
        view.set_hidden(true);
        view.did_enter_reuse_pool();
    });
    entry.hidden = true;
}

/// All pools belonging to one container view.
#[derive(Default)]
pub struct ViewPoolMap {
    pools: IndexMap<PoolKey, ViewPool>,
}

impl ViewPoolMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view_for(
        &mut self,
        key: PoolKey,
        class: &ViewClass,
        container: &ViewHandle,
    ) -> ViewHandle {
        self.pools.entry(key).or_default().view_for(class, container)
    }

    pub fn reset(&mut self) {
        for pool in self.pools.values_mut() {
            pool.reset();
        }
    }

    pub fn hide_all(&mut self) {
        for pool in self.pools.values_mut() {
            pool.hide_all();
        }
    }

    pub fn pool(&self, key: &PoolKey) -> Option<&ViewPool> {
        self.pools.get(key)
    }

    /// Number of live views across every pool.
    pub fn view_count(&self) -> usize {
        self.pools.values().map(ViewPool::len).sum()
    }
}

#[cfg(test)]
#[path = "tests/pool_tests.rs"]
mod tests;
