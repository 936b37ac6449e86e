//! Class-keyed context overlay pushed around a subtree's evaluation.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// A value a producer can make visible to its descendants.
pub trait ContextValue: Any + Send + Sync + fmt::Debug {
    fn as_value_any(&self) -> &dyn Any;

    /// Whether `other` holds an equal value of the same type.
    fn same_value(&self, other: &dyn ContextValue) -> bool;
}

impl<T> ContextValue for T
where
    T: Any + Send + Sync + fmt::Debug + PartialEq,
{
    fn as_value_any(&self) -> &dyn Any {
        self
    }

    fn same_value(&self, other: &dyn ContextValue) -> bool {
        other
            .as_value_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }
}

/// Compares two optional context values by type and contents.
pub fn context_changed(
    previous: Option<&Arc<dyn ContextValue>>,
    current: Option<&Arc<dyn ContextValue>>,
) -> bool {
    match (previous, current) {
        (None, None) => false,
        (Some(previous), Some(current)) => !current.same_value(previous.as_ref()),
        _ => true,
    }
}

struct Frame {
    type_id: TypeId,
    value: Arc<dyn ContextValue>,
    parent: Option<Arc<Frame>>,
}

/// Immutable linked overlay; pushing returns a new overlay and leaves the
/// original untouched, so siblings never observe each other's values.
#[derive(Clone, Default)]
pub struct ContextOverlay {
    head: Option<Arc<Frame>>,
}

impl ContextOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, value: Arc<dyn ContextValue>) -> ContextOverlay {
        let type_id = value.as_value_any().type_id();
        ContextOverlay {
            head: Some(Arc::new(Frame {
                type_id,
                value,
                parent: self.head.clone(),
            })),
        }
    }

    pub fn get<T: ContextValue>(&self) -> Option<&T> {
        let wanted = TypeId::of::<T>();
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            if current.type_id == wanted {
                return current.value.as_value_any().downcast_ref::<T>();
            }
            frame = current.parent.as_deref();
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            depth += 1;
            frame = current.parent.as_deref();
        }
        depth
    }
}

impl fmt::Debug for ContextOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let mut frame = self.head.as_deref();
        while let Some(current) = frame {
            list.entry(&current.value);
            frame = current.parent.as_deref();
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Theme(&'static str);

    #[derive(Debug, PartialEq)]
    struct Locale(&'static str);

    #[test]
    fn nearest_value_wins_and_push_is_persistent() {
        let root = ContextOverlay::new();
        let outer = root.push(Arc::new(Theme("light")));
        let inner = outer.push(Arc::new(Locale("en"))).push(Arc::new(Theme("dark")));

        assert_eq!(inner.get::<Theme>(), Some(&Theme("dark")));
        assert_eq!(inner.get::<Locale>(), Some(&Locale("en")));
        assert_eq!(outer.get::<Theme>(), Some(&Theme("light")));
        assert!(outer.get::<Locale>().is_none());
        assert!(root.is_empty());
        assert_eq!(inner.depth(), 3);
    }

    #[test]
    fn change_detection_compares_values() {
        let light: Arc<dyn ContextValue> = Arc::new(Theme("light"));
        let light_again: Arc<dyn ContextValue> = Arc::new(Theme("light"));
        let locale: Arc<dyn ContextValue> = Arc::new(Locale("light"));
        assert!(!context_changed(Some(&light), Some(&light_again)));
        assert!(context_changed(Some(&light), Some(&locale)));
        assert!(context_changed(None, Some(&light)));
        assert!(!context_changed(None, None));
    }
}
