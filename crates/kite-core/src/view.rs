//! View configuration declared by producers.
//!
//! Producers only describe views; creating, recycling and mutating them is
//! the mount projector's job on the presentation thread.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use kite_ui_graphics::{EdgeInsets, Rect};

/// A live platform view. Lives on the presentation thread only.
pub trait NativeView: Any {
    fn set_frame(&mut self, frame: Rect);

    fn set_hidden(&mut self, hidden: bool);

    fn apply_attribute(&mut self, name: &'static str, value: &AttributeValue);

    /// Restores the attribute to the view's default.
    fn reset_attribute(&mut self, _name: &'static str) {}

    /// Called once, when a pool creates `child` inside this view.
    fn add_subview(&mut self, _child: &mut dyn NativeView) {}

    fn did_enter_reuse_pool(&mut self) {}

    fn will_leave_reuse_pool(&mut self) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

type ViewFactory = dyn Fn() -> Box<dyn NativeView> + Send + Sync;

/// Identity of a view type plus how to construct one.
///
/// Two classes are equal when they share an identifier and their factories
/// are the same function type, so a class rebuilt at the same call site on
/// every render still matches its earlier instances.
#[derive(Clone)]
pub struct ViewClass {
    key: ViewClassKey,
    factory: Arc<ViewFactory>,
}

/// Exact identity of a [`ViewClass`], usable as a map key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewClassKey {
    pub identifier: &'static str,
    factory: TypeId,
}

impl ViewClass {
    pub fn new<F>(identifier: &'static str, factory: F) -> Self
    where
        F: Fn() -> Box<dyn NativeView> + Send + Sync + 'static,
    {
        Self {
            key: ViewClassKey {
                identifier,
                factory: TypeId::of::<F>(),
            },
            factory: Arc::new(factory),
        }
    }

    pub fn identifier(&self) -> &'static str {
        self.key.identifier
    }

    pub fn key(&self) -> ViewClassKey {
        self.key
    }

    pub fn create(&self) -> Box<dyn NativeView> {
        (self.factory)()
    }
}

impl PartialEq for ViewClass {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ViewClass {}

impl fmt::Debug for ViewClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewClass({})", self.key.identifier)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f32),
    Text(Arc<str>),
    Color(u32),
    Insets(EdgeInsets),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<f32> for AttributeValue {
    fn from(value: f32) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(Arc::from(value))
    }
}

impl From<EdgeInsets> for AttributeValue {
    fn from(value: EdgeInsets) -> Self {
        AttributeValue::Insets(value)
    }
}

/// A named view attribute.
///
/// Resettable attributes are restored when a view changes hands. Persistent
/// ones are not, so they become part of the pool key: views that differ in
/// which persistent attributes were applied never share a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewAttribute {
    pub name: &'static str,
    pub resettable: bool,
}

impl ViewAttribute {
    pub const fn resettable(name: &'static str) -> Self {
        Self {
            name,
            resettable: true,
        }
    }

    pub const fn persistent(name: &'static str) -> Self {
        Self {
            name,
            resettable: false,
        }
    }
}

/// Sorted names of a configuration's persistent attributes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PersistentAttributeShape(Arc<[&'static str]>);

impl PersistentAttributeShape {
    pub fn of(attributes: &[(ViewAttribute, AttributeValue)]) -> Self {
        let mut names: Vec<&'static str> = attributes
            .iter()
            .filter(|(attribute, _)| !attribute.resettable)
            .map(|(attribute, _)| attribute.name)
            .collect();
        names.sort_unstable();
        Self(Arc::from(names))
    }

    pub fn names(&self) -> &[&'static str] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for PersistentAttributeShape {
    fn default() -> Self {
        Self(Arc::from(Vec::new()))
    }
}

/// Which view a producer wants and the attributes to apply to it.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewConfiguration {
    class: ViewClass,
    attributes: Vec<(ViewAttribute, AttributeValue)>,
    shape: PersistentAttributeShape,
}

impl ViewConfiguration {
    pub fn new(class: ViewClass) -> Self {
        Self {
            class,
            attributes: Vec::new(),
            shape: PersistentAttributeShape::default(),
        }
    }

    /// Sets `attribute`, replacing any earlier value with the same name.
    pub fn with(mut self, attribute: ViewAttribute, value: impl Into<AttributeValue>) -> Self {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(existing, _)| existing.name == attribute.name)
        {
            Some(slot) => *slot = (attribute, value),
            None => self.attributes.push((attribute, value)),
        }
        self.attributes.sort_by(|(a, _), (b, _)| a.name.cmp(b.name));
        self.shape = PersistentAttributeShape::of(&self.attributes);
        self
    }

    pub fn class(&self) -> &ViewClass {
        &self.class
    }

    /// Attributes sorted by name.
    pub fn attributes(&self) -> &[(ViewAttribute, AttributeValue)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .find(|(attribute, _)| attribute.name == name)
            .map(|(_, value)| value)
    }

    pub fn shape(&self) -> PersistentAttributeShape {
        self.shape.clone()
    }
}
