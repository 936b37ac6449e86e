use std::any::Any;
use std::collections::BTreeMap;

use kite_core::{AttributeValue, NativeView, ViewClass};
use kite_ui_layout::Rect;

/// A view with no backing platform object; keeps whatever it is told.
#[derive(Debug, Default)]
pub struct HeadlessView {
    pub frame: Rect,
    pub hidden: bool,
    pub attributes: BTreeMap<&'static str, AttributeValue>,
    pub subviews: usize,
}

impl NativeView for HeadlessView {
    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn apply_attribute(&mut self, name: &'static str, value: &AttributeValue) {
        self.attributes.insert(name, value.clone());
    }

    fn reset_attribute(&mut self, name: &'static str) {
        self.attributes.remove(name);
    }

    fn add_subview(&mut self, _child: &mut dyn NativeView) {
        self.subviews += 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub fn headless_view_class(identifier: &'static str) -> ViewClass {
    ViewClass::new(identifier, || Box::new(HeadlessView::default()) as Box<dyn NativeView>)
}
