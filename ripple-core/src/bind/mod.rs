//! Binding Adapters
//!
//! Helpers that create an [`Effect`] whose only job is to push a derived
//! value into an external sink: a [`Target`] for properties, attributes and
//! classes, or a [`ChildList`] for ordered children.
//!
//! Each helper runs its function once immediately and again whenever a
//! field it read is written. The returned effect can be disposed to stop
//! the binding.
//!
//! # Example
//!
//! ```rust,ignore
//! let count = create_ref(0);
//!
//! let c = count.clone();
//! let label = bind_text_content(node.clone(), move |_| {
//!     format!("clicked {} times", c.get(VALUE_FIELD).unwrap_or_default())
//! });
//!
//! count.set(VALUE_FIELD, 1); // node's text is now "clicked 1 times"
//! label.dispose();
//! ```

mod properties;

use std::sync::Arc;

use serde_json::{json, Value};

pub use properties::apply_properties;

use crate::diff::{reconcile, ChildList};
use crate::reactive::Effect;

/// A render sink that accepts property, attribute and class writes.
///
/// Methods take `&self`; targets are usually handles to shared nodes.
pub trait Target {
    /// Assign `value` at a property path such as `["style", "color"]`.
    fn set_property(&self, path: &[&str], value: &Value);

    /// Set a custom (`--name`) property on the style group at `path`.
    fn set_style_property(&self, path: &[&str], name: &str, value: &Value);

    fn set_attribute(&self, name: &str, value: &str);

    /// Add or remove a class name.
    fn set_class(&self, name: &str, present: bool);

    fn is_svg(&self) -> bool {
        false
    }
}

impl<T: Target + ?Sized> Target for Arc<T> {
    fn set_property(&self, path: &[&str], value: &Value) {
        (**self).set_property(path, value)
    }

    fn set_style_property(&self, path: &[&str], name: &str, value: &Value) {
        (**self).set_style_property(path, name, value)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        (**self).set_attribute(name, value)
    }

    fn set_class(&self, name: &str, present: bool) {
        (**self).set_class(name, present)
    }

    fn is_svg(&self) -> bool {
        (**self).is_svg()
    }
}

/// Keep the `textContent` property of `target` equal to `f`.
pub fn bind_text_content<T, F>(target: T, f: F) -> Effect
where
    T: Target + Send + Sync + 'static,
    F: Fn(&T) -> String + Send + Sync + 'static,
{
    Effect::new(move || {
        let text = f(&target);
        target.set_property(&["textContent"], &Value::String(text));
    })
}

/// Add `class_name` to `target` while `f` is true, remove it otherwise.
pub fn bind_class<T, F>(target: T, class_name: impl Into<String>, f: F) -> Effect
where
    T: Target + Send + Sync + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    let class_name = class_name.into();
    Effect::new(move || {
        let present = f(&target);
        target.set_class(&class_name, present);
    })
}

/// Keep the `value` property of an input-like `target` equal to `f`.
pub fn bind_input_value<T, F>(target: T, f: F) -> Effect
where
    T: Target + Send + Sync + 'static,
    F: Fn(&T) -> String + Send + Sync + 'static,
{
    Effect::new(move || {
        let value = f(&target);
        target.set_property(&["value"], &Value::String(value));
    })
}

/// Apply the property object returned by `f` with [`apply_properties`].
///
/// Properties that `f` stops returning keep their last value.
pub fn bind_dom<T, F>(target: T, f: F) -> Effect
where
    T: Target + Send + Sync + 'static,
    F: Fn(&T) -> Value + Send + Sync + 'static,
{
    Effect::new(move || {
        let props = f(&target);
        apply_properties(&target, &props);
    })
}

/// Like [`bind_dom`], with `f` returning the contents of the `style` group.
pub fn bind_style<T, F>(target: T, f: F) -> Effect
where
    T: Target + Send + Sync + 'static,
    F: Fn(&T) -> Value + Send + Sync + 'static,
{
    bind_dom(target, move |target| json!({ "style": f(target) }))
}

/// Keep the children of `list` equal to the nodes returned by `f`.
///
/// Each run reconciles the live children with the new sequence, so nodes
/// that are kept (or matched by key) are reused rather than recreated.
pub fn bind_children<L, F>(list: L, f: F) -> Effect
where
    L: ChildList + Send + Sync + 'static,
    F: Fn(&L) -> Vec<L::Node> + Send + Sync + 'static,
{
    Effect::new(move || {
        let desired = f(&list);
        reconcile(&list, &desired);
    })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
