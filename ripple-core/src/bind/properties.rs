//! Applying nested property objects to a target.

use serde_json::Value;

use super::Target;

/// Write every leaf of `props` to `target`.
///
/// Nested objects address nested property groups: `{ "style": { "color":
/// "red" } }` sets the path `["style", "color"]`. Leaves are routed as
/// follows:
///
/// - `--name` under a `style` group goes through
///   [`Target::set_style_property`];
/// - `className` on an SVG target becomes the `class` attribute;
/// - top-level `data-*` keys become attributes;
/// - everything else goes through [`Target::set_property`].
///
/// Arrays and `null` are leaves. A `props` value that is not an object
/// writes nothing.
pub fn apply_properties<T: Target + ?Sized>(target: &T, props: &Value) {
    apply_at(target, props, &mut Vec::new());
}

fn apply_at<'a, T: Target + ?Sized>(target: &T, props: &'a Value, namespace: &mut Vec<&'a str>) {
    let Value::Object(entries) = props else {
        return;
    };

    for (name, value) in entries {
        if value.is_object() {
            namespace.push(name);
            apply_at(target, value, namespace);
            namespace.pop();
            continue;
        }

        if namespace.last() == Some(&"style") && name.starts_with("--") {
            target.set_style_property(namespace, name, value);
        } else if name == "className" && target.is_svg() {
            target.set_attribute("class", &attribute_text(value));
        } else if namespace.is_empty() && name.starts_with("data-") {
            target.set_attribute(name, &attribute_text(value));
        } else {
            namespace.push(name);
            target.set_property(namespace, value);
            namespace.pop();
        }
    }
}

fn attribute_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::tests::RecordingTarget;
    use serde_json::json;

    #[test]
    fn plain_and_nested_properties() {
        let target = RecordingTarget::default();
        apply_properties(&target, &json!({ "hidden": true, "style": { "color": "red" } }));

        assert_eq!(target.calls(), vec!["prop hidden = true", r#"prop style.color = "red""#]);
    }

    #[test]
    fn custom_properties_use_the_style_setter() {
        let target = RecordingTarget::default();
        apply_properties(&target, &json!({ "style": { "--accent": "blue", "width": "1px" } }));

        assert_eq!(
            target.calls(),
            vec![r#"style-prop style --accent = "blue""#, r#"prop style.width = "1px""#]
        );
    }

    #[test]
    fn data_keys_become_attributes_at_top_level_only() {
        let target = RecordingTarget::default();
        apply_properties(&target, &json!({ "data-id": 7, "dataset": { "data-x": "y" } }));

        assert_eq!(target.calls(), vec!["attr data-id = 7", r#"prop dataset.data-x = "y""#]);
    }

    #[test]
    fn svg_class_name_is_an_attribute() {
        let svg = RecordingTarget::svg();
        apply_properties(&svg, &json!({ "className": "icon" }));
        assert_eq!(svg.calls(), vec!["attr class = icon"]);

        let html = RecordingTarget::default();
        apply_properties(&html, &json!({ "className": "icon" }));
        assert_eq!(html.calls(), vec![r#"prop className = "icon""#]);
    }

    #[test]
    fn non_objects_write_nothing() {
        let target = RecordingTarget::default();
        apply_properties(&target, &json!("text"));
        apply_properties(&target, &json!([1, 2]));

        assert!(target.calls().is_empty());
    }
}
