//! `[[type:argument]]` expansion.
//!
//! A string that is exactly one shortcode is replaced by the raw resolved value, so
//! `"[[dp:feed.total]]"` stays a number. Shortcodes embedded in longer text are rendered as text.
//! Unknown shortcode types and unresolved arguments render as the empty string.

use ignite_types::{Attributes, symbols, value_to_text};
use serde_json::Value;
use tracing::debug;

use crate::catalog::ComponentRegistry;
use crate::scope::Scope;

/// Expands shortcodes in every attribute value.
pub fn interpolate_attributes(attributes: &Attributes, registry: &ComponentRegistry, scope: &Scope<'_>) -> Attributes {
    attributes
        .iter()
        .map(|(key, value)| (key.clone(), interpolate_value(value, registry, scope)))
        .collect()
}

/// Expands shortcodes inside strings, arrays and objects.
pub fn interpolate_value(value: &Value, registry: &ComponentRegistry, scope: &Scope<'_>) -> Value {
    match value {
        Value::String(text) => interpolate_string(text, registry, scope),
        Value::Array(items) => Value::Array(items.iter().map(|item| interpolate_value(item, registry, scope)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), interpolate_value(item, registry, scope)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn interpolate_string(input: &str, registry: &ComponentRegistry, scope: &Scope<'_>) -> Value {
    let (open, close) = symbols::SHORTCODE_BRACKETS;
    if !input.contains(open) {
        return Value::String(input.to_string());
    }

    let trimmed = input.trim();
    if let Some(inner) = trimmed.strip_prefix(open).and_then(|rest| rest.strip_suffix(close))
        && !inner.contains(open)
        && !inner.contains(close)
    {
        return evaluate_shortcode(inner, registry, scope).unwrap_or_else(|| Value::String(symbols::EMPTY_STRING.to_string()));
    }

    let mut output = String::new();
    let mut remaining = input;
    while let Some(start) = remaining.find(open) {
        let (before, after) = remaining.split_at(start);
        output.push_str(before);
        let Some(end) = after.find(close) else {
            // unterminated: keep the rest verbatim
            output.push_str(after);
            return Value::String(output);
        };
        let inner = &after[open.len()..end];
        if let Some(text) = evaluate_shortcode(inner, registry, scope).as_ref().and_then(value_to_text) {
            output.push_str(&text);
        }
        remaining = &after[end + close.len()..];
    }
    output.push_str(remaining);
    Value::String(output)
}

fn evaluate_shortcode(inner: &str, registry: &ComponentRegistry, scope: &Scope<'_>) -> Option<Value> {
    let (type_name, argument) = symbols::split_pair(inner);
    match registry.resolve_shortcode(type_name) {
        Ok(factory) => factory().evaluate(argument, scope),
        Err(error) => {
            debug!(shortcode = %inner, error = %error, "shortcode left unresolved");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use ignite_registry::RegistryConfig;
    use ignite_types::{Event, EventName};
    use serde_json::json;

    use super::*;
    use crate::tree::{Entity, EntityRole, Handler, SessionTree};

    fn fixture() -> (ComponentRegistry, SessionTree) {
        let registry = ComponentRegistry::with_builtins(&RegistryConfig::default()).unwrap();
        let app: Attributes = serde_json::from_value(json!({ "name": "Shop" })).unwrap();
        let mut tree = SessionTree::new(app, Attributes::new());
        let mut feed = Entity::new("feed", EntityRole::DataProvider, Handler::Dummy);
        feed.payload = Some(json!({ "total": 3 }));
        tree.insert(feed);
        let mut field = Entity::new("email", EntityRole::Control, Handler::Dummy);
        field.attributes.insert("value".into(), json!("ada@example.com"));
        tree.insert(field);
        (registry, tree)
    }

    #[test]
    fn whole_value_shortcodes_keep_their_type() {
        let (registry, tree) = fixture();
        let scope = Scope::new(&tree, None);
        assert_eq!(interpolate_value(&json!("[[dp:feed.total]]"), &registry, &scope), json!(3));
        assert_eq!(interpolate_value(&json!(" [[app:name]] "), &registry, &scope), json!("Shop"));
    }

    #[test]
    fn embedded_shortcodes_render_as_text() {
        let (registry, tree) = fixture();
        let event = Event::new("button", EventName::parse("touch").unwrap());
        let scope = Scope::new(&tree, Some(&event));
        let attributes: Attributes = serde_json::from_value(json!({
            "title": "[[app:name]] has [[dp:feed.total]] items",
            "nested": { "who": ["[[attr:email.value]] via [[event:name]]"] },
            "unknown": "x[[weather:today]]y",
            "open": "[[app:name"
        }))
        .unwrap();

        let expanded = interpolate_attributes(&attributes, &registry, &scope);
        assert_eq!(expanded["title"], json!("Shop has 3 items"));
        assert_eq!(expanded["nested"], json!({ "who": ["ada@example.com via touch"] }));
        assert_eq!(expanded["unknown"], json!("xy"));
        assert_eq!(expanded["open"], json!("[[app:name"));
    }
}
