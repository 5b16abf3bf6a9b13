//! Read-only view over a session used by predicates and shortcodes.
//!
//! Paths are dotted and rooted at one of:
//! - `app.<key>` and `session.<key>`: the document-level value stores
//! - `event.name`, `event.source`, `event.payload.<path>`: the event being delivered
//! - `nodes.<id>.<attribute path>`: attributes of any addressable entity
//! - `providers.<id>.<path>`: the last payload loaded by a data provider
//!
//! Array elements are addressed by numeric segments (`items.0.title`).

use ignite_types::{Attributes, Event, symbols};
use serde_json::Value;

use crate::tree::SessionTree;

pub const NODES_ROOT: &str = "nodes";
pub const PROVIDERS_ROOT: &str = "providers";
pub const EVENT_ROOT: &str = "event";

/// Roots accepted as the first path segment.
pub const ROOTS: [&str; 5] = [symbols::APP, symbols::SESSION, EVENT_ROOT, NODES_ROOT, PROVIDERS_ROOT];

#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    tree: &'a SessionTree,
    event: Option<&'a Event>,
}

impl<'a> Scope<'a> {
    pub fn new(tree: &'a SessionTree, event: Option<&'a Event>) -> Self {
        Self { tree, event }
    }

    pub fn tree(&self) -> &'a SessionTree {
        self.tree
    }

    pub fn event(&self) -> Option<&'a Event> {
        self.event
    }

    /// Resolves a dotted path. Unknown roots and missing values yield `None`.
    pub fn lookup(&self, path: &str) -> Option<Value> {
        let segments: Vec<&str> = path.trim().split(symbols::PERIOD_SEPARATOR).map(str::trim).collect();
        let (root, rest) = segments.split_first()?;
        match *root {
            symbols::APP => lookup_attributes(self.tree.app(), rest),
            symbols::SESSION => lookup_attributes(self.tree.session(), rest),
            EVENT_ROOT => self.lookup_event(rest),
            NODES_ROOT => {
                let (id, rest) = rest.split_first()?;
                let entity = self.tree.by_id(id)?;
                lookup_attributes(&entity.attributes, rest)
            }
            PROVIDERS_ROOT => {
                let (id, rest) = rest.split_first()?;
                let payload = self.tree.by_id(id)?.payload.as_ref()?;
                value_at_path(payload, rest).cloned()
            }
            _ => None,
        }
    }

    fn lookup_event(&self, segments: &[&str]) -> Option<Value> {
        let event = self.event?;
        let (field, rest) = segments.split_first()?;
        match *field {
            "name" if rest.is_empty() => Some(Value::String(event.name.to_string())),
            "source" if rest.is_empty() => Some(Value::String(event.source.clone())),
            "payload" => value_at_path(event.payload.as_ref()?, rest).cloned(),
            _ => None,
        }
    }
}

/// Resolves `segments` inside an attribute map. An empty path yields the whole map as an object.
pub fn lookup_attributes(attributes: &Attributes, segments: &[&str]) -> Option<Value> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(Value::Object(attributes.iter().map(|(key, value)| (key.clone(), value.clone())).collect()));
    };
    value_at_path(attributes.get(*first)?, rest).cloned()
}

/// Walks objects by key and arrays by numeric index.
pub fn value_at_path<'v>(value: &'v Value, segments: &[&str]) -> Option<&'v Value> {
    let mut current = value;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use ignite_types::EventName;
    use serde_json::json;

    use super::*;
    use crate::tree::{Entity, EntityRole, Handler};

    fn tree() -> SessionTree {
        let app: Attributes = serde_json::from_value(json!({ "theme": { "accent": "orange" } })).unwrap();
        let session: Attributes = serde_json::from_value(json!({ "user": "ada" })).unwrap();
        let mut tree = SessionTree::new(app, session);

        let mut title = Entity::new("title", EntityRole::Control, Handler::Dummy);
        title.attributes.insert("text".into(), json!("Hello"));
        tree.insert(title);

        let mut feed = Entity::new("feed", EntityRole::DataProvider, Handler::Dummy);
        feed.payload = Some(json!({ "items": [{ "name": "first" }, { "name": "second" }] }));
        tree.insert(feed);
        tree
    }

    #[test]
    fn resolves_every_root() {
        let tree = tree();
        let event = Event::new("button", EventName::parse("touch").unwrap()).with_payload(json!({ "x": 4 }));
        let scope = Scope::new(&tree, Some(&event));

        assert_eq!(scope.lookup("app.theme.accent"), Some(json!("orange")));
        assert_eq!(scope.lookup("session.user"), Some(json!("ada")));
        assert_eq!(scope.lookup("nodes.title.text"), Some(json!("Hello")));
        assert_eq!(scope.lookup("providers.feed.items.1.name"), Some(json!("second")));
        assert_eq!(scope.lookup("event.name"), Some(json!("touch")));
        assert_eq!(scope.lookup("event.payload.x"), Some(json!(4)));
    }

    #[test]
    fn missing_values_resolve_to_none() {
        let tree = tree();
        let scope = Scope::new(&tree, None);

        assert_eq!(scope.lookup("event.name"), None);
        assert_eq!(scope.lookup("nodes.missing.text"), None);
        assert_eq!(scope.lookup("providers.feed.items.9"), None);
        assert_eq!(scope.lookup("providers.title"), None);
        assert_eq!(scope.lookup("env.HOME"), None);
    }
}
