//! Depth-first construction of a [`SessionTree`] from a [`Document`].
//!
//! Each entity is built in three steps: claim an id, resolve its `type` through the registry and
//! construct the handler, then recurse into `dataProviders`, bindings (`on` map first, then the
//! `actions` list) and `controls`, each in declaration order. Problems are collected into the
//! [`BuildReport`]; a failing entity is skipped and its parent carries on with its siblings.

use std::{collections::HashMap, time::Duration};

use ignite_types::{Attributes, Document, EventName, symbols};
use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value};
use tracing::debug;

use crate::catalog::ComponentRegistry;
use crate::components::Blueprint;
use crate::config::DispatchConfig;
use crate::error::BuildError;
use crate::predicate::{PredicateEvaluator, evaluate_gate, gate_text};
use crate::scope::Scope;
use crate::tree::{Binding, Entity, EntityIndex, EntityRole, Handler, SessionTree, Timing};

/// Keys a data provider declaration may carry next to `attributes`.
const PROVIDER_KEYS: [&str; 4] = [symbols::DP_PARAMETERS, symbols::DP_HEADERS, symbols::DP_ATTACHMENTS, symbols::DP_ENTITY];
/// Top-level shorthands copied into any entity's attributes.
const SHORTHAND_KEYS: [&str; 2] = [symbols::VALUE, symbols::ORIENTATION];

/// Result of a build: the tree plus every problem met along the way.
#[derive(Debug)]
pub struct BuildReport {
    pub tree: SessionTree,
    pub errors: Vec<BuildError>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

pub struct TreeBuilder<'a> {
    registry: &'a ComponentRegistry,
    evaluator: &'a dyn PredicateEvaluator,
    dispatch: &'a DispatchConfig,
}

struct BuildState {
    tree: SessionTree,
    errors: Vec<BuildError>,
    styles: IndexMap<String, Attributes>,
    ordinals: HashMap<EntityRole, usize>,
}

impl BuildState {
    fn malformed(&mut self, path: &str, reason: impl Into<String>) {
        self.errors.push(BuildError::MalformedNode {
            path: path.to_string(),
            reason: reason.into(),
        });
    }
}

impl<'a> TreeBuilder<'a> {
    pub fn new(registry: &'a ComponentRegistry, evaluator: &'a dyn PredicateEvaluator, dispatch: &'a DispatchConfig) -> Self {
        Self {
            registry,
            evaluator,
            dispatch,
        }
    }

    pub fn build(&self, document: &Document) -> BuildReport {
        let mut state = BuildState {
            tree: SessionTree::new(document.app_attributes(), document.session_attributes()),
            errors: Vec::new(),
            styles: document.styles(),
            ordinals: HashMap::new(),
        };

        if let Some(root) = self.build_control(&mut state, document.root_node(), None, symbols::VIEW) {
            state.tree.set_root(root);
        }
        debug!(entities = state.tree.len(), errors = state.errors.len(), "document built");
        BuildReport {
            tree: state.tree,
            errors: state.errors,
        }
    }

    fn build_control(&self, state: &mut BuildState, declaration: &JsonMap<String, Value>, parent: Option<EntityIndex>, path: &str) -> Option<EntityIndex> {
        let id = self.claim_id(state, declaration, EntityRole::Control, path);
        let type_name = self.read_type(state, declaration, path)?;
        let mut attributes = self.collect_attributes(state, declaration, path, &[]);

        let mut entity = match &type_name {
            None => Entity::new(id, EntityRole::Control, Handler::Dummy),
            Some(type_name) => {
                let factory = self
                    .registry
                    .resolve_control(type_name)
                    .map_err(|error| state.errors.push(BuildError::from_registry(path, error)))
                    .ok()?;
                let blueprint = Blueprint {
                    id: &id,
                    type_name,
                    attributes: &attributes,
                };
                let control = factory(&blueprint)
                    .map_err(|error| state.errors.push(construction_error(path, type_name, error.0)))
                    .ok()?;
                control.configure(&mut attributes);
                let mut entity = Entity::new(id, EntityRole::Control, Handler::Control(control));
                entity.class_name = self.class_name(EntityRole::Control, type_name);
                entity
            }
        };
        entity.type_name = type_name;
        entity.attributes = attributes;
        entity.parent = parent;
        entity.condition = declaration.get(symbols::IF).cloned();
        entity.enabled = declaration.get(symbols::ENABLED).cloned();

        let visible = self.build_time_gate(state, entity.condition.as_ref(), path);
        let parent_suppressed = parent.is_some_and(|parent| state.tree.get(parent).suppressed);
        entity.suppressed = !visible || parent_suppressed;

        let index = state.tree.insert(entity);
        self.build_data_providers(state, declaration, index, path);
        self.build_bindings(state, declaration, index, path);

        if let Some(children) = self.read_list(state, declaration, symbols::CONTROLS, path) {
            for (position, child) in children.iter().enumerate() {
                let child_path = format!("{path}/{}[{position}]", symbols::CONTROLS);
                let Some(child) = child.as_object() else {
                    state.malformed(&child_path, "control declarations must be objects");
                    continue;
                };
                if let Some(child) = self.build_control(state, child, Some(index), &child_path) {
                    state.tree.get_mut(index).controls.push(child);
                }
            }
        }
        Some(index)
    }

    fn build_data_providers(&self, state: &mut BuildState, declaration: &JsonMap<String, Value>, owner: EntityIndex, path: &str) {
        let Some(providers) = self.read_list(state, declaration, symbols::DATA_PROVIDERS, path) else {
            return;
        };
        for (position, provider) in providers.iter().enumerate() {
            let provider_path = format!("{path}/{}[{position}]", symbols::DATA_PROVIDERS);
            let Some(provider) = provider.as_object() else {
                state.malformed(&provider_path, "data provider declarations must be objects");
                continue;
            };
            if let Some(index) = self.build_data_provider(state, provider, owner, &provider_path) {
                state.tree.get_mut(owner).data_providers.push(index);
            }
        }
    }

    fn build_data_provider(&self, state: &mut BuildState, declaration: &JsonMap<String, Value>, owner: EntityIndex, path: &str) -> Option<EntityIndex> {
        // A provider id declared earlier is a reference to the existing provider.
        if let Some(Value::String(id)) = declaration.get(symbols::ID)
            && let Some(existing) = state.tree.find(id.trim())
            && state.tree.get(existing).role == EntityRole::DataProvider
        {
            let extra: Vec<&str> = declaration.keys().map(String::as_str).filter(|key| *key != symbols::ID).collect();
            if !extra.is_empty() {
                state.malformed(
                    path,
                    format!("data provider '{}' is already declared; a reference may only carry 'id' (found {})", id.trim(), extra.join(", ")),
                );
            }
            debug!(provider_id = %id, path = %path, "data provider shared by reference");
            return Some(existing);
        }

        let id = self.claim_id(state, declaration, EntityRole::DataProvider, path);
        let type_name = self.read_type(state, declaration, path)?;
        let attributes = self.collect_attributes(state, declaration, path, &PROVIDER_KEYS);

        let mut entity = match &type_name {
            None => Entity::new(id, EntityRole::DataProvider, Handler::Dummy),
            Some(type_name) => {
                let factory = self
                    .registry
                    .resolve_data_provider(type_name)
                    .map_err(|error| state.errors.push(BuildError::from_registry(path, error)))
                    .ok()?;
                let provider = factory(&Blueprint {
                    id: &id,
                    type_name,
                    attributes: &attributes,
                })
                .map_err(|error| state.errors.push(construction_error(path, type_name, error.0)))
                .ok()?;
                let mut entity = Entity::new(id, EntityRole::DataProvider, Handler::DataProvider(provider));
                entity.class_name = self.class_name(EntityRole::DataProvider, type_name);
                entity
            }
        };
        entity.type_name = type_name;
        entity.attributes = attributes;
        entity.parent = Some(owner);
        entity.condition = declaration.get(symbols::IF).cloned();

        let visible = self.build_time_gate(state, entity.condition.as_ref(), path);
        entity.suppressed = !visible || state.tree.get(owner).suppressed;

        let index = state.tree.insert(entity);
        self.build_bindings(state, declaration, index, path);
        Some(index)
    }

    fn build_bindings(&self, state: &mut BuildState, declaration: &JsonMap<String, Value>, owner: EntityIndex, path: &str) {
        // Map form: `on: { event: [actions] }`. A string `on` is the entity's own trigger and is
        // read by whoever lists it.
        match declaration.get(symbols::ON) {
            Some(Value::Object(bindings)) => {
                for (raw_event, actions) in bindings {
                    let binding_path = format!("{path}/{}.{raw_event}", symbols::ON);
                    let Some(event) = EventName::parse(raw_event) else {
                        state.malformed(&binding_path, format!("'{raw_event}' is not a valid event name"));
                        continue;
                    };
                    let actions: Vec<&Value> = match actions {
                        Value::Array(items) => items.iter().collect(),
                        Value::Object(_) => vec![actions],
                        _ => {
                            state.malformed(&binding_path, "bindings must be an action or a list of actions");
                            continue;
                        }
                    };
                    for (position, action) in actions.into_iter().enumerate() {
                        let action_path = format!("{binding_path}[{position}]");
                        if let Some(action) = self.build_action(state, action, owner, &action_path) {
                            state.tree.bind(
                                owner,
                                Binding {
                                    event: event.clone(),
                                    action,
                                },
                            );
                        }
                    }
                }
            }
            Some(Value::String(_)) | None => {}
            Some(_) => state.malformed(path, "'on' must be an event map or a trigger list"),
        }

        // List form: `actions: [{ on: "touch, long_press", ... }]`.
        let Some(actions) = self.read_list(state, declaration, symbols::ACTIONS, path) else {
            return;
        };
        for (position, action) in actions.iter().enumerate() {
            let action_path = format!("{path}/{}[{position}]", symbols::ACTIONS);
            let triggers = match action.get(symbols::ON) {
                Some(Value::String(raw)) => self.parse_triggers(state, raw, &action_path),
                _ => Vec::new(),
            };
            if triggers.is_empty() {
                state.malformed(&action_path, "actions in an 'actions' list need an 'on' trigger");
                continue;
            }
            if let Some(action) = self.build_action(state, action, owner, &action_path) {
                for event in triggers {
                    state.tree.bind(owner, Binding { event, action });
                }
            }
        }
    }

    fn build_action(&self, state: &mut BuildState, declaration: &Value, owner: EntityIndex, path: &str) -> Option<EntityIndex> {
        let Some(declaration) = declaration.as_object() else {
            state.malformed(path, "action declarations must be objects");
            return None;
        };
        let id = self.claim_id(state, declaration, EntityRole::Action, path);
        let type_name = self.read_type(state, declaration, path)?;
        let attributes = self.collect_attributes(state, declaration, path, &[]);

        let mut entity = match &type_name {
            None => Entity::new(id, EntityRole::Action, Handler::Dummy),
            Some(type_name) => {
                let factory = self
                    .registry
                    .resolve_action(type_name)
                    .map_err(|error| state.errors.push(BuildError::from_registry(path, error)))
                    .ok()?;
                let action = factory(&Blueprint {
                    id: &id,
                    type_name,
                    attributes: &attributes,
                })
                .map_err(|error| state.errors.push(construction_error(path, type_name, error.0)))
                .ok()?;
                let mut entity = Entity::new(id, EntityRole::Action, Handler::Action(action));
                entity.class_name = self.class_name(EntityRole::Action, type_name);
                entity
            }
        };
        entity.type_name = type_name;
        entity.attributes = attributes;
        entity.parent = Some(owner);
        entity.target = match declaration.get(symbols::TARGET) {
            Some(Value::String(target)) => Some(target.trim().to_string()),
            Some(_) => {
                state.malformed(path, "'target' must be a string");
                None
            }
            None => None,
        };
        entity.condition = declaration.get(symbols::IF).cloned();
        entity.enabled = declaration.get(symbols::ENABLED).cloned();
        entity.timing = Timing {
            delay: self
                .read_duration(state, declaration, symbols::DELAY, path)
                .or_else(|| Some(self.dispatch.default_delay()).filter(|delay| !delay.is_zero())),
            repeat_delay: self.read_duration(state, declaration, symbols::REPEAT_DELAY, path),
        };

        let index = state.tree.insert(entity);
        self.build_bindings(state, declaration, index, path);
        Some(index)
    }

    /// Returns the declared id or generates `<kind>-<ordinal>`. A contested id is reported and
    /// kept on the entity, but only the first holder is addressable by it.
    fn claim_id(&self, state: &mut BuildState, declaration: &JsonMap<String, Value>, role: EntityRole, path: &str) -> String {
        match declaration.get(symbols::ID) {
            Some(Value::String(id)) if !id.trim().is_empty() => {
                let id = id.trim().to_string();
                if state.tree.is_id_taken(&id) {
                    state.errors.push(BuildError::DuplicateId {
                        path: path.to_string(),
                        id: id.clone(),
                    });
                }
                id
            }
            Some(Value::String(_)) | None => generate_id(state, role),
            Some(_) => {
                state.malformed(path, "'id' must be a string");
                generate_id(state, role)
            }
        }
    }

    /// `Ok(None)` means no type (a dummy entity). `None` means the declaration is unusable.
    fn read_type(&self, state: &mut BuildState, declaration: &JsonMap<String, Value>, path: &str) -> Option<Option<String>> {
        match declaration.get(symbols::TYPE) {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(type_name)) if type_name.trim().is_empty() => Some(None),
            Some(Value::String(type_name)) => Some(Some(type_name.trim().to_string())),
            Some(_) => {
                state.malformed(path, "'type' must be a string");
                None
            }
        }
    }

    /// Style bundles first, then shorthand and provider keys, then the `attributes` map.
    fn collect_attributes(&self, state: &mut BuildState, declaration: &JsonMap<String, Value>, path: &str, extra_keys: &[&str]) -> Attributes {
        let mut attributes = Attributes::new();

        match declaration.get(symbols::STYLE) {
            Some(Value::String(names)) => {
                for name in symbols::split_list(names) {
                    match state.styles.get(name) {
                        Some(bundle) => attributes.extend(bundle.clone()),
                        None => state.malformed(path, format!("unknown style '{name}'")),
                    }
                }
            }
            Some(_) => state.malformed(path, "'style' must be a comma separated list of style names"),
            None => {}
        }

        for key in SHORTHAND_KEYS.iter().chain(extra_keys) {
            if let Some(value) = declaration.get(*key) {
                attributes.insert((*key).to_string(), value.clone());
            }
        }

        match declaration.get(symbols::ATTRIBUTES) {
            Some(Value::Object(own)) => attributes.extend(own.iter().map(|(key, value)| (key.clone(), value.clone()))),
            Some(_) => state.malformed(path, "'attributes' must be an object"),
            None => {}
        }
        attributes
    }

    fn read_list<'d>(&self, state: &mut BuildState, declaration: &'d JsonMap<String, Value>, key: &str, path: &str) -> Option<&'d Vec<Value>> {
        match declaration.get(key) {
            Some(Value::Array(items)) => Some(items),
            Some(_) => {
                state.malformed(path, format!("'{key}' must be a list"));
                None
            }
            None => None,
        }
    }

    fn read_duration(&self, state: &mut BuildState, declaration: &JsonMap<String, Value>, key: &str, path: &str) -> Option<Duration> {
        let raw = declaration.get(key)?;
        let millis = match raw {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        match millis {
            Some(millis) if millis.is_finite() && millis >= 0.0 => Some(Duration::from_micros((millis * 1000.0).round() as u64)),
            _ => {
                state.malformed(path, format!("'{key}' must be a non-negative number of milliseconds"));
                None
            }
        }
    }

    fn parse_triggers(&self, state: &mut BuildState, raw: &str, path: &str) -> Vec<EventName> {
        symbols::split_list(raw)
            .into_iter()
            .filter_map(|name| {
                let event = EventName::parse(name);
                if event.is_none() {
                    state.malformed(path, format!("'{name}' is not a valid event name"));
                }
                event
            })
            .collect()
    }

    /// Evaluates a node `if` against the tree built so far. Evaluation errors count as false.
    fn build_time_gate(&self, state: &mut BuildState, condition: Option<&Value>, path: &str) -> bool {
        let scope = Scope::new(&state.tree, None);
        match evaluate_gate(condition, self.evaluator, &scope) {
            Ok(visible) => visible,
            Err(error) => {
                state.errors.push(BuildError::PredicateEvaluation {
                    path: path.to_string(),
                    expression: condition.map(gate_text).unwrap_or_default(),
                    error,
                });
                false
            }
        }
    }

    fn class_name(&self, role: EntityRole, type_name: &str) -> String {
        self.registry
            .class_name_for(role.category(), type_name)
            .unwrap_or_else(|_| symbols::DUMMY_ENTITY_NAME.to_string())
    }
}

fn generate_id(state: &mut BuildState, role: EntityRole) -> String {
    loop {
        let ordinal = state.ordinals.entry(role).or_insert(0);
        *ordinal += 1;
        let candidate = format!("{}-{}", role.id_prefix(), ordinal);
        if !state.tree.is_id_taken(&candidate) {
            return candidate;
        }
    }
}

fn construction_error(path: &str, type_name: &str, message: String) -> BuildError {
    BuildError::ComponentConstruction {
        path: path.to_string(),
        type_name: type_name.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use ignite_registry::RegistryConfig;
    use serde_json::json;

    use super::*;
    use crate::predicate::ConditionEvaluator;
    use crate::snapshot::EntitySnapshot;

    fn build(document: Value) -> BuildReport {
        let registry = ComponentRegistry::with_builtins(&RegistryConfig::default()).unwrap();
        let dispatch = DispatchConfig::default();
        let document = Document::from_value(document).unwrap();
        TreeBuilder::new(&registry, &ConditionEvaluator, &dispatch).build(&document)
    }

    #[test]
    fn untyped_nodes_become_dummies() {
        let report = build(json!({
            "view": { "id": "root", "controls": [{ "id": "group", "controls": [{ "id": "label", "type": "text" }] }] }
        }));

        assert!(report.is_clean(), "{:?}", report.errors);
        let group = report.tree.by_id("group").unwrap();
        assert!(group.is_dummy());
        assert_eq!(group.class_name, symbols::DUMMY_ENTITY_NAME);
        assert_eq!(report.tree.by_id("label").unwrap().class_name, "IXTextControl");
    }

    #[test]
    fn unknown_types_skip_only_that_node() {
        let report = build(json!({
            "view": {
                "id": "root",
                "type": "view",
                "controls": [
                    { "id": "a", "type": "text" },
                    { "id": "broken", "type": "carousel", "controls": [{ "id": "inner", "type": "text" }] },
                    { "id": "c", "type": "button" }
                ]
            }
        }));

        assert_eq!(
            report.errors,
            vec![BuildError::UnknownType {
                path: "view/controls[1]".into(),
                category: ignite_types::Category::Control,
                type_name: "carousel".into(),
            }]
        );
        let root = report.tree.by_id("root").unwrap();
        let children: Vec<_> = root.controls.iter().map(|child| report.tree.get(*child).id.as_str()).collect();
        assert_eq!(children, vec!["a", "c"]);
        assert!(report.tree.find("broken").is_none());
        assert!(report.tree.find("inner").is_none());
    }

    #[test]
    fn duplicate_ids_keep_the_first_entity_addressable() {
        let report = build(json!({
            "view": { "controls": [
                { "id": "name", "type": "text", "attributes": { "text": "first" } },
                { "id": "name", "type": "text", "attributes": { "text": "second" } }
            ] }
        }));

        assert!(matches!(&report.errors[..], [BuildError::DuplicateId { id, .. }] if id == "name"));
        assert_eq!(report.tree.by_id("name").unwrap().attributes["text"], json!("first"));
        assert_eq!(report.tree.by_id("control-1").map(|root| root.controls.len()), Some(2));
    }

    #[test]
    fn styles_merge_before_own_attributes() {
        let report = build(json!({
            "style": { "heading": { "font": "bold", "color": "black" }, "accent": { "color": "orange" } },
            "view": { "controls": [{ "id": "title", "type": "text", "style": "heading, accent", "attributes": { "font": "light" } }] }
        }));

        let title = report.tree.by_id("title").unwrap();
        assert_eq!(title.attributes["font"], json!("light"));
        assert_eq!(title.attributes["color"], json!("orange"));
    }

    #[test]
    fn false_conditions_suppress_but_keep_nodes_addressable() {
        let report = build(json!({
            "session": { "admin": false },
            "view": { "controls": [
                { "id": "panel", "type": "view", "if": "session.admin", "controls": [{ "id": "danger", "type": "button" }] },
                { "id": "broken", "type": "text", "if": "session.admin >= 1" }
            ] }
        }));

        assert!(report.tree.by_id("panel").unwrap().suppressed);
        assert!(report.tree.by_id("danger").unwrap().suppressed);
        assert!(report.tree.by_id("broken").unwrap().suppressed);
        assert!(matches!(&report.errors[..], [BuildError::PredicateEvaluation { path, .. }] if path == "view/controls[1]"));
    }

    #[test]
    fn providers_inherit_and_evaluate_suppression() {
        let report = build(json!({
            "session": { "offline": true },
            "view": {
                "id": "root",
                "controls": [{ "id": "hidden", "type": "view", "if": false, "dataProviders": [{ "id": "inner", "type": "json" }] }],
                "dataProviders": [
                    { "id": "gated", "type": "json", "if": "session.offline == false" },
                    { "id": "live", "type": "json", "if": "{{ session.offline }}" }
                ]
            }
        }));

        assert!(report.is_clean(), "{:?}", report.errors);
        assert!(report.tree.by_id("inner").unwrap().suppressed);
        assert!(report.tree.by_id("gated").unwrap().suppressed);
        assert!(!report.tree.by_id("live").unwrap().suppressed);
    }

    #[test]
    fn provider_references_may_only_carry_an_id() {
        let report = build(json!({
            "view": { "controls": [
                { "id": "list", "type": "view", "dataProviders": [{ "id": "feed", "type": "json" }] },
                { "id": "footer", "type": "view", "dataProviders": [{ "id": "feed", "on": { "finished": [{ "id": "lost", "type": "alert" }] } }] }
            ] }
        }));

        assert!(matches!(
            &report.errors[..],
            [BuildError::MalformedNode { path, reason }] if path == "view/controls[1]/dataProviders[0]" && reason.contains("'feed'")
        ));
        let footer = report.tree.by_id("footer").unwrap();
        assert_eq!(footer.data_providers, report.tree.by_id("list").unwrap().data_providers);
        assert!(report.tree.by_id("lost").is_none());
    }

    #[test]
    fn providers_are_shared_and_bindings_keep_order() {
        let report = build(json!({
            "view": { "controls": [
                {
                    "id": "list",
                    "type": "view",
                    "dataProviders": [{ "id": "feed", "type": "json", "entity": "items", "parameters": { "page": 1 } }],
                    "on": { "touch": [{ "id": "first", "type": "alert" }] },
                    "actions": [
                        { "id": "second", "on": "touch, swipe", "type": "load", "target": "feed", "delay": 250 },
                        { "id": "orphan", "type": "alert" }
                    ]
                },
                { "id": "footer", "type": "view", "dataProviders": [{ "id": "feed" }] }
            ] }
        }));

        let tree = &report.tree;
        let feed = tree.find("feed").unwrap();
        assert_eq!(tree.by_id("footer").unwrap().data_providers, vec![feed]);
        assert_eq!(tree.get(feed).attributes["entity"], json!("items"));

        let list = tree.find("list").unwrap();
        let touch = EventName::parse("touch").unwrap();
        let ids: Vec<_> = tree.bindings_for(list, &touch).into_iter().map(|action| tree.get(action).id.clone()).collect();
        assert_eq!(ids, vec!["first", "second"]);
        assert_eq!(tree.by_id("second").unwrap().timing.delay, Some(Duration::from_millis(250)));
        assert!(tree.is_declared_event(&EventName::parse("swipe").unwrap()));
        assert!(matches!(&report.errors[..], [BuildError::MalformedNode { path, .. }] if path == "view/controls[0]/actions[1]"));
    }

    #[test]
    fn attributes_survive_a_serialization_round_trip() {
        let report = build(json!({
            "view": { "id": "root", "type": "view", "attributes": { "orientation": "horizontal", "insets": [1, 2.5, null], "meta": { "z": true } },
                "controls": [{ "id": "pic", "type": "image", "attributes": { "source": "a.gif" } }] }
        }));

        let snapshot = report.tree.root_snapshot().unwrap();
        let encoded = serde_json::to_string(&snapshot).unwrap();
        let decoded: EntitySnapshot = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, snapshot);
        assert_eq!(decoded.attributes.keys().collect::<Vec<_>>(), vec!["orientation", "insets", "meta"]);
        assert_eq!(decoded.controls[0].attributes["animated"], json!(true));
    }
}
