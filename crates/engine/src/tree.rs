//! Arena holding every entity built from a document.
//!
//! Controls, data providers and actions share one arena and one id namespace. Relationships are
//! expressed as [`EntityIndex`] links: a control lists its child controls and the providers it
//! reads, and every entity lists its event bindings in declaration order.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};

use ignite_types::{Attributes, Category, EventName, LifecycleState, symbols};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::components::{Action, Control, DataProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityIndex(usize);

impl EntityIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

/// Position an entity was declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRole {
    Control,
    DataProvider,
    Action,
}

impl EntityRole {
    pub fn category(self) -> Category {
        match self {
            Self::Control => Category::Control,
            Self::DataProvider => Category::DataProvider,
            Self::Action => Category::Action,
        }
    }

    /// Prefix of generated ids, e.g. `control-3`.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::DataProvider => "data-provider",
            Self::Action => "action",
        }
    }
}

/// Behavior attached to an entity. Entities declared without a type get [`Handler::Dummy`].
#[derive(Debug, Clone)]
pub enum Handler {
    Dummy,
    Control(Arc<dyn Control>),
    DataProvider(Arc<dyn DataProvider>),
    Action(Arc<dyn Action>),
}

/// `event -> action` edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub event: EventName,
    pub action: EntityIndex,
}

/// Scheduling hints declared on an action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timing {
    pub delay: Option<Duration>,
    pub repeat_delay: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: String,
    pub role: EntityRole,
    pub type_name: Option<String>,
    pub class_name: String,
    pub handler: Handler,
    pub attributes: Attributes,
    pub parent: Option<EntityIndex>,
    pub controls: Vec<EntityIndex>,
    pub data_providers: Vec<EntityIndex>,
    pub bindings: Vec<Binding>,
    /// Raw `target` of an action.
    pub target: Option<String>,
    /// Raw `if` gate.
    pub condition: Option<Value>,
    /// Raw `enabled` gate. A false gate skips an action and makes a control drop its events.
    pub enabled: Option<Value>,
    pub timing: Timing,
    /// Set when a node's `if` evaluated false at build time. Suppressed nodes stay addressable
    /// but deliver no events.
    pub suppressed: bool,
    pub state: LifecycleState,
    /// Last payload loaded by a data provider.
    pub payload: Option<Value>,
}

impl Entity {
    pub fn new(id: impl Into<String>, role: EntityRole, handler: Handler) -> Self {
        Self {
            id: id.into(),
            role,
            type_name: None,
            class_name: symbols::DUMMY_ENTITY_NAME.to_string(),
            handler,
            attributes: Attributes::new(),
            parent: None,
            controls: Vec::new(),
            data_providers: Vec::new(),
            bindings: Vec::new(),
            target: None,
            condition: None,
            enabled: None,
            timing: Timing::default(),
            suppressed: false,
            state: LifecycleState::Idle,
            payload: None,
        }
    }

    pub fn is_dummy(&self) -> bool {
        matches!(self.handler, Handler::Dummy)
    }

    pub fn supports_repetition(&self) -> bool {
        match &self.handler {
            Handler::Control(control) => control.supports_repetition(),
            Handler::DataProvider(provider) => provider.supports_repetition(),
            Handler::Action(_) | Handler::Dummy => false,
        }
    }

    pub fn control(&self) -> Option<&Arc<dyn Control>> {
        match &self.handler {
            Handler::Control(control) => Some(control),
            _ => None,
        }
    }

    pub fn data_provider(&self) -> Option<&Arc<dyn DataProvider>> {
        match &self.handler {
            Handler::DataProvider(provider) => Some(provider),
            _ => None,
        }
    }

    /// Declared type, or the empty string for dummies.
    pub fn type_str(&self) -> &str {
        self.type_name.as_deref().unwrap_or(symbols::EMPTY_STRING)
    }
}

/// All entities of one session plus the `app` and `session` value stores.
#[derive(Debug, Default, Clone)]
pub struct SessionTree {
    entities: Vec<Entity>,
    ids: HashMap<String, EntityIndex>,
    root: Option<EntityIndex>,
    app: Attributes,
    session: Attributes,
    declared_events: HashSet<EventName>,
}

impl SessionTree {
    pub fn new(app: Attributes, session: Attributes) -> Self {
        Self {
            app,
            session,
            ..Self::default()
        }
    }

    /// Adds an entity. Its id is registered only when no other entity holds it yet.
    pub fn insert(&mut self, entity: Entity) -> EntityIndex {
        let index = EntityIndex(self.entities.len());
        if !self.ids.contains_key(&entity.id) {
            self.ids.insert(entity.id.clone(), index);
        }
        self.entities.push(entity);
        index
    }

    pub fn is_id_taken(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn bind(&mut self, owner: EntityIndex, binding: Binding) {
        self.declared_events.insert(binding.event.clone());
        self.entities[owner.0].bindings.push(binding);
    }

    pub fn set_root(&mut self, root: EntityIndex) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<EntityIndex> {
        self.root
    }

    pub fn find(&self, id: &str) -> Option<EntityIndex> {
        self.ids.get(id).copied()
    }

    pub fn get(&self, index: EntityIndex) -> &Entity {
        &self.entities[index.0]
    }

    pub fn get_mut(&mut self, index: EntityIndex) -> &mut Entity {
        &mut self.entities[index.0]
    }

    pub fn by_id(&self, id: &str) -> Option<&Entity> {
        self.find(id).map(|index| self.get(index))
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityIndex, &Entity)> {
        self.entities.iter().enumerate().map(|(index, entity)| (EntityIndex(index), entity))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn app(&self) -> &Attributes {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut Attributes {
        &mut self.app
    }

    pub fn session(&self) -> &Attributes {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Attributes {
        &mut self.session
    }

    /// Whether any entity binds `event`.
    pub fn is_declared_event(&self, event: &EventName) -> bool {
        self.declared_events.contains(event)
    }

    /// Actions bound to `event` on `owner`, in declaration order.
    pub fn bindings_for(&self, owner: EntityIndex, event: &EventName) -> Vec<EntityIndex> {
        self.get(owner)
            .bindings
            .iter()
            .filter(|binding| &binding.event == event)
            .map(|binding| binding.action)
            .collect()
    }
}
