//! Session lifecycle: build a tree from a document, render it, and route its events.

use std::sync::Arc;

use ignite_types::{Attributes, Document, Event, EventName, LifecycleEvent};
use parking_lot::RwLock;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use crate::builder::TreeBuilder;
use crate::catalog::ComponentRegistry;
use crate::collaborators::Collaborators;
use crate::config::{BuildMode, EngineConfig};
use crate::control_thread::ControlThread;
use crate::dispatcher::{DeliveryRecord, Dispatcher, SharedState};
use crate::error::{BuildError, DispatchError, EngineError};
use crate::predicate::{ConditionEvaluator, PredicateEvaluator};
use crate::snapshot::EntitySnapshot;

/// Configures and opens a [`Session`].
pub struct SessionBuilder {
    config: EngineConfig,
    registry: Option<ComponentRegistry>,
    evaluator: Arc<dyn PredicateEvaluator>,
    collaborators: Collaborators,
}

impl SessionBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: None,
            evaluator: Arc::new(ConditionEvaluator),
            collaborators: Collaborators::default(),
        }
    }

    /// Uses `registry` instead of a fresh registry holding the built-in components.
    pub fn registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn evaluator(mut self, evaluator: Arc<dyn PredicateEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    /// Builds the tree on a new control thread, renders the root and starts routing events.
    ///
    /// Declaration problems do not fail the open; they are collected in
    /// [`Session::build_errors`].
    pub async fn open(self, document: Document) -> Result<Session, EngineError> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;
        let registry = Arc::new(match self.registry {
            Some(registry) => registry,
            None => ComponentRegistry::with_builtins(&self.config.registry)?,
        });
        let control = ControlThread::spawn().map_err(EngineError::Spawn)?;

        let report = {
            let registry = Arc::clone(&registry);
            let evaluator = Arc::clone(&self.evaluator);
            let dispatch = self.config.dispatch.clone();
            control
                .run(move || TreeBuilder::new(&registry, evaluator.as_ref(), &dispatch).build(&document))
                .await?
        };

        for error in &report.errors {
            match self.config.mode {
                BuildMode::Debug => warn!(path = %error.path(), error = %error, "declaration skipped"),
                BuildMode::Release => debug!(path = %error.path(), error = %error, "declaration skipped"),
            }
        }
        let entities = report.tree.len();
        let build_errors = report.errors;
        let tree = Arc::new(RwLock::new(report.tree));

        {
            let tree = Arc::clone(&tree);
            let renderer = Arc::clone(&self.collaborators.renderer);
            control
                .run(move || {
                    if let Some(root) = tree.read().root_snapshot() {
                        renderer.render(&root);
                    }
                })
                .await?;
        }

        let shared = SharedState {
            tree,
            registry,
            evaluator: self.evaluator,
            collaborators: self.collaborators,
            control,
        };
        let dispatcher = Dispatcher::new(shared.clone(), self.config.dispatch.clone(), runtime);
        info!(
            entities,
            build_errors = build_errors.len(),
            mode = self.config.mode.as_str(),
            "session opened"
        );

        Ok(Session {
            shared,
            dispatcher,
            build_errors,
        })
    }
}

/// A live component tree plus its event routing.
///
/// Collaborators are invoked on the control thread while the tree is locked, so they must not
/// call back into the session synchronously. Dropping the session tears it down.
pub struct Session {
    shared: SharedState,
    dispatcher: Dispatcher,
    build_errors: Vec<BuildError>,
}

impl Session {
    /// Opens a session with default configuration and collaborators.
    pub async fn open(document: Document) -> Result<Self, EngineError> {
        SessionBuilder::new(EngineConfig::default()).open(document).await
    }

    pub fn builder(config: EngineConfig) -> SessionBuilder {
        SessionBuilder::new(config)
    }

    /// Problems met while building the tree.
    pub fn build_errors(&self) -> &[BuildError] {
        &self.build_errors
    }

    /// Raises `event` from the entity `source`.
    pub fn raise(&self, source: &str, event: &str, payload: Option<Value>) -> Result<(), DispatchError> {
        let name = EventName::parse(event).ok_or_else(|| DispatchError::UnknownEvent { name: event.to_string() })?;
        let mut event = Event::new(source, name);
        event.payload = payload;
        self.dispatcher.dispatch(event)
    }

    pub fn dispatch(&self, event: Event) -> Result<(), DispatchError> {
        self.dispatcher.dispatch(event)
    }

    /// Loads the data provider `provider_id`. A load already in flight is not restarted.
    pub fn load(&self, provider_id: &str) -> Result<(), DispatchError> {
        self.dispatcher.load(provider_id)
    }

    pub async fn begin(&self, entity_id: &str) -> Result<(), DispatchError> {
        self.dispatcher.begin(entity_id).await
    }

    pub async fn complete(&self, entity_id: &str, outcome: LifecycleEvent, payload: Option<Value>) -> Result<(), DispatchError> {
        self.dispatcher.complete(entity_id, outcome, payload).await
    }

    /// Waits until every queued delivery, delayed action and load has finished.
    pub async fn settle(&self) {
        self.dispatcher.settle().await
    }

    /// Snapshot of the root control and everything below it.
    pub fn snapshot(&self) -> Option<EntitySnapshot> {
        self.shared.tree.read().root_snapshot()
    }

    pub fn entity(&self, id: &str) -> Option<EntitySnapshot> {
        let tree = self.shared.tree.read();
        tree.find(id).map(|index| tree.snapshot(index))
    }

    /// Current application-wide attribute store.
    pub fn app(&self) -> Attributes {
        self.shared.tree.read().app().clone()
    }

    /// Current session attribute store.
    pub fn session_store(&self) -> Attributes {
        self.shared.tree.read().session().clone()
    }

    pub fn journal(&self) -> Vec<DeliveryRecord> {
        self.dispatcher.journal()
    }

    /// Number of `repeatDelay` bindings currently repeating.
    pub fn active_repeats(&self) -> usize {
        self.dispatcher.active_repeats()
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.shared.registry
    }

    pub fn control_thread(&self) -> &ControlThread {
        &self.shared.control
    }

    pub fn is_closed(&self) -> bool {
        self.dispatcher.is_closed()
    }

    /// Cancels delayed and repeated deliveries and rejects further events.
    pub fn teardown(&self) {
        if !self.dispatcher.is_closed() {
            self.dispatcher.teardown();
            info!("session torn down");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.teardown();
    }
}
