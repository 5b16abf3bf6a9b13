//! Event routing.
//!
//! Every entity gets a lane: an unbounded queue drained by one tokio task, so the events of a
//! single entity are delivered strictly in order while different entities proceed concurrently.
//! Delivering an event walks the source's bindings for that name in declaration order. For each
//! bound action the `enabled` and `if` gates are evaluated on the control thread, the lane waits
//! out the action's `delay`, and the action executes on the control thread. A `repeatDelay`
//! re-queues the same binding on the source's lane until the session is torn down or the binding
//! is triggered again.

use std::{
    collections::HashMap,
    sync::{
        Arc, Weak,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use ignite_types::{DataProviderRequest, Event, EventName, LifecycleEvent, LifecycleState};
use ignite_util::redact_headers;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::{
    runtime::Handle,
    sync::{Notify, mpsc},
    time,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace, warn};

use crate::catalog::ComponentRegistry;
use crate::collaborators::{Collaborators, TransportError};
use crate::components::{ActionEffect, ActionError, ActionInvocation, Blueprint, DataProvider};
use crate::config::DispatchConfig;
use crate::control_thread::ControlThread;
use crate::error::DispatchError;
use crate::interpolate::interpolate_attributes;
use crate::predicate::{PredicateEvaluator, evaluate_gate};
use crate::scope::Scope;
use crate::ticker::Ticker;
use crate::tree::{EntityIndex, EntityRole, Handler, SessionTree};

/// State shared by the session and its dispatcher.
#[derive(Clone)]
pub(crate) struct SharedState {
    pub tree: Arc<RwLock<SessionTree>>,
    pub registry: Arc<ComponentRegistry>,
    pub evaluator: Arc<dyn PredicateEvaluator>,
    pub collaborators: Collaborators,
    pub control: ControlThread,
}

/// Why a bound action did not run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum SkipReason {
    SourceSuppressed,
    /// The source control's `enabled` gate is false.
    SourceDisabled,
    Disabled,
    ConditionFalse,
    PredicateError(String),
    LoadInProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum DeliveryOutcome {
    /// The event reached its source's lane and matched this many bindings.
    Delivered { bindings: usize },
    Executed,
    Skipped { skip: SkipReason },
    Failed { error: String },
}

/// One line of the session journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub at: DateTime<Utc>,
    pub source: String,
    pub event: EventName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(flatten)]
    pub outcome: DeliveryOutcome,
}

enum LaneMessage {
    Deliver(Event),
    Refire { action: EntityIndex, event: Event },
}

enum Step {
    Run {
        action: EntityIndex,
        action_id: String,
        delay: Option<Duration>,
        repeat: Option<Duration>,
    },
    Skip {
        action_id: String,
        reason: SkipReason,
    },
}

struct Plan {
    /// Set when the source itself drops the event.
    dropped: Option<SkipReason>,
    steps: Vec<Step>,
}

struct Execution {
    action_id: String,
    has_bindings: bool,
    result: Result<ActionEffect, ActionError>,
}

enum LoadRefusal {
    NotADataProvider(String),
    InProgress(String),
    Suppressed(String),
}

struct PreparedLoad {
    provider_id: String,
    handler: Arc<dyn DataProvider>,
    request: DataProviderRequest,
}

struct Completion {
    entity_id: String,
    has_bindings: bool,
    events: Vec<(LifecycleEvent, Option<Value>)>,
}

/// Routes events to bound actions. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    shared: SharedState,
    config: DispatchConfig,
    runtime: Handle,
    cancel: CancellationToken,
    lanes: Mutex<HashMap<String, mpsc::UnboundedSender<LaneMessage>>>,
    ticker: Ticker,
    pending: AtomicUsize,
    idle: Notify,
    journal: Mutex<Vec<DeliveryRecord>>,
}

impl Dispatcher {
    pub(crate) fn new(shared: SharedState, config: DispatchConfig, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(DispatcherInner {
                shared,
                config,
                runtime,
                cancel: CancellationToken::new(),
                lanes: Mutex::new(HashMap::new()),
                ticker: Ticker::new(),
                pending: AtomicUsize::new(0),
                idle: Notify::new(),
                journal: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Queues `event` on its source's lane.
    ///
    /// Fails with `UnknownEvent` when the name is neither a lifecycle event nor bound anywhere in
    /// the session, and with `UnknownEntity` when no entity has the source id.
    pub fn dispatch(&self, event: Event) -> Result<(), DispatchError> {
        self.inner.dispatch(event)
    }

    /// Starts a load of the data provider `provider_id`.
    pub fn load(&self, provider_id: &str) -> Result<(), DispatchError> {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() {
            return Err(DispatchError::SessionClosed);
        }
        let index = {
            let tree = inner.shared.tree.read();
            let index = tree.find(provider_id).ok_or_else(|| DispatchError::UnknownEntity {
                id: provider_id.to_string(),
            })?;
            if tree.get(index).data_provider().is_none() {
                return Err(DispatchError::NotADataProvider {
                    id: provider_id.to_string(),
                });
            }
            index
        };
        inner.spawn_load(index);
        Ok(())
    }

    /// Moves `entity_id` into `Running`.
    pub async fn begin(&self, entity_id: &str) -> Result<(), DispatchError> {
        let shared = self.inner.shared.clone();
        let id = entity_id.to_string();
        self.inner
            .shared
            .control
            .run(move || {
                let mut tree = shared.tree.write();
                let index = tree.find(&id).ok_or_else(|| DispatchError::UnknownEntity { id: id.clone() })?;
                let entity = tree.get_mut(index);
                entity.state = entity
                    .state
                    .begin()
                    .map_err(|source| DispatchError::InvalidTransition { id: id.clone(), source })?;
                Ok::<_, DispatchError>(())
            })
            .await?
    }

    /// Completes a running entity and raises the matching lifecycle event(s). A `Success`
    /// completion raises `success` followed by `finished`.
    pub async fn complete(&self, entity_id: &str, outcome: LifecycleEvent, payload: Option<Value>) -> Result<(), DispatchError> {
        let shared = self.inner.shared.clone();
        let id = entity_id.to_string();
        let completion = self
            .inner
            .shared
            .control
            .run(move || {
                let mut tree = shared.tree.write();
                let index = tree.find(&id).ok_or_else(|| DispatchError::UnknownEntity { id: id.clone() })?;
                let entity = tree.get_mut(index);
                entity.state = entity
                    .state
                    .complete(outcome)
                    .map_err(|source| DispatchError::InvalidTransition { id: id.clone(), source })?;
                Ok::<_, DispatchError>(Completion {
                    entity_id: id,
                    has_bindings: !entity.bindings.is_empty(),
                    events: lifecycle_events(outcome)
                        .into_iter()
                        .map(|event| (event, payload.clone()))
                        .collect(),
                })
            })
            .await??;
        self.inner.raise_completion(completion);
        Ok(())
    }

    /// Waits until no delivery, action or load is queued or running. Active repeats do not count.
    pub async fn settle(&self) {
        let inner = &self.inner;
        loop {
            let notified = inner.idle.notified();
            if inner.pending.load(Ordering::SeqCst) == 0 || inner.cancel.is_cancelled() {
                return;
            }
            tokio::select! {
                _ = notified => {}
                _ = inner.cancel.cancelled() => return,
            }
        }
    }

    pub fn journal(&self) -> Vec<DeliveryRecord> {
        self.inner.journal.lock().clone()
    }

    pub fn active_repeats(&self) -> usize {
        self.inner.ticker.active_count()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Cancels pending delayed and repeated deliveries. Loads already in flight finish, but their
    /// completions are ignored.
    pub fn teardown(&self) {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() {
            return;
        }
        inner.cancel.cancel();
        inner.ticker.clear();
        inner.lanes.lock().clear();
        inner.idle.notify_waiters();
        debug!("dispatcher torn down");
    }
}

impl DispatcherInner {
    fn dispatch(self: &Arc<Self>, event: Event) -> Result<(), DispatchError> {
        if self.cancel.is_cancelled() {
            return Err(DispatchError::SessionClosed);
        }
        {
            let tree = self.shared.tree.read();
            if tree.find(&event.source).is_none() {
                return Err(DispatchError::UnknownEntity { id: event.source.clone() });
            }
            if event.name.lifecycle().is_none() && !tree.is_declared_event(&event.name) {
                warn!(source = %event.source, event = %event.name, "event is not bound anywhere; ignoring");
                return Err(DispatchError::UnknownEvent {
                    name: event.name.to_string(),
                });
            }
        }
        let source = event.source.clone();
        self.enqueue(&source, LaneMessage::Deliver(event))
    }

    fn enqueue(self: &Arc<Self>, source: &str, message: LaneMessage) -> Result<(), DispatchError> {
        self.begin_pending();
        let sent = {
            let mut lanes = self.lanes.lock();
            if self.cancel.is_cancelled() {
                Err(message)
            } else {
                let lane = lanes.entry(source.to_string()).or_insert_with(|| self.open_lane(source));
                lane.send(message).map_err(|rejected| rejected.0)
            }
        };
        sent.map_err(|_| {
            self.finish_one();
            DispatchError::SessionClosed
        })
    }

    fn open_lane(self: &Arc<Self>, source: &str) -> mpsc::UnboundedSender<LaneMessage> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let inner = Arc::clone(self);
        let source = source.to_string();
        trace!(source = %source, "lane opened");
        self.runtime.spawn(async move { inner.run_lane(source, receiver).await });
        sender
    }

    async fn run_lane(self: Arc<Self>, source: String, mut receiver: mpsc::UnboundedReceiver<LaneMessage>) {
        loop {
            let message = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                message = receiver.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
            };
            match message {
                LaneMessage::Deliver(event) => self.deliver(&event).await,
                LaneMessage::Refire { action, event } => self.refire(action, &event).await,
            }
            self.finish_one();
        }

        receiver.close();
        while receiver.try_recv().is_ok() {
            self.finish_one();
        }
        trace!(source = %source, "lane closed");
    }

    async fn deliver(self: &Arc<Self>, event: &Event) {
        let Some(plan) = self.plan(event, None).await else {
            return;
        };
        if let Some(skip) = plan.dropped {
            debug!(source = %event.source, event = %event.name, reason = ?skip, "event dropped by its source");
            self.record(event, None, DeliveryOutcome::Skipped { skip });
            return;
        }
        self.record(event, None, DeliveryOutcome::Delivered {
            bindings: plan.steps.len(),
        });

        for step in plan.steps {
            let (action, action_id, delay, repeat) = match step {
                Step::Run {
                    action,
                    action_id,
                    delay,
                    repeat,
                } => (action, action_id, delay, repeat),
                Step::Skip { action_id, reason } => {
                    self.record(event, Some(action_id), DeliveryOutcome::Skipped { skip: reason });
                    continue;
                }
            };

            if let Some(delay) = delay.filter(|delay| !delay.is_zero()) {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return,
                    _ = time::sleep(delay) => {}
                }
            }
            if self.cancel.is_cancelled() {
                return;
            }
            self.execute(action, event).await;

            if let Some(interval) = repeat.filter(|interval| !interval.is_zero()) {
                self.schedule_repeat(event, action, &action_id, interval);
            }
        }
    }

    async fn refire(self: &Arc<Self>, action: EntityIndex, event: &Event) {
        let Some(plan) = self.plan(event, Some(action)).await else {
            return;
        };
        for step in plan.steps {
            match step {
                Step::Run { action, .. } => self.execute(action, event).await,
                Step::Skip { action_id, reason } => self.record(event, Some(action_id), DeliveryOutcome::Skipped { skip: reason }),
            }
        }
    }

    /// Resolves the bindings for `event` and evaluates their gates on the control thread.
    async fn plan(self: &Arc<Self>, event: &Event, only: Option<EntityIndex>) -> Option<Plan> {
        let shared = self.shared.clone();
        let event = event.clone();
        let planned = self
            .shared
            .control
            .run(move || {
                let tree = shared.tree.read();
                plan_deliveries(&tree, shared.evaluator.as_ref(), &event, only)
            })
            .await;
        match planned {
            Ok(plan) => plan,
            Err(error) => {
                error!(error = %error, "failed to plan delivery");
                None
            }
        }
    }

    async fn execute(self: &Arc<Self>, action: EntityIndex, event: &Event) {
        let shared = self.shared.clone();
        let event_for_task = event.clone();
        let execution = match self.shared.control.run(move || shared.execute_action(action, &event_for_task)).await {
            Ok(execution) => execution,
            Err(error) => {
                error!(error = %error, "failed to execute action");
                return;
            }
        };

        match execution.result {
            Ok(effect) => {
                debug!(action_id = %execution.action_id, source = %event.source, event = %event.name, "action executed");
                self.record(event, Some(execution.action_id.clone()), DeliveryOutcome::Executed);
                if let ActionEffect::Load(provider) = effect {
                    self.spawn_load(provider);
                }
                self.raise_completion(Completion {
                    entity_id: execution.action_id,
                    has_bindings: execution.has_bindings,
                    events: lifecycle_events(LifecycleEvent::Success)
                        .into_iter()
                        .map(|event| (event, None))
                        .collect(),
                });
            }
            Err(action_error) => {
                let message = match &action_error {
                    ActionError::UnresolvedTarget(target) => DispatchError::UnresolvedTarget {
                        action: execution.action_id.clone(),
                        target: target.clone(),
                    }
                    .to_string(),
                    other => other.to_string(),
                };
                warn!(action_id = %execution.action_id, source = %event.source, event = %event.name, error = %message, "action failed");
                self.record(event, Some(execution.action_id.clone()), DeliveryOutcome::Failed { error: message.clone() });
                self.raise_completion(Completion {
                    entity_id: execution.action_id,
                    has_bindings: execution.has_bindings,
                    events: vec![(LifecycleEvent::Failed, Some(json!({ "message": message })))],
                });
            }
        }
    }

    fn schedule_repeat(self: &Arc<Self>, event: &Event, action: EntityIndex, action_id: &str, interval: Duration) {
        let interval = self.config.clamp_repeat(interval);
        let key = format!("{}/{}/{}", event.source, event.name, action_id);
        let weak: Weak<Self> = Arc::downgrade(self);
        let source = event.source.clone();
        let event = event.clone();
        debug!(binding = %key, interval_ms = interval.as_millis() as u64, "repeat scheduled");
        self.ticker.start(key, &self.cancel, interval, interval, self.config.max_repeats, move || {
            let Some(inner) = weak.upgrade() else {
                return false;
            };
            inner
                .enqueue(&source, LaneMessage::Refire {
                    action,
                    event: event.clone(),
                })
                .is_ok()
        });
    }

    fn spawn_load(self: &Arc<Self>, provider: EntityIndex) {
        self.begin_pending();
        let inner = Arc::clone(self);
        self.runtime.spawn(async move {
            inner.load(provider).await;
            inner.finish_one();
        });
    }

    async fn load(self: &Arc<Self>, provider: EntityIndex) {
        let shared = self.shared.clone();
        let prepared = match self.shared.control.run(move || shared.prepare_load(provider)).await {
            Ok(Ok(prepared)) => prepared,
            Ok(Err(LoadRefusal::InProgress(provider_id))) => {
                debug!(provider_id = %provider_id, "load already in progress; request ignored");
                return;
            }
            Ok(Err(LoadRefusal::NotADataProvider(id))) => {
                warn!(entity_id = %id, "load requested for an entity that is not a data provider");
                return;
            }
            Ok(Err(LoadRefusal::Suppressed(provider_id))) => {
                debug!(provider_id = %provider_id, "data provider is suppressed; load refused");
                let event = Event::new(provider_id, EventName::load());
                self.record(&event, None, DeliveryOutcome::Skipped {
                    skip: SkipReason::SourceSuppressed,
                });
                return;
            }
            Err(error) => {
                error!(error = %error, "failed to prepare load");
                return;
            }
        };

        debug!(
            provider_id = %prepared.provider_id,
            provider_type = %prepared.request.provider_type,
            headers = ?redact_headers(&prepared.request.headers),
            "data provider load started"
        );
        let transport = Arc::clone(&self.shared.collaborators.transport);
        let result = prepared.handler.load(prepared.request, transport).await;
        if self.cancel.is_cancelled() {
            debug!(provider_id = %prepared.provider_id, "session torn down; load completion ignored");
            return;
        }

        let shared = self.shared.clone();
        match self.shared.control.run(move || shared.complete_load(provider, result)).await {
            Ok(completion) => self.raise_completion(completion),
            Err(error) => error!(error = %error, "failed to complete load"),
        }
    }

    fn raise_completion(self: &Arc<Self>, completion: Completion) {
        if !completion.has_bindings {
            trace!(entity_id = %completion.entity_id, "no bindings; lifecycle events not queued");
            return;
        }
        for (name, payload) in completion.events {
            let mut event = Event::new(completion.entity_id.clone(), name.into());
            event.payload = payload;
            if let Err(error) = self.enqueue(&completion.entity_id, LaneMessage::Deliver(event)) {
                debug!(entity_id = %completion.entity_id, error = %error, "lifecycle event not queued");
            }
        }
    }

    fn record(&self, event: &Event, action: Option<String>, outcome: DeliveryOutcome) {
        self.journal.lock().push(DeliveryRecord {
            at: Utc::now(),
            source: event.source.clone(),
            event: event.name.clone(),
            action,
            outcome,
        });
    }

    fn begin_pending(&self) {
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    fn finish_one(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

impl SharedState {
    fn execute_action(&self, action: EntityIndex, event: &Event) -> Execution {
        let mut tree = self.tree.write();
        let entity = tree.get(action);
        let action_id = entity.id.clone();
        let target = entity.target.clone();
        let has_bindings = !entity.bindings.is_empty();
        let handler = match &entity.handler {
            Handler::Action(handler) => Some(Arc::clone(handler)),
            _ => None,
        };
        let attributes = interpolate_attributes(&entity.attributes, &self.registry, &Scope::new(&tree, Some(event)));

        tree.get_mut(action).state = LifecycleState::Running;
        let result = match handler {
            // Untyped actions only relay their own lifecycle events.
            None => Ok(ActionEffect::Completed),
            Some(handler) => {
                let mut invocation = ActionInvocation {
                    action_id: action_id.clone(),
                    target,
                    attributes,
                    event,
                    tree: &mut *tree,
                    collaborators: &self.collaborators,
                };
                handler.execute(&mut invocation)
            }
        };
        tree.get_mut(action).state = if result.is_ok() {
            LifecycleState::Finished
        } else {
            LifecycleState::Failed
        };

        Execution {
            action_id,
            has_bindings,
            result,
        }
    }

    fn prepare_load(&self, provider: EntityIndex) -> Result<PreparedLoad, LoadRefusal> {
        let mut tree = self.tree.write();
        let entity = tree.get(provider);
        let Some(handler) = entity.data_provider().cloned() else {
            return Err(LoadRefusal::NotADataProvider(entity.id.clone()));
        };
        if entity.suppressed {
            return Err(LoadRefusal::Suppressed(entity.id.clone()));
        }
        if entity.state == LifecycleState::Running {
            return Err(LoadRefusal::InProgress(entity.id.clone()));
        }
        let attributes = interpolate_attributes(&entity.attributes, &self.registry, &Scope::new(&tree, None));
        let request = handler.request(&Blueprint {
            id: &entity.id,
            type_name: entity.type_str(),
            attributes: &attributes,
        });
        let provider_id = entity.id.clone();
        tree.get_mut(provider).state = LifecycleState::Running;
        Ok(PreparedLoad {
            provider_id,
            handler,
            request,
        })
    }

    fn complete_load(&self, provider: EntityIndex, result: Result<Value, TransportError>) -> Completion {
        let mut tree = self.tree.write();
        let entity = tree.get_mut(provider);
        let (outcome, events) = match result {
            Ok(payload) => {
                let payload = match entity.data_provider() {
                    Some(handler) => handler.transform(payload, &entity.attributes),
                    None => payload,
                };
                entity.payload = Some(payload.clone());
                debug!(provider_id = %entity.id, "data provider load finished");
                let events = lifecycle_events(LifecycleEvent::Success)
                    .into_iter()
                    .map(|event| (event, Some(payload.clone())))
                    .collect();
                (LifecycleEvent::Success, events)
            }
            Err(TransportError::Failed { message, payload }) => {
                warn!(provider_id = %entity.id, error = %message, "data provider load failed");
                let detail = json!({ "message": message, "payload": payload });
                (LifecycleEvent::Failed, vec![(LifecycleEvent::Failed, Some(detail))])
            }
            Err(TransportError::Error { message }) => {
                warn!(provider_id = %entity.id, error = %message, "data provider load errored");
                (LifecycleEvent::Error, vec![(LifecycleEvent::Error, Some(json!({ "message": message })))])
            }
        };
        match entity.state.complete(outcome) {
            Ok(state) => entity.state = state,
            Err(error) => warn!(provider_id = %entity.id, error = %error, "unexpected lifecycle transition"),
        }
        Completion {
            entity_id: entity.id.clone(),
            has_bindings: !entity.bindings.is_empty(),
            events,
        }
    }
}

/// Lifecycle events raised for a completion: `Success` is followed by `Finished`.
fn lifecycle_events(outcome: LifecycleEvent) -> Vec<LifecycleEvent> {
    match outcome {
        LifecycleEvent::Success => vec![LifecycleEvent::Success, LifecycleEvent::Finished],
        other => vec![other],
    }
}

fn plan_deliveries(tree: &SessionTree, evaluator: &dyn PredicateEvaluator, event: &Event, only: Option<EntityIndex>) -> Option<Plan> {
    let source = tree.find(&event.source)?;
    let source_entity = tree.get(source);
    let scope = Scope::new(tree, Some(event));
    let dropped = if source_entity.suppressed {
        Some(SkipReason::SourceSuppressed)
    } else if source_entity.role == EntityRole::Control {
        match evaluate_gate(source_entity.enabled.as_ref(), evaluator, &scope) {
            Ok(true) => None,
            Ok(false) => Some(SkipReason::SourceDisabled),
            Err(error) => Some(SkipReason::PredicateError(error.to_string())),
        }
    } else {
        None
    };
    if dropped.is_some() {
        return Some(Plan { dropped, steps: Vec::new() });
    }

    let repeatable = source_entity.supports_repetition();
    let steps = tree
        .bindings_for(source, &event.name)
        .into_iter()
        .filter(|action| only.is_none_or(|only| only == *action))
        .map(|action| {
            let entity = tree.get(action);
            let action_id = entity.id.clone();
            let gate = evaluate_gate(entity.enabled.as_ref(), evaluator, &scope).and_then(|enabled| {
                if !enabled {
                    return Ok(Some(SkipReason::Disabled));
                }
                evaluate_gate(entity.condition.as_ref(), evaluator, &scope).map(|passed| (!passed).then_some(SkipReason::ConditionFalse))
            });
            match gate {
                Ok(None) => Step::Run {
                    action,
                    action_id,
                    delay: entity.timing.delay,
                    repeat: entity.timing.repeat_delay.filter(|_| repeatable),
                },
                Ok(Some(reason)) => Step::Skip { action_id, reason },
                Err(error) => {
                    warn!(action_id = %action_id, error = %error, "gate could not be evaluated; treating as false");
                    Step::Skip {
                        action_id,
                        reason: SkipReason::PredicateError(error.to_string()),
                    }
                }
            }
        })
        .collect();

    Some(Plan { dropped: None, steps })
}
