//! External collaborators: the renderer that draws controls, the transport that services data
//! provider loads and the presenter that shows alerts.

use std::sync::Arc;

use async_trait::async_trait;
use ignite_types::{AlertRequest, DataProviderRequest, FunctionCall};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use crate::snapshot::EntitySnapshot;

/// Receives tree snapshots and control-level commands.
pub trait Renderer: Send + Sync {
    /// Called once with the root after a session is built.
    fn render(&self, _root: &EntitySnapshot) {}

    /// A node's attributes changed.
    fn update(&self, _node: &EntitySnapshot, _animated: bool) {}

    /// A node asked to be redrawn.
    fn refresh(&self, _node_id: &str) {}

    /// Invokes a control function. Errors fail the originating action.
    fn invoke_function(&self, _call: &FunctionCall) -> Result<(), String> {
        Ok(())
    }
}

/// Loads data for data providers.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn load(&self, request: DataProviderRequest) -> Result<Value, TransportError>;
}

/// Presents alerts raised by the `alert` action.
pub trait Presenter: Send + Sync {
    fn present_alert(&self, alert: &AlertRequest);
}

/// Outcome of an unsuccessful load. `Failed` raises the provider's `failed` event, `Error` its
/// `error` event.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    /// The request completed but was rejected, e.g. an HTTP 4xx/5xx.
    #[error("load failed: {message}")]
    Failed { message: String, payload: Option<Value> },
    /// The request could not be completed at all.
    #[error("load error: {message}")]
    Error { message: String },
}

impl TransportError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            payload: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Failed { message, .. } | Self::Error { message } => message,
        }
    }
}

/// The collaborators a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub renderer: Arc<dyn Renderer>,
    pub transport: Arc<dyn Transport>,
    pub presenter: Arc<dyn Presenter>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            renderer: Arc::new(NullRenderer),
            transport: Arc::new(OfflineTransport),
            presenter: Arc::new(NullPresenter),
        }
    }
}

impl Collaborators {
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = presenter;
        self
    }
}

pub struct NullRenderer;

impl Renderer for NullRenderer {}

pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present_alert(&self, alert: &AlertRequest) {
        debug!(source = %alert.source, "alert dropped; no presenter configured");
    }
}

/// Transport used when none is configured. Every load ends in `error`.
pub struct OfflineTransport;

#[async_trait]
impl Transport for OfflineTransport {
    async fn load(&self, request: DataProviderRequest) -> Result<Value, TransportError> {
        Err(TransportError::error(format!("no transport configured for '{}'", request.provider_id)))
    }
}

/// Everything a [`RecordingCollaborator`] observed, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Render(String),
    Update { id: String, animated: bool },
    Refresh(String),
    Function(FunctionCall),
    Alert(AlertRequest),
}

/// Renderer and presenter that records every call, for embedding hosts and tests.
#[derive(Debug, Default)]
pub struct RecordingCollaborator {
    observations: Mutex<Vec<Observation>>,
}

impl RecordingCollaborator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn observations(&self) -> Vec<Observation> {
        self.observations.lock().clone()
    }

    pub fn alerts(&self) -> Vec<AlertRequest> {
        self.observations
            .lock()
            .iter()
            .filter_map(|observation| match observation {
                Observation::Alert(alert) => Some(alert.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, observation: Observation) {
        self.observations.lock().push(observation);
    }
}

impl Renderer for RecordingCollaborator {
    fn render(&self, root: &EntitySnapshot) {
        self.record(Observation::Render(root.id.clone()));
    }

    fn update(&self, node: &EntitySnapshot, animated: bool) {
        self.record(Observation::Update {
            id: node.id.clone(),
            animated,
        });
    }

    fn refresh(&self, node_id: &str) {
        self.record(Observation::Refresh(node_id.to_string()));
    }

    fn invoke_function(&self, call: &FunctionCall) -> Result<(), String> {
        self.record(Observation::Function(call.clone()));
        Ok(())
    }
}

impl Presenter for RecordingCollaborator {
    fn present_alert(&self, alert: &AlertRequest) {
        self.record(Observation::Alert(alert.clone()));
    }
}
