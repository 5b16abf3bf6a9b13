use ignite_registry::RegistryError;
use ignite_types::{Category, InvalidTransition};
use thiserror::Error;

use crate::control_thread::ControlThreadError;
use crate::predicate::PredicateError;

/// Problems collected while turning a document into a session tree.
///
/// None of these abort the build: the offending entity is skipped (or kept and flagged) and the
/// rest of the document is constructed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("{path}: unknown {category} type '{type_name}'")]
    UnknownType {
        path: String,
        category: Category,
        type_name: String,
    },
    #[error("{path}: malformed declaration: {reason}")]
    MalformedNode { path: String, reason: String },
    #[error("{path}: id '{id}' is already in use; this entity is not addressable by it")]
    DuplicateId { path: String, id: String },
    #[error("{path}: failed to construct '{type_name}': {message}")]
    ComponentConstruction {
        path: String,
        type_name: String,
        message: String,
    },
    #[error("{path}: condition '{expression}' could not be evaluated: {error}")]
    PredicateEvaluation {
        path: String,
        expression: String,
        error: PredicateError,
    },
}

impl BuildError {
    pub(crate) fn from_registry(path: &str, error: RegistryError) -> Self {
        match error {
            RegistryError::UnknownType { category, type_name, .. } | RegistryError::InvalidTypeName { category, type_name } => {
                Self::UnknownType {
                    path: path.to_string(),
                    category,
                    type_name,
                }
            }
            other => Self::MalformedNode {
                path: path.to_string(),
                reason: other.to_string(),
            },
        }
    }

    /// Path of the offending declaration inside the document, e.g. `view/controls[2]/actions[0]`.
    pub fn path(&self) -> &str {
        match self {
            Self::UnknownType { path, .. }
            | Self::MalformedNode { path, .. }
            | Self::DuplicateId { path, .. }
            | Self::ComponentConstruction { path, .. }
            | Self::PredicateEvaluation { path, .. } => path,
        }
    }
}

/// Errors reported to whoever raises or completes an event.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("event '{name}' is not a lifecycle event and no entity binds it")]
    UnknownEvent { name: String },
    #[error("no entity with id '{id}'")]
    UnknownEntity { id: String },
    #[error("action '{action}' could not resolve target '{target}'")]
    UnresolvedTarget { action: String, target: String },
    #[error("entity '{id}' is not a data provider")]
    NotADataProvider { id: String },
    #[error("entity '{id}': {source}")]
    InvalidTransition {
        id: String,
        #[source]
        source: InvalidTransition,
    },
    #[error("session is closed")]
    SessionClosed,
    #[error(transparent)]
    ControlThread(#[from] ControlThreadError),
}

/// Errors raised while opening a session.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("a tokio runtime is required to open a session")]
    NoRuntime,
    #[error("failed to start the control thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error(transparent)]
    ControlThread(#[from] ControlThreadError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
