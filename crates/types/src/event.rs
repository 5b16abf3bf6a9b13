//! Event vocabulary and the per-entity lifecycle state machine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::symbols;

/// Built-in lifecycle events raised by data providers and actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Error,
    Failed,
    Finished,
    Success,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 4] = [Self::Error, Self::Failed, Self::Finished, Self::Success];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => symbols::ERROR,
            Self::Failed => symbols::FAILED,
            Self::Finished => symbols::FINISHED,
            Self::Success => symbols::SUCCESS,
        }
    }
}

/// Normalized event name. Names are lowercase and limited to `[a-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(String);

impl EventName {
    /// Parses and normalizes an event name. Returns `None` for empty or malformed names.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return None;
        }
        let valid = normalized
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || character == '_' || character == '-');
        valid.then_some(Self(normalized))
    }

    /// Name under which load requests appear in the session journal.
    pub fn load() -> Self {
        Self(symbols::LOAD.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the lifecycle event this name denotes, if any.
    pub fn lifecycle(&self) -> Option<LifecycleEvent> {
        LifecycleEvent::ALL.into_iter().find(|event| event.as_str() == self.0)
    }
}

impl From<LifecycleEvent> for EventName {
    fn from(event: LifecycleEvent) -> Self {
        Self(event.as_str().to_string())
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An event raised by an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event name.
    pub name: EventName,
    /// Identifier of the entity that raised the event.
    pub source: String,
    /// Optional payload, e.g. a data provider response or an error description.
    #[serde(default)]
    pub payload: Option<Value>,
    /// Wall clock time the event was raised.
    pub emitted_at: DateTime<Utc>,
}

impl Event {
    pub fn new(source: impl Into<String>, name: EventName) -> Self {
        Self {
            name,
            source: source.into(),
            payload: None,
            emitted_at: Utc::now(),
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Lifecycle state tracked per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    #[default]
    Idle,
    Running,
    Finished,
    Failed,
    Error,
}

/// Rejected lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid lifecycle transition from {from:?} on {event}")]
pub struct InvalidTransition {
    pub from: LifecycleState,
    pub event: &'static str,
}

impl LifecycleState {
    /// `Idle | Finished | Failed | Error -> Running`. An entity already running cannot begin again.
    pub fn begin(self) -> Result<Self, InvalidTransition> {
        match self {
            Self::Running => Err(InvalidTransition {
                from: self,
                event: "begin",
            }),
            _ => Ok(Self::Running),
        }
    }

    /// `Running -> Finished | Failed | Error`. `Success` settles into `Finished`.
    pub fn complete(self, outcome: LifecycleEvent) -> Result<Self, InvalidTransition> {
        if self != Self::Running {
            return Err(InvalidTransition {
                from: self,
                event: outcome.as_str(),
            });
        }
        Ok(match outcome {
            LifecycleEvent::Finished | LifecycleEvent::Success => Self::Finished,
            LifecycleEvent::Failed => Self::Failed,
            LifecycleEvent::Error => Self::Error,
        })
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_are_normalized() {
        let name = EventName::parse(" Finished ").expect("valid name");
        assert_eq!(name.as_str(), "finished");
        assert_eq!(name.lifecycle(), Some(LifecycleEvent::Finished));
        assert_eq!(EventName::parse("touch").and_then(|name| name.lifecycle()), None);
        assert!(EventName::parse("").is_none());
        assert!(EventName::parse("on touch").is_none());
    }

    #[test]
    fn lifecycle_transitions() {
        let running = LifecycleState::Idle.begin().expect("idle can begin");
        assert!(running.begin().is_err());
        assert_eq!(running.complete(LifecycleEvent::Success), Ok(LifecycleState::Finished));
        assert_eq!(running.complete(LifecycleEvent::Error), Ok(LifecycleState::Error));
        assert!(LifecycleState::Idle.complete(LifecycleEvent::Finished).is_err());
        assert_eq!(LifecycleState::Failed.begin(), Ok(LifecycleState::Running));
    }
}
