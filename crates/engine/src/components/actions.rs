//! Built-in actions and the invocation context every action receives.

use std::sync::Arc;

use ignite_types::{AlertRequest, Attributes, Event, FunctionCall, symbols, value_to_text};
use serde_json::Value;

use super::{Action, ActionFactory, Blueprint, ComponentError};
use crate::collaborators::Collaborators;
use crate::tree::{EntityIndex, EntityRole, SessionTree};

/// Attribute naming the function a `function` action calls.
pub const FUNCTION_NAME: &str = "function_name";
/// Attribute naming the store key a `set` action writes when targeting `app` or `session`.
pub const KEY: &str = "key";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("action has no target")]
    MissingTarget,
    #[error("target '{0}' does not resolve to an entity")]
    UnresolvedTarget(String),
    #[error("target '{target}' is not a {expected}")]
    WrongTargetKind { target: String, expected: &'static str },
    #[error("control '{target}' does not support function '{function}'")]
    UnsupportedFunction { target: String, function: String },
    #[error("missing required attribute '{0}'")]
    MissingAttribute(&'static str),
    #[error("{0}")]
    Collaborator(String),
}

/// What the dispatcher should do after an action returns successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEffect {
    Completed,
    /// Start a load of the given data provider.
    Load(EntityIndex),
}

/// Resolved `target` of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRef {
    App,
    Session,
    Entity(EntityIndex),
}

/// Everything an action sees while it runs. Always constructed on the control thread.
pub struct ActionInvocation<'a> {
    pub action_id: String,
    pub target: Option<String>,
    /// The action's attributes with shortcodes already expanded.
    pub attributes: Attributes,
    pub event: &'a Event,
    pub tree: &'a mut SessionTree,
    pub collaborators: &'a Collaborators,
}

impl ActionInvocation<'_> {
    /// Resolves the declared target. `app` and `session` name the document-level stores.
    pub fn resolve_target(&self) -> Result<TargetRef, ActionError> {
        let target = self.target.as_deref().map(str::trim).filter(|target| !target.is_empty());
        let Some(target) = target else {
            return Err(ActionError::MissingTarget);
        };
        match target {
            symbols::APP => Ok(TargetRef::App),
            symbols::SESSION => Ok(TargetRef::Session),
            id => self
                .tree
                .find(id)
                .map(TargetRef::Entity)
                .ok_or_else(|| ActionError::UnresolvedTarget(id.to_string())),
        }
    }

    fn target_name(&self) -> String {
        self.target.clone().unwrap_or_default()
    }

    fn text(&self, key: &str) -> Option<String> {
        self.attributes.get(key).and_then(value_to_text)
    }

    /// Pushes the entity's current state to the renderer.
    fn notify_update(&self, index: EntityIndex, animated: bool) {
        if self.tree.get(index).role == EntityRole::Control {
            self.collaborators.renderer.update(&self.tree.snapshot(index), animated);
        }
    }
}

/// Presents an alert built from `title`, `sub_title`, `ok` and `cancel`.
#[derive(Debug)]
pub struct AlertAction;

impl Action for AlertAction {
    fn execute(&self, invocation: &mut ActionInvocation<'_>) -> Result<ActionEffect, ActionError> {
        let alert = AlertRequest {
            source: invocation.action_id.clone(),
            title: invocation.text(symbols::TITLE),
            sub_title: invocation.text(symbols::SUB_TITLE),
            ok: invocation.text(symbols::OK),
            cancel: invocation.text(symbols::CANCEL),
        };
        invocation.collaborators.presenter.present_alert(&alert);
        Ok(ActionEffect::Completed)
    }
}

/// Merges the action's attributes into the target. `animated` is a rendering hint and is not merged.
#[derive(Debug)]
pub struct ModifyAction;

impl Action for ModifyAction {
    fn execute(&self, invocation: &mut ActionInvocation<'_>) -> Result<ActionEffect, ActionError> {
        let target = invocation.resolve_target()?;
        let mut changes = invocation.attributes.clone();
        let animated = changes
            .shift_remove(symbols::ANIMATED)
            .is_some_and(|value| matches!(value, Value::Bool(true)) || value.as_str().and_then(symbols::parse_bool_literal) == Some(true));

        match target {
            TargetRef::App => invocation.tree.app_mut().extend(changes),
            TargetRef::Session => invocation.tree.session_mut().extend(changes),
            TargetRef::Entity(index) => {
                let entity = invocation.tree.get_mut(index);
                entity.attributes.extend(changes);
                if let Some(control) = entity.control().cloned() {
                    control.configure(&mut entity.attributes);
                }
                invocation.notify_update(index, animated);
            }
        }
        Ok(ActionEffect::Completed)
    }
}

/// Writes `value` into the target: the `value` attribute of an entity, or `key` of a store.
#[derive(Debug)]
pub struct SetAction;

impl Action for SetAction {
    fn execute(&self, invocation: &mut ActionInvocation<'_>) -> Result<ActionEffect, ActionError> {
        let target = invocation.resolve_target()?;
        let value = invocation
            .attributes
            .get(symbols::VALUE)
            .cloned()
            .ok_or(ActionError::MissingAttribute(symbols::VALUE))?;

        match target {
            TargetRef::App | TargetRef::Session => {
                let key = invocation.text(KEY).ok_or(ActionError::MissingAttribute(KEY))?;
                let store = if target == TargetRef::App {
                    invocation.tree.app_mut()
                } else {
                    invocation.tree.session_mut()
                };
                store.insert(key, value);
            }
            TargetRef::Entity(index) => {
                let entity = invocation.tree.get_mut(index);
                entity.attributes.insert(symbols::VALUE.to_string(), value);
                if let Some(control) = entity.control().cloned() {
                    control.configure(&mut entity.attributes);
                }
                invocation.notify_update(index, false);
            }
        }
        Ok(ActionEffect::Completed)
    }
}

/// Reloads a data provider target or asks the renderer to redraw a control target.
#[derive(Debug)]
pub struct RefreshAction;

impl Action for RefreshAction {
    fn execute(&self, invocation: &mut ActionInvocation<'_>) -> Result<ActionEffect, ActionError> {
        match invocation.resolve_target()? {
            TargetRef::Entity(index) => match invocation.tree.get(index).role {
                EntityRole::DataProvider => Ok(ActionEffect::Load(index)),
                EntityRole::Control => {
                    invocation.collaborators.renderer.refresh(&invocation.tree.get(index).id);
                    Ok(ActionEffect::Completed)
                }
                EntityRole::Action => Err(ActionError::WrongTargetKind {
                    target: invocation.target_name(),
                    expected: "control or data provider",
                }),
            },
            TargetRef::App | TargetRef::Session => Err(ActionError::WrongTargetKind {
                target: invocation.target_name(),
                expected: "control or data provider",
            }),
        }
    }
}

/// Starts a load of the target data provider.
#[derive(Debug)]
pub struct LoadAction;

impl Action for LoadAction {
    fn execute(&self, invocation: &mut ActionInvocation<'_>) -> Result<ActionEffect, ActionError> {
        match invocation.resolve_target()? {
            TargetRef::Entity(index) if invocation.tree.get(index).data_provider().is_some() => Ok(ActionEffect::Load(index)),
            _ => Err(ActionError::WrongTargetKind {
                target: invocation.target_name(),
                expected: "data provider",
            }),
        }
    }
}

/// Calls a named function on the target control through the renderer.
#[derive(Debug)]
pub struct FunctionAction;

impl Action for FunctionAction {
    fn execute(&self, invocation: &mut ActionInvocation<'_>) -> Result<ActionEffect, ActionError> {
        let TargetRef::Entity(index) = invocation.resolve_target()? else {
            return Err(ActionError::WrongTargetKind {
                target: invocation.target_name(),
                expected: "control",
            });
        };
        let function_name = invocation.text(FUNCTION_NAME).ok_or(ActionError::MissingAttribute(FUNCTION_NAME))?;
        let entity = invocation.tree.get(index);
        let Some(control) = entity.control() else {
            return Err(ActionError::WrongTargetKind {
                target: invocation.target_name(),
                expected: "control",
            });
        };
        if !control.functions().contains(&function_name.as_str()) {
            return Err(ActionError::UnsupportedFunction {
                target: entity.id.clone(),
                function: function_name,
            });
        }

        let mut parameters = invocation.attributes.clone();
        parameters.shift_remove(FUNCTION_NAME);
        let call = FunctionCall {
            target: entity.id.clone(),
            function_name,
            parameters,
        };
        invocation
            .collaborators
            .renderer
            .invoke_function(&call)
            .map_err(ActionError::Collaborator)?;
        Ok(ActionEffect::Completed)
    }
}

fn stateless<A: Action + 'static>(action: fn() -> A) -> ActionFactory {
    Arc::new(move |_: &Blueprint<'_>| -> Result<Arc<dyn Action>, ComponentError> { Ok(Arc::new(action())) })
}

/// Built-in action types in registration order.
pub fn builtins() -> Vec<(&'static str, ActionFactory)> {
    vec![
        (symbols::ALERT, stateless(|| AlertAction)),
        (symbols::MODIFY, stateless(|| ModifyAction)),
        (symbols::REFRESH, stateless(|| RefreshAction)),
        (symbols::LOAD, stateless(|| LoadAction)),
        (symbols::SET, stateless(|| SetAction)),
        (symbols::FUNCTION, stateless(|| FunctionAction)),
    ]
}
