//! Component contracts and the built-in component set.
//!
//! Every declared `type` resolves through the registry to a factory producing one of four
//! handler kinds: a [`Control`] (renderable node), a [`DataProvider`] (loads data through the
//! transport), an [`Action`] (runs when a bound event fires) or a [`Shortcode`] (inline value
//! substitution). Handlers are stateless; per-entity state lives in the session tree.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use ignite_types::{Attributes, DataProviderRequest, symbols, value_to_text};
use indexmap::IndexMap;
use serde_json::Value;

use crate::collaborators::{Transport, TransportError};
use crate::scope::Scope;

pub mod actions;
pub mod controls;
pub mod data_providers;
pub mod shortcodes;

pub use actions::{ActionEffect, ActionError, ActionInvocation, TargetRef};

/// Construction input handed to a factory.
#[derive(Debug, Clone, Copy)]
pub struct Blueprint<'a> {
    pub id: &'a str,
    pub type_name: &'a str,
    pub attributes: &'a Attributes,
}

/// A factory refused to construct a component.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ComponentError(pub String);

pub type ControlFactory = Arc<dyn Fn(&Blueprint<'_>) -> Result<Arc<dyn Control>, ComponentError> + Send + Sync>;
pub type DataProviderFactory = Arc<dyn Fn(&Blueprint<'_>) -> Result<Arc<dyn DataProvider>, ComponentError> + Send + Sync>;
pub type ActionFactory = Arc<dyn Fn(&Blueprint<'_>) -> Result<Arc<dyn Action>, ComponentError> + Send + Sync>;
pub type ShortcodeFactory = Arc<dyn Fn() -> Arc<dyn Shortcode> + Send + Sync>;

/// A renderable node.
pub trait Control: Send + Sync + fmt::Debug {
    /// Normalizes attributes after construction and after every modification.
    fn configure(&self, _attributes: &mut Attributes) {}

    /// Named functions the `function` action may invoke on this control.
    fn functions(&self) -> &[&'static str] {
        &[]
    }

    /// Whether actions bound to this control's events may repeat.
    fn supports_repetition(&self) -> bool {
        false
    }
}

/// Loads data through the transport.
#[async_trait]
pub trait DataProvider: Send + Sync + fmt::Debug {
    /// Whether actions bound to this provider's events may repeat.
    fn supports_repetition(&self) -> bool {
        true
    }

    /// Builds the transport request from the provider's current attributes.
    fn request(&self, blueprint: &Blueprint<'_>) -> DataProviderRequest {
        default_request(blueprint)
    }

    /// Performs the load. The default hands the request to the transport.
    async fn load(&self, request: DataProviderRequest, transport: Arc<dyn Transport>) -> Result<Value, TransportError> {
        transport.load(request).await
    }

    /// Shapes a successful payload before it is stored on the provider.
    fn transform(&self, payload: Value, _attributes: &Attributes) -> Value {
        payload
    }
}

/// Runs when a bound event fires.
pub trait Action: Send + Sync + fmt::Debug {
    fn execute(&self, invocation: &mut ActionInvocation<'_>) -> Result<ActionEffect, ActionError>;
}

/// Resolves `[[type:argument]]` placeholders.
pub trait Shortcode: Send + Sync + fmt::Debug {
    /// Returns `None` when the argument does not resolve; the placeholder then renders empty.
    fn evaluate(&self, argument: Option<&str>, scope: &Scope<'_>) -> Option<Value>;
}

/// Splits provider attributes into the request's parameters, headers, attachments and entity.
pub fn default_request(blueprint: &Blueprint<'_>) -> DataProviderRequest {
    let mut attributes = blueprint.attributes.clone();
    let parameters = take_object(&mut attributes, symbols::DP_PARAMETERS);
    let attachments = take_object(&mut attributes, symbols::DP_ATTACHMENTS);
    let headers = take_object(&mut attributes, symbols::DP_HEADERS)
        .into_iter()
        .filter_map(|(name, value)| value_to_text(&value).map(|text| (name, text)))
        .collect::<IndexMap<_, _>>();
    let entity = attributes
        .shift_remove(symbols::DP_ENTITY)
        .as_ref()
        .and_then(value_to_text);

    DataProviderRequest {
        provider_id: blueprint.id.to_string(),
        provider_type: blueprint.type_name.to_string(),
        entity,
        parameters,
        headers,
        attachments,
        attributes,
    }
}

fn take_object(attributes: &mut Attributes, key: &str) -> Attributes {
    match attributes.shift_remove(key) {
        Some(Value::Object(map)) => map.into_iter().collect(),
        _ => Attributes::new(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn default_request_splits_provider_keys() {
        let attributes: Attributes = serde_json::from_value(json!({
            "url": "https://api.example.com/items",
            "entity": "items",
            "parameters": { "page": 2 },
            "headers": { "Accept": "application/json", "X-Retry": 3 },
            "attachments": { "avatar": "file:///tmp/a.png" }
        }))
        .unwrap();
        let request = default_request(&Blueprint {
            id: "items",
            type_name: "json",
            attributes: &attributes,
        });

        assert_eq!(request.provider_id, "items");
        assert_eq!(request.entity.as_deref(), Some("items"));
        assert_eq!(request.parameters.get("page"), Some(&json!(2)));
        assert_eq!(request.headers.get("X-Retry").map(String::as_str), Some("3"));
        assert_eq!(request.attachments.len(), 1);
        assert_eq!(request.attributes.keys().collect::<Vec<_>>(), vec!["url"]);
    }
}
