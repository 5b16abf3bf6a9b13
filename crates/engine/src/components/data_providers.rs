//! Built-in data providers.

use std::sync::Arc;

use async_trait::async_trait;
use ignite_types::{Attributes, DataProviderRequest, symbols};
use serde_json::Value;

use super::{Blueprint, ComponentError, DataProvider, DataProviderFactory};
use crate::collaborators::{Transport, TransportError};
use crate::scope::value_at_path;

/// Attribute selecting the part of a JSON response stored as the payload, e.g. `data.items`.
pub const DATA_PATH: &str = "data_path";

/// Loads through the transport and optionally narrows the response to `data_path`.
#[derive(Debug)]
pub struct JsonDataProvider;

#[async_trait]
impl DataProvider for JsonDataProvider {
    fn transform(&self, payload: Value, attributes: &Attributes) -> Value {
        let Some(path) = attributes.get(DATA_PATH).and_then(Value::as_str) else {
            return payload;
        };
        let segments = symbols::split_path(path);
        value_at_path(&payload, &segments).cloned().unwrap_or(Value::Null)
    }
}

/// Serves its own `value` attribute without touching the transport.
#[derive(Debug)]
pub struct StaticDataProvider;

#[async_trait]
impl DataProvider for StaticDataProvider {
    fn supports_repetition(&self) -> bool {
        false
    }

    async fn load(&self, request: DataProviderRequest, _transport: Arc<dyn Transport>) -> Result<Value, TransportError> {
        request
            .attributes
            .get(symbols::VALUE)
            .cloned()
            .ok_or_else(|| TransportError::failed(format!("static provider '{}' has no value", request.provider_id)))
    }
}

fn stateless<P: DataProvider + 'static>(provider: fn() -> P) -> DataProviderFactory {
    Arc::new(move |_: &Blueprint<'_>| -> Result<Arc<dyn DataProvider>, ComponentError> { Ok(Arc::new(provider())) })
}

pub fn builtins() -> Vec<(&'static str, DataProviderFactory)> {
    vec![("json", stateless(|| JsonDataProvider)), ("static", stateless(|| StaticDataProvider))]
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::collaborators::OfflineTransport;
    use crate::components::default_request;

    #[test]
    fn json_provider_narrows_to_data_path() {
        let attributes: Attributes = serde_json::from_value(json!({ "data_path": "data.items" })).unwrap();
        let payload = json!({ "data": { "items": [1, 2] } });
        assert_eq!(JsonDataProvider.transform(payload.clone(), &attributes), json!([1, 2]));
        assert_eq!(JsonDataProvider.transform(payload.clone(), &Attributes::new()), payload);
    }

    #[tokio::test]
    async fn static_provider_serves_its_value() {
        let attributes: Attributes = serde_json::from_value(json!({ "value": { "greeting": "hi" } })).unwrap();
        let request = default_request(&Blueprint {
            id: "greeting",
            type_name: "static",
            attributes: &attributes,
        });
        let payload = StaticDataProvider.load(request, Arc::new(OfflineTransport)).await;
        assert_eq!(payload, Ok(json!({ "greeting": "hi" })));
    }
}
