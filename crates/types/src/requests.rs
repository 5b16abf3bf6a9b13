//! Payloads handed to the external collaborators (transport, presenter, renderer).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Attributes;

/// Everything a transport needs to service a data provider load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataProviderRequest {
    /// Identifier of the data provider within its session.
    pub provider_id: String,
    /// Declared provider type, e.g. `json`.
    pub provider_type: String,
    /// Entity name the provider reads or writes.
    #[serde(default)]
    pub entity: Option<String>,
    /// Query or body parameters.
    #[serde(default)]
    pub parameters: Attributes,
    /// Request headers rendered as strings.
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    /// Named attachments (file references or inline values).
    #[serde(default)]
    pub attachments: Attributes,
    /// Remaining provider attributes such as a URL or HTTP method.
    #[serde(default)]
    pub attributes: Attributes,
}

/// Alert presented by the `alert` action.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlertRequest {
    /// Identifier of the alert action.
    pub source: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sub_title: Option<String>,
    /// Label of the confirming button.
    #[serde(default)]
    pub ok: Option<String>,
    /// Label of the dismissing button; no cancel button when absent.
    #[serde(default)]
    pub cancel: Option<String>,
}

/// Function invocation forwarded to the renderer by the `function` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub target: String,
    pub function_name: String,
    #[serde(default)]
    pub parameters: Attributes,
}

/// Converts a JSON scalar into the string form used for headers and alert labels.
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
