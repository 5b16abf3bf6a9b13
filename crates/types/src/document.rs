//! Declarative document loading.
//!
//! Documents are JSON or YAML trees. The engine walks them as [`serde_json::Value`]s so that a
//! malformed node only fails its own construction instead of the whole parse. Key order is
//! preserved because `on` bindings and child lists are delivered in declaration order.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value};

use crate::symbols;

/// Ordered attribute mapping of a node, action or data provider.
pub type Attributes = IndexMap<String, Value>;

/// Errors raised while parsing a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("document root must be an object")]
    NotAnObject,
    #[error("'{key}' must be an object")]
    MalformedSection { key: &'static str },
}

/// Source format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Guesses the format from a file extension. Unknown extensions return `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// A parsed declarative document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: JsonMap<String, Value>,
}

impl Document {
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Object(root) => {
                for key in [symbols::APP, symbols::SESSION, symbols::STYLE] {
                    if let Some(section) = root.get(key)
                        && !section.is_object()
                    {
                        return Err(DocumentError::MalformedSection { key });
                    }
                }
                Ok(Self { root })
            }
            _ => Err(DocumentError::NotAnObject),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, DocumentError> {
        Self::from_value(serde_json::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, DocumentError> {
        Self::from_value(serde_yaml::from_str(content)?)
    }

    /// The root node: the `view` entry when present, otherwise the document itself.
    pub fn root_node(&self) -> &JsonMap<String, Value> {
        match self.root.get(symbols::VIEW) {
            Some(Value::Object(view)) => view,
            _ => &self.root,
        }
    }

    /// Seed values for the app-wide store.
    pub fn app_attributes(&self) -> Attributes {
        section_attributes(&self.root, symbols::APP)
    }

    /// Seed values for the session store.
    pub fn session_attributes(&self) -> Attributes {
        section_attributes(&self.root, symbols::SESSION)
    }

    /// Named style bundles. Non-object entries are ignored.
    pub fn styles(&self) -> IndexMap<String, Attributes> {
        let Some(Value::Object(styles)) = self.root.get(symbols::STYLE) else {
            return IndexMap::new();
        };
        styles
            .iter()
            .filter_map(|(name, value)| {
                value
                    .as_object()
                    .map(|attributes| (name.clone(), attributes.iter().map(|(k, v)| (k.clone(), v.clone())).collect()))
            })
            .collect()
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.root.clone())
    }
}

fn section_attributes(root: &JsonMap<String, Value>, key: &str) -> Attributes {
    match root.get(key) {
        Some(Value::Object(section)) => section.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        _ => Attributes::new(),
    }
}

/// Loads a document from the filesystem with format detection.
///
/// `.json` files are parsed as JSON and `.yaml`/`.yml` as YAML. Files with any other extension
/// are tried as JSON first and then as YAML.
pub fn parse_document_file(file_path: impl AsRef<Path>) -> Result<Document> {
    let file_path = file_path.as_ref();
    let content = fs::read_to_string(file_path).with_context(|| format!("Failed to read document file: {}", file_path.display()))?;

    let document = match DocumentFormat::from_path(file_path) {
        Some(DocumentFormat::Json) => Document::from_json_str(&content)?,
        Some(DocumentFormat::Yaml) => Document::from_yaml_str(&content)?,
        None => match Document::from_json_str(&content) {
            Ok(document) => document,
            Err(_) => Document::from_yaml_str(&content)
                .with_context(|| format!("Unsupported document format: {}", file_path.display()))?,
        },
    };
    Ok(document)
}
