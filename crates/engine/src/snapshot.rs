use ignite_types::{Attributes, LifecycleState};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tree::{EntityIndex, EntityRole, SessionTree};

/// Serializable view of an entity and everything hanging off it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub id: String,
    pub role: EntityRole,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    pub class_name: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, skip_serializing_if = "is_false")]
    pub suppressed: bool,
    #[serde(default)]
    pub state: LifecycleState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_providers: Vec<EntitySnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bindings: Vec<BindingSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<EntitySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingSnapshot {
    pub event: String,
    pub action: EntitySnapshot,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl SessionTree {
    /// Snapshot of `index` and its subtree.
    pub fn snapshot(&self, index: EntityIndex) -> EntitySnapshot {
        let entity = self.get(index);
        EntitySnapshot {
            id: entity.id.clone(),
            role: entity.role,
            type_name: entity.type_name.clone(),
            class_name: entity.class_name.clone(),
            attributes: entity.attributes.clone(),
            suppressed: entity.suppressed,
            state: entity.state,
            target: entity.target.clone(),
            payload: entity.payload.clone(),
            data_providers: entity.data_providers.iter().map(|provider| self.snapshot(*provider)).collect(),
            bindings: entity
                .bindings
                .iter()
                .map(|binding| BindingSnapshot {
                    event: binding.event.to_string(),
                    action: self.snapshot(binding.action),
                })
                .collect(),
            controls: entity.controls.iter().map(|child| self.snapshot(*child)).collect(),
        }
    }

    /// Snapshot of the whole tree, `None` when the document produced no root.
    pub fn root_snapshot(&self) -> Option<EntitySnapshot> {
        self.root().map(|root| self.snapshot(root))
    }
}
