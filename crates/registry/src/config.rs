use indexmap::IndexMap;
use ignite_types::Category;
use serde::{Deserialize, Serialize};

/// What happens when a (category, type) pair is registered twice.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationPolicy {
    /// The later registration replaces the earlier one (last wins). Replacements are logged.
    #[default]
    Overwrite,
    /// A second registration fails with `DuplicateRegistration`.
    Strict,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub policy: RegistrationPolicy,
    /// Class name format overrides keyed by category. Missing categories use the defaults.
    #[serde(default)]
    pub class_name_formats: IndexMap<Category, String>,
}
