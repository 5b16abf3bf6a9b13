use std::collections::HashMap;

use ignite_types::Category;
use indexmap::{IndexMap, map::Entry};
use tracing::{debug, warn};

use crate::{ClassNameFormat, RegistrationPolicy, RegistryConfig};

/// Errors raised by the type registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown {category} type '{type_name}' (class {class_name} is not registered)")]
    UnknownType {
        category: Category,
        type_name: String,
        class_name: String,
    },
    #[error("{category} class {class_name} is already registered")]
    DuplicateRegistration { category: Category, class_name: String },
    #[error("'{type_name}' is not a valid {category} type name")]
    InvalidTypeName { category: Category, type_name: String },
    #[error("class name format '{format}' for {category} must contain exactly one '{{}}' placeholder")]
    InvalidFormat { category: Category, format: String },
}

/// Key under which a factory is stored: the category and the formatted class name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryKey {
    pub category: Category,
    pub class_name: String,
}

#[derive(Debug, Clone)]
struct Registration<F> {
    type_name: String,
    factory: F,
}

/// Result of a successful registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Inserted,
    /// An earlier factory for the same pair was replaced (overwrite policy only).
    Replaced,
}

/// Listing entry returned by [`TypeRegistry::registered_types`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredType {
    pub category: Category,
    pub type_name: String,
    pub class_name: String,
}

/// Maps (category, declared type name) pairs to factories.
///
/// Lookups never special-case individual names: every type name goes through the category's
/// [`ClassNameFormat`], and the formatted class name is the storage key. The registry is generic
/// over the factory type so callers decide what a factory produces.
#[derive(Debug, Clone)]
pub struct TypeRegistry<F> {
    formats: HashMap<Category, ClassNameFormat>,
    entries: IndexMap<RegistryKey, Registration<F>>,
    policy: RegistrationPolicy,
}

impl<F> Default for TypeRegistry<F> {
    fn default() -> Self {
        Self::new(RegistrationPolicy::default())
    }
}

impl<F> TypeRegistry<F> {
    /// Creates an empty registry that uses the default class name formats.
    pub fn new(policy: RegistrationPolicy) -> Self {
        let formats = Category::ALL
            .into_iter()
            .filter_map(|category| ClassNameFormat::parse(category.default_class_name_format()).map(|format| (category, format)))
            .collect();
        Self {
            formats,
            entries: IndexMap::new(),
            policy,
        }
    }

    /// Creates an empty registry honoring the configured policy and format overrides.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new(config.policy);
        for (category, raw_format) in &config.class_name_formats {
            let format = ClassNameFormat::parse(raw_format).ok_or_else(|| RegistryError::InvalidFormat {
                category: *category,
                format: raw_format.clone(),
            })?;
            registry.formats.insert(*category, format);
        }
        Ok(registry)
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    /// Format pattern currently applied to `category`.
    pub fn format_for(&self, category: Category) -> Option<String> {
        self.formats.get(&category).map(ClassNameFormat::pattern)
    }

    /// Class name `type_name` resolves to within `category`.
    pub fn class_name_for(&self, category: Category, type_name: &str) -> Result<String, RegistryError> {
        self.formats
            .get(&category)
            .and_then(|format| format.apply(type_name))
            .ok_or_else(|| RegistryError::InvalidTypeName {
                category,
                type_name: type_name.to_string(),
            })
    }

    /// Registers `factory` for `type_name`.
    ///
    /// Under [`RegistrationPolicy::Overwrite`] a second registration of the same pair replaces the
    /// first and reports [`RegistrationOutcome::Replaced`]; under [`RegistrationPolicy::Strict`]
    /// it fails with [`RegistryError::DuplicateRegistration`] and leaves the first in place.
    pub fn register(&mut self, category: Category, type_name: &str, factory: F) -> Result<RegistrationOutcome, RegistryError> {
        let class_name = self.class_name_for(category, type_name)?;
        let key = RegistryKey {
            category,
            class_name: class_name.clone(),
        };
        let registration = Registration {
            type_name: type_name.trim().to_string(),
            factory,
        };

        match self.entries.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(registration);
                debug!(category = %category, class_name = %class_name, "type registered");
                Ok(RegistrationOutcome::Inserted)
            }
            Entry::Occupied(mut entry) => match self.policy {
                RegistrationPolicy::Strict => Err(RegistryError::DuplicateRegistration { category, class_name }),
                RegistrationPolicy::Overwrite => {
                    entry.insert(registration);
                    warn!(category = %category, class_name = %class_name, "type re-registered; last registration wins");
                    Ok(RegistrationOutcome::Replaced)
                }
            },
        }
    }

    /// Resolves the factory registered for `type_name`.
    pub fn resolve(&self, category: Category, type_name: &str) -> Result<&F, RegistryError> {
        let class_name = self.class_name_for(category, type_name)?;
        let key = RegistryKey { category, class_name };
        match self.entries.get(&key) {
            Some(registration) => Ok(&registration.factory),
            None => Err(RegistryError::UnknownType {
                category,
                type_name: type_name.to_string(),
                class_name: key.class_name,
            }),
        }
    }

    pub fn contains(&self, category: Category, type_name: &str) -> bool {
        self.resolve(category, type_name).is_ok()
    }

    /// Removes a registration, returning its factory.
    pub fn unregister(&mut self, category: Category, type_name: &str) -> Option<F> {
        let class_name = self.class_name_for(category, type_name).ok()?;
        self.entries
            .shift_remove(&RegistryKey { category, class_name })
            .map(|registration| registration.factory)
    }

    /// Registered types for `category`, in registration order.
    pub fn registered_types(&self, category: Category) -> Vec<RegisteredType> {
        self.entries
            .iter()
            .filter(|(key, _)| key.category == category)
            .map(|(key, registration)| RegisteredType {
                category,
                type_name: registration.type_name.clone(),
                class_name: key.class_name.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_through_the_category_format() {
        let mut registry = TypeRegistry::default();
        registry.register(Category::Control, "text_input", 1).expect("register");

        assert_eq!(registry.resolve(Category::Control, "TextInput"), Ok(&1));
        assert_eq!(registry.resolve(Category::Control, "text-input"), Ok(&1));
        assert!(matches!(
            registry.resolve(Category::Action, "text_input"),
            Err(RegistryError::UnknownType { class_name, .. }) if class_name == "IXTextInputAction"
        ));
    }

    #[test]
    fn overwrite_policy_reports_replacement() {
        let mut registry = TypeRegistry::new(RegistrationPolicy::Overwrite);
        assert_eq!(registry.register(Category::Action, "alert", "first"), Ok(RegistrationOutcome::Inserted));
        assert_eq!(registry.register(Category::Action, "Alert", "second"), Ok(RegistrationOutcome::Replaced));
        assert_eq!(registry.resolve(Category::Action, "alert"), Ok(&"second"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn strict_policy_keeps_first_registration() {
        let mut registry = TypeRegistry::new(RegistrationPolicy::Strict);
        registry.register(Category::DataProvider, "json", "first").expect("first registration");
        let error = registry
            .register(Category::DataProvider, "json", "second")
            .expect_err("duplicate must fail");
        assert_eq!(
            error,
            RegistryError::DuplicateRegistration {
                category: Category::DataProvider,
                class_name: "IXJsonDataProvider".into(),
            }
        );
        assert_eq!(registry.resolve(Category::DataProvider, "json"), Ok(&"first"));
    }

    #[test]
    fn config_overrides_formats() {
        let mut config = RegistryConfig::default();
        config.class_name_formats.insert(Category::Control, "Custom{}View".into());
        let registry: TypeRegistry<()> = TypeRegistry::from_config(&config).expect("valid config");
        assert_eq!(registry.class_name_for(Category::Control, "label").as_deref(), Ok("CustomLabelView"));
        assert_eq!(registry.format_for(Category::Action).as_deref(), Some("IX{}Action"));

        config.class_name_formats.insert(Category::Action, "NoPlaceholder".into());
        assert!(matches!(
            TypeRegistry::<()>::from_config(&config),
            Err(RegistryError::InvalidFormat { category: Category::Action, .. })
        ));
    }

    #[test]
    fn unregister_and_listing() {
        let mut registry = TypeRegistry::default();
        registry.register(Category::Shortcode, "app", 'a').unwrap();
        registry.register(Category::Shortcode, "session", 's').unwrap();
        registry.register(Category::Control, "view", 'v').unwrap();

        let names: Vec<_> = registry
            .registered_types(Category::Shortcode)
            .into_iter()
            .map(|entry| entry.class_name)
            .collect();
        assert_eq!(names, vec!["IXAppShortcode", "IXSessionShortcode"]);

        assert_eq!(registry.unregister(Category::Shortcode, "app"), Some('a'));
        assert!(!registry.contains(Category::Shortcode, "app"));
        assert!(registry.contains(Category::Control, "view"));
    }
}
