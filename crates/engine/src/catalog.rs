use std::sync::Arc;

use ignite_registry::{RegisteredType, RegistrationOutcome, RegistryConfig, RegistryError, TypeRegistry};
use ignite_types::Category;

use crate::components::{
    Action, ActionFactory, Blueprint, ComponentError, Control, ControlFactory, DataProvider, DataProviderFactory, Shortcode,
    ShortcodeFactory, actions, controls, data_providers, shortcodes,
};

/// Factory stored in the registry; the variant always matches the registration category.
#[derive(Clone)]
pub enum ComponentFactory {
    Control(ControlFactory),
    DataProvider(DataProviderFactory),
    Action(ActionFactory),
    Shortcode(ShortcodeFactory),
}

/// Typed front for a [`TypeRegistry`] of component factories.
#[derive(Clone)]
pub struct ComponentRegistry {
    types: TypeRegistry<ComponentFactory>,
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        Ok(Self {
            types: TypeRegistry::from_config(config)?,
        })
    }

    /// A registry pre-populated with the built-in controls, data providers, actions and shortcodes.
    pub fn with_builtins(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new(config)?;
        registry.register_builtins()?;
        Ok(registry)
    }

    pub fn register_builtins(&mut self) -> Result<(), RegistryError> {
        for (type_name, factory) in controls::builtins() {
            self.types.register(Category::Control, type_name, ComponentFactory::Control(factory))?;
        }
        for (type_name, factory) in data_providers::builtins() {
            self.types
                .register(Category::DataProvider, type_name, ComponentFactory::DataProvider(factory))?;
        }
        for (type_name, factory) in actions::builtins() {
            self.types.register(Category::Action, type_name, ComponentFactory::Action(factory))?;
        }
        for (type_name, factory) in shortcodes::builtins() {
            self.types.register(Category::Shortcode, type_name, ComponentFactory::Shortcode(factory))?;
        }
        Ok(())
    }

    pub fn register_control<F>(&mut self, type_name: &str, factory: F) -> Result<RegistrationOutcome, RegistryError>
    where
        F: Fn(&Blueprint<'_>) -> Result<Arc<dyn Control>, ComponentError> + Send + Sync + 'static,
    {
        self.types
            .register(Category::Control, type_name, ComponentFactory::Control(Arc::new(factory)))
    }

    pub fn register_data_provider<F>(&mut self, type_name: &str, factory: F) -> Result<RegistrationOutcome, RegistryError>
    where
        F: Fn(&Blueprint<'_>) -> Result<Arc<dyn DataProvider>, ComponentError> + Send + Sync + 'static,
    {
        self.types
            .register(Category::DataProvider, type_name, ComponentFactory::DataProvider(Arc::new(factory)))
    }

    pub fn register_action<F>(&mut self, type_name: &str, factory: F) -> Result<RegistrationOutcome, RegistryError>
    where
        F: Fn(&Blueprint<'_>) -> Result<Arc<dyn Action>, ComponentError> + Send + Sync + 'static,
    {
        self.types
            .register(Category::Action, type_name, ComponentFactory::Action(Arc::new(factory)))
    }

    pub fn register_shortcode<F>(&mut self, type_name: &str, factory: F) -> Result<RegistrationOutcome, RegistryError>
    where
        F: Fn() -> Arc<dyn Shortcode> + Send + Sync + 'static,
    {
        self.types
            .register(Category::Shortcode, type_name, ComponentFactory::Shortcode(Arc::new(factory)))
    }

    pub fn resolve_control(&self, type_name: &str) -> Result<ControlFactory, RegistryError> {
        match self.types.resolve(Category::Control, type_name)? {
            ComponentFactory::Control(factory) => Ok(factory.clone()),
            _ => Err(self.unknown(Category::Control, type_name)),
        }
    }

    pub fn resolve_data_provider(&self, type_name: &str) -> Result<DataProviderFactory, RegistryError> {
        match self.types.resolve(Category::DataProvider, type_name)? {
            ComponentFactory::DataProvider(factory) => Ok(factory.clone()),
            _ => Err(self.unknown(Category::DataProvider, type_name)),
        }
    }

    pub fn resolve_action(&self, type_name: &str) -> Result<ActionFactory, RegistryError> {
        match self.types.resolve(Category::Action, type_name)? {
            ComponentFactory::Action(factory) => Ok(factory.clone()),
            _ => Err(self.unknown(Category::Action, type_name)),
        }
    }

    pub fn resolve_shortcode(&self, type_name: &str) -> Result<ShortcodeFactory, RegistryError> {
        match self.types.resolve(Category::Shortcode, type_name)? {
            ComponentFactory::Shortcode(factory) => Ok(factory.clone()),
            _ => Err(self.unknown(Category::Shortcode, type_name)),
        }
    }

    pub fn class_name_for(&self, category: Category, type_name: &str) -> Result<String, RegistryError> {
        self.types.class_name_for(category, type_name)
    }

    pub fn registered_types(&self, category: Category) -> Vec<RegisteredType> {
        self.types.registered_types(category)
    }

    pub fn types(&self) -> &TypeRegistry<ComponentFactory> {
        &self.types
    }

    fn unknown(&self, category: Category, type_name: &str) -> RegistryError {
        RegistryError::UnknownType {
            category,
            type_name: type_name.to_string(),
            class_name: self.class_name_for(category, type_name).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use ignite_registry::RegistrationPolicy;

    use super::*;
    use crate::components::controls::TextControl;

    #[test]
    fn builtins_cover_every_category() {
        let registry = ComponentRegistry::with_builtins(&RegistryConfig::default()).unwrap();
        let actions: Vec<_> = registry
            .registered_types(Category::Action)
            .into_iter()
            .map(|entry| entry.type_name)
            .collect();
        assert_eq!(actions, vec!["alert", "modify", "refresh", "load", "set", "function"]);
        assert!(registry.resolve_control("TextInput").is_ok());
        assert!(registry.resolve_data_provider("json").is_ok());
        assert!(registry.resolve_shortcode("dp").is_ok());
        assert!(matches!(
            registry.resolve_control("carousel").err(),
            Some(RegistryError::UnknownType { class_name, .. }) if class_name == "IXCarouselControl"
        ));
    }

    #[test]
    fn strict_policy_rejects_overriding_builtins() {
        let config = RegistryConfig {
            policy: RegistrationPolicy::Strict,
            ..RegistryConfig::default()
        };
        let mut registry = ComponentRegistry::with_builtins(&config).unwrap();
        let outcome = registry.register_control("text", |_| Ok(Arc::new(TextControl) as Arc<dyn Control>));
        assert!(matches!(outcome, Err(RegistryError::DuplicateRegistration { .. })));
    }
}
