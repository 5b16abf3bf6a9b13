use std::sync::Arc;

use ignite_registry::{RegistrationPolicy, RegistryError, TypeRegistry};
use ignite_types::Category;

type Factory = Arc<dyn Fn() -> &'static str + Send + Sync>;

fn factory(label: &'static str) -> Factory {
    Arc::new(move || label)
}

#[test]
fn resolve_returns_most_recent_registration_for_every_pair() {
    let mut registry: TypeRegistry<Factory> = TypeRegistry::new(RegistrationPolicy::Overwrite);
    let pairs = [
        (Category::Control, "button"),
        (Category::Control, "text_input"),
        (Category::DataProvider, "json"),
        (Category::Action, "alert"),
        (Category::Shortcode, "app"),
    ];

    for (category, type_name) in pairs {
        registry.register(category, type_name, factory("first")).unwrap();
    }
    for (category, type_name) in pairs {
        registry.register(category, type_name, factory("second")).unwrap();
    }
    registry.register(Category::Control, "button", factory("third")).unwrap();

    for (category, type_name) in pairs {
        let resolved = registry.resolve(category, type_name).expect("registered pair resolves");
        let expected = if (category, type_name) == (Category::Control, "button") { "third" } else { "second" };
        assert_eq!(resolved(), expected, "{category} {type_name}");
    }
    assert_eq!(registry.len(), pairs.len());
}

#[test]
fn same_type_name_is_independent_across_categories() {
    let mut registry: TypeRegistry<Factory> = TypeRegistry::new(RegistrationPolicy::Strict);
    registry.register(Category::Control, "load", factory("control")).unwrap();
    registry.register(Category::Action, "load", factory("action")).unwrap();

    assert_eq!(registry.resolve(Category::Control, "load").unwrap()(), "control");
    assert_eq!(registry.resolve(Category::Action, "load").unwrap()(), "action");
}

#[test]
fn unknown_type_names_the_expected_class() {
    let registry: TypeRegistry<Factory> = TypeRegistry::default();
    let error = registry.resolve(Category::DataProvider, "graph_ql").err().expect("nothing registered");
    assert_eq!(
        error,
        RegistryError::UnknownType {
            category: Category::DataProvider,
            type_name: "graph_ql".into(),
            class_name: "IXGraphQlDataProvider".into(),
        }
    );
}
