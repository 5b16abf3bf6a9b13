//! Built-in controls.

use std::sync::Arc;

use ignite_types::{Attributes, symbols};
use serde_json::Value;

use super::{Blueprint, ComponentError, Control, ControlFactory};

pub const VERTICAL: &str = "vertical";
pub const HORIZONTAL: &str = "horizontal";

/// Container laying its children out along `orientation`.
#[derive(Debug)]
pub struct ViewControl;

impl Control for ViewControl {
    fn configure(&self, attributes: &mut Attributes) {
        let orientation = attributes
            .get(symbols::ORIENTATION)
            .and_then(Value::as_str)
            .map(str::to_ascii_lowercase)
            .filter(|orientation| orientation == VERTICAL || orientation == HORIZONTAL)
            .unwrap_or_else(|| VERTICAL.to_string());
        attributes.insert(symbols::ORIENTATION.to_string(), Value::String(orientation));
    }
}

/// Static text.
#[derive(Debug)]
pub struct TextControl;

impl Control for TextControl {
    fn configure(&self, attributes: &mut Attributes) {
        attributes
            .entry("text".to_string())
            .or_insert_with(|| Value::String(symbols::EMPTY_STRING.to_string()));
    }
}

/// Tappable control; raises `touch`.
#[derive(Debug)]
pub struct ButtonControl;

impl Control for ButtonControl {
    fn functions(&self) -> &[&'static str] {
        &["press"]
    }
}

/// Image; `animated` is derived from a `.gif` source.
#[derive(Debug)]
pub struct ImageControl;

impl Control for ImageControl {
    fn configure(&self, attributes: &mut Attributes) {
        let animated = attributes
            .get("source")
            .and_then(Value::as_str)
            .is_some_and(|source| source.to_ascii_lowercase().ends_with(symbols::GIF_EXTENSION));
        attributes.insert(symbols::ANIMATED.to_string(), Value::Bool(animated));
    }

    fn functions(&self) -> &[&'static str] {
        &["start_animation", "stop_animation"]
    }
}

/// Editable text field.
#[derive(Debug)]
pub struct TextInputControl;

impl Control for TextInputControl {
    fn configure(&self, attributes: &mut Attributes) {
        attributes
            .entry(symbols::VALUE.to_string())
            .or_insert_with(|| Value::String(symbols::EMPTY_STRING.to_string()));
    }

    fn functions(&self) -> &[&'static str] {
        &["focus", "blur", "clear"]
    }
}

fn stateless<C: Control + 'static>(control: fn() -> C) -> ControlFactory {
    Arc::new(move |_: &Blueprint<'_>| -> Result<Arc<dyn Control>, ComponentError> { Ok(Arc::new(control())) })
}

pub fn builtins() -> Vec<(&'static str, ControlFactory)> {
    vec![
        (symbols::VIEW, stateless(|| ViewControl)),
        ("text", stateless(|| TextControl)),
        ("button", stateless(|| ButtonControl)),
        ("image", stateless(|| ImageControl)),
        ("text_input", stateless(|| TextInputControl)),
    ]
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn view_normalizes_orientation() {
        let mut attributes: Attributes = serde_json::from_value(json!({ "orientation": "Horizontal" })).unwrap();
        ViewControl.configure(&mut attributes);
        assert_eq!(attributes.get("orientation"), Some(&json!("horizontal")));

        let mut attributes = Attributes::new();
        ViewControl.configure(&mut attributes);
        assert_eq!(attributes.get("orientation"), Some(&json!("vertical")));
    }

    #[test]
    fn gif_images_are_animated() {
        let mut attributes: Attributes = serde_json::from_value(json!({ "source": "images/Spinner.GIF" })).unwrap();
        ImageControl.configure(&mut attributes);
        assert_eq!(attributes.get("animated"), Some(&json!(true)));

        attributes.insert("source".into(), json!("logo.png"));
        ImageControl.configure(&mut attributes);
        assert_eq!(attributes.get("animated"), Some(&json!(false)));
    }
}
