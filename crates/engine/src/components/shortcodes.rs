//! Built-in shortcodes. Each maps its argument onto a [`Scope`] root:
//! `[[app:key]]`, `[[session:key]]`, `[[attr:id.key]]`, `[[dp:id.path]]` and `[[event:payload.x]]`.

use std::sync::Arc;

use ignite_types::symbols;
use serde_json::Value;

use super::{Shortcode, ShortcodeFactory};
use crate::scope::{EVENT_ROOT, NODES_ROOT, PROVIDERS_ROOT, Scope};

/// Resolves its argument under a fixed scope root.
#[derive(Debug)]
pub struct ScopeShortcode {
    root: &'static str,
}

impl ScopeShortcode {
    pub fn new(root: &'static str) -> Self {
        Self { root }
    }
}

impl Shortcode for ScopeShortcode {
    fn evaluate(&self, argument: Option<&str>, scope: &Scope<'_>) -> Option<Value> {
        let argument = argument.map(str::trim).filter(|argument| !argument.is_empty())?;
        scope.lookup(&format!("{}{}{}", self.root, symbols::PERIOD_SEPARATOR, argument))
    }
}

fn rooted(root: &'static str) -> ShortcodeFactory {
    Arc::new(move || -> Arc<dyn Shortcode> { Arc::new(ScopeShortcode::new(root)) })
}

pub fn builtins() -> Vec<(&'static str, ShortcodeFactory)> {
    vec![
        (symbols::APP, rooted(symbols::APP)),
        (symbols::SESSION, rooted(symbols::SESSION)),
        ("attr", rooted(NODES_ROOT)),
        ("dp", rooted(PROVIDERS_ROOT)),
        (EVENT_ROOT, rooted(EVENT_ROOT)),
    ]
}
