//! Reserved vocabulary of the declarative document format.
//!
//! Every key the engine reads from a document, every lifecycle event name, and every literal
//! token used when parsing attribute values is declared here. The [`SymbolTable`] exposes the
//! same vocabulary as an immutable lookup table that is built once per process.

use std::collections::HashMap;

use once_cell::sync::Lazy;

// Class name formats. `{}` is replaced by the UpperCamelCase type name.
pub const CONTROL_CLASS_NAME_FORMAT: &str = "IX{}Control";
pub const DATA_PROVIDER_CLASS_NAME_FORMAT: &str = "IX{}DataProvider";
pub const ACTION_CLASS_NAME_FORMAT: &str = "IX{}Action";
pub const SHORTCODE_CLASS_NAME_FORMAT: &str = "IX{}Shortcode";
/// Placeholder substituted by the type name inside a class name format.
pub const CLASS_NAME_PLACEHOLDER: &str = "{}";
/// Sentinel class name used for nodes that do not declare a `type`.
pub const DUMMY_ENTITY_NAME: &str = "IXDummyDataModelEntity";
pub const DEBUG: &str = "debug";
pub const RELEASE: &str = "release";

// Structural keys.
pub const ID: &str = "id";
pub const APP: &str = "app";
pub const STYLE: &str = "style";
pub const TARGET: &str = "target";
pub const TYPE: &str = "type";
pub const SESSION: &str = "session";
pub const VIEW: &str = "view";
pub const CONTROLS: &str = "controls";
pub const ACTIONS: &str = "actions";
pub const ATTRIBUTES: &str = "attributes";
pub const DATA_PROVIDERS: &str = "dataProviders";
pub const VALUE: &str = "value";
pub const ORIENTATION: &str = "orientation";
pub const IF: &str = "if";
pub const ENABLED: &str = "enabled";
pub const ON: &str = "on";
pub const DELAY: &str = "delay";
pub const REPEAT_DELAY: &str = "repeatDelay";

// Literal tokens.
pub const TRUE: &str = "true";
pub const FALSE: &str = "false";
pub const EMPTY_STRING: &str = "";
pub const COMMA_SEPARATOR: &str = ",";
pub const PERIOD_SEPARATOR: &str = ".";
pub const COLON_SEPARATOR: &str = ":";
/// Delimiters wrapping an embedded expression, e.g. `{{ session.user == "ada" }}`.
pub const EVAL_BRACKETS: (&str, &str) = ("{{", "}}");
/// Delimiters wrapping a shortcode inside a string attribute, e.g. `[[app:title]]`.
pub const SHORTCODE_BRACKETS: (&str, &str) = ("[[", "]]");

// Global event names.
pub const ERROR: &str = "error";
pub const FAILED: &str = "failed";
pub const FINISHED: &str = "finished";
pub const SUCCESS: &str = "success";

// Data provider specific nodes.
pub const DP_PARAMETERS: &str = "parameters";
pub const DP_HEADERS: &str = "headers";
pub const DP_ATTACHMENTS: &str = "attachments";
pub const DP_ENTITY: &str = "entity";

// Action types.
pub const ALERT: &str = "alert";
pub const MODIFY: &str = "modify";
pub const REFRESH: &str = "refresh";
pub const LOAD: &str = "load";
pub const SET: &str = "set";
pub const FUNCTION: &str = "function";

// Randoms.
pub const ANIMATED: &str = "animated";
pub const TITLE: &str = "title";
pub const SUB_TITLE: &str = "sub_title";
pub const OK: &str = "ok";
pub const CANCEL: &str = "cancel";
pub const TOUCH: &str = "touch";
pub const GIF_EXTENSION: &str = ".gif";
pub const DEFAULT: &str = "default";

/// Classification of a reserved token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// Key that structures a node, action or document (`id`, `controls`, `on`, ...).
    StructuralKey,
    /// Key only meaningful inside a data provider declaration.
    DataProviderKey,
    /// Built-in lifecycle event name.
    EventName,
    /// Built-in action type tag.
    ActionType,
    /// Literal token such as `true` or a separator.
    Literal,
    /// Attribute names and values with engine-level meaning (`title`, `touch`, ...).
    Attribute,
}

/// Immutable lookup table of reserved tokens.
#[derive(Debug)]
pub struct SymbolTable {
    entries: HashMap<&'static str, SymbolKind>,
}

static SYMBOL_TABLE: Lazy<SymbolTable> = Lazy::new(SymbolTable::build);

/// Returns the process-wide symbol table.
pub fn symbol_table() -> &'static SymbolTable {
    &SYMBOL_TABLE
}

impl SymbolTable {
    fn build() -> Self {
        let groups: [(SymbolKind, &[&'static str]); 6] = [
            (
                SymbolKind::StructuralKey,
                &[
                    ID,
                    APP,
                    STYLE,
                    TARGET,
                    TYPE,
                    SESSION,
                    VIEW,
                    CONTROLS,
                    ACTIONS,
                    ATTRIBUTES,
                    DATA_PROVIDERS,
                    VALUE,
                    ORIENTATION,
                    IF,
                    ENABLED,
                    ON,
                    DELAY,
                    REPEAT_DELAY,
                ],
            ),
            (SymbolKind::DataProviderKey, &[DP_PARAMETERS, DP_HEADERS, DP_ATTACHMENTS, DP_ENTITY]),
            (SymbolKind::EventName, &[ERROR, FAILED, FINISHED, SUCCESS]),
            (SymbolKind::ActionType, &[ALERT, MODIFY, REFRESH, LOAD, SET, FUNCTION]),
            (
                SymbolKind::Literal,
                &[TRUE, FALSE, EMPTY_STRING, COMMA_SEPARATOR, PERIOD_SEPARATOR, COLON_SEPARATOR],
            ),
            (
                SymbolKind::Attribute,
                &[ANIMATED, TITLE, SUB_TITLE, OK, CANCEL, TOUCH, GIF_EXTENSION, DEFAULT],
            ),
        ];

        let mut entries = HashMap::new();
        for (kind, tokens) in groups {
            for token in tokens {
                entries.insert(*token, kind);
            }
        }
        Self { entries }
    }

    /// Returns the classification of `token`, if it is reserved.
    pub fn kind_of(&self, token: &str) -> Option<SymbolKind> {
        self.entries.get(token).copied()
    }

    /// True when `key` is a structural or data-provider key rather than a free attribute.
    pub fn is_reserved_key(&self, key: &str) -> bool {
        matches!(self.kind_of(key), Some(SymbolKind::StructuralKey | SymbolKind::DataProviderKey))
    }

    /// True when `name` is one of the built-in lifecycle events.
    pub fn is_lifecycle_event(&self, name: &str) -> bool {
        self.kind_of(name) == Some(SymbolKind::EventName)
    }

    /// True when `name` is one of the built-in action type tags.
    pub fn is_builtin_action(&self, name: &str) -> bool {
        self.kind_of(name) == Some(SymbolKind::ActionType)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses a boolean literal token, ignoring surrounding whitespace and ASCII case.
pub fn parse_bool_literal(token: &str) -> Option<bool> {
    let trimmed = token.trim();
    if trimmed.eq_ignore_ascii_case(TRUE) {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case(FALSE) {
        Some(false)
    } else {
        None
    }
}

/// Splits a comma separated list, dropping blank entries.
pub fn split_list(raw: &str) -> Vec<&str> {
    raw.split(COMMA_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Splits a dotted path into its segments.
pub fn split_path(raw: &str) -> Vec<&str> {
    raw.split(PERIOD_SEPARATOR).map(str::trim).collect()
}

/// Splits `head:tail` on the first colon. The tail is `None` when no colon is present.
pub fn split_pair(raw: &str) -> (&str, Option<&str>) {
    match raw.split_once(COLON_SEPARATOR) {
        Some((head, tail)) => (head.trim(), Some(tail.trim())),
        None => (raw.trim(), None),
    }
}

/// Returns the inner expression when `raw` is wrapped in the eval brackets.
pub fn strip_eval_brackets(raw: &str) -> Option<&str> {
    let (open, close) = EVAL_BRACKETS;
    let trimmed = raw.trim();
    let inner = trimmed.strip_prefix(open)?.strip_suffix(close)?;
    Some(inner.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_classifies_reserved_tokens() {
        let table = symbol_table();
        assert_eq!(table.kind_of("dataProviders"), Some(SymbolKind::StructuralKey));
        assert_eq!(table.kind_of("headers"), Some(SymbolKind::DataProviderKey));
        assert_eq!(table.kind_of("finished"), Some(SymbolKind::EventName));
        assert_eq!(table.kind_of("modify"), Some(SymbolKind::ActionType));
        assert_eq!(table.kind_of("sub_title"), Some(SymbolKind::Attribute));
        assert_eq!(table.kind_of("font"), None);
        assert!(table.is_reserved_key("repeatDelay"));
        assert!(!table.is_reserved_key("touch"));
    }

    #[test]
    fn literal_helpers() {
        assert_eq!(parse_bool_literal(" TRUE "), Some(true));
        assert_eq!(parse_bool_literal("false"), Some(false));
        assert_eq!(parse_bool_literal("yes"), None);
        assert_eq!(split_list("touch, finished,,"), vec!["touch", "finished"]);
        assert_eq!(split_pair("dp:users.name"), ("dp", Some("users.name")));
        assert_eq!(split_pair("app"), ("app", None));
        assert_eq!(strip_eval_brackets("{{ session.user }}"), Some("session.user"));
        assert_eq!(strip_eval_brackets("session.user"), None);
    }
}
