//! Boolean gates for `if` and `enabled`.
//!
//! The default [`ConditionEvaluator`] understands `==`, `!=`, `&&`, `||`, leading `!`,
//! parentheses and `list.includes(item)`. Operands are JSON literals (numbers, `"strings"`,
//! `true`, `false`, `null`, arrays, objects), single-quoted strings, or [`Scope`] paths.
//! A path that resolves to nothing is `null`, which is falsy; a malformed expression is a
//! [`PredicateError`], and callers treat it as false.

use ignite_types::symbols::{self, parse_bool_literal, strip_eval_brackets};
use serde_json::Value;

use crate::scope::{ROOTS, Scope};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredicateError {
    #[error("expression cannot be empty")]
    Empty,
    #[error("unbalanced quotes or parentheses")]
    Unbalanced,
    #[error("{0}")]
    UnsupportedOperator(&'static str),
    #[error("comparison expression must include both left and right operands")]
    MissingOperand,
    #[error("expression cannot end with negation operator")]
    DanglingNegation,
    #[error("includes expression is missing an argument")]
    MissingArgument,
    #[error("malformed literal '{0}'")]
    MalformedLiteral(String),
    #[error("unsupported expression '{0}'; supported roots are app.*, session.*, event.*, nodes.* and providers.*")]
    UnsupportedOperand(String),
    #[error("gate value {0} is not a boolean or expression")]
    UnsupportedValue(String),
}

/// Evaluates predicate expressions against a session scope.
pub trait PredicateEvaluator: Send + Sync {
    fn evaluate(&self, expression: &str, scope: &Scope<'_>) -> Result<bool, PredicateError>;
}

/// Default expression grammar.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConditionEvaluator;

impl PredicateEvaluator for ConditionEvaluator {
    fn evaluate(&self, expression: &str, scope: &Scope<'_>) -> Result<bool, PredicateError> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(PredicateError::Empty);
        }
        if !is_balanced(trimmed) {
            return Err(PredicateError::Unbalanced);
        }
        if contains_operator(trimmed, "===") || contains_operator(trimmed, "!==") {
            return Err(PredicateError::UnsupportedOperator(
                "strict equality operators are unsupported; use '==' or '!='",
            ));
        }
        if contains_operator(trimmed, ">=")
            || contains_operator(trimmed, "<=")
            || contains_operator(trimmed, ">")
            || contains_operator(trimmed, "<")
        {
            return Err(PredicateError::UnsupportedOperator(
                "unsupported comparison operator; only '==', '!=', '&&', '||', '!' and '.includes(...)' are supported",
            ));
        }
        evaluate_node(trimmed, scope)
    }
}

/// Evaluates an `if` or `enabled` value. Absent and `null` gates are open; booleans, numbers and
/// boolean literals are taken at face value; other strings are expressions, optionally wrapped in
/// `{{ }}`.
pub fn evaluate_gate(raw: Option<&Value>, evaluator: &dyn PredicateEvaluator, scope: &Scope<'_>) -> Result<bool, PredicateError> {
    match raw {
        None | Some(Value::Null) => Ok(true),
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(Value::Number(number)) => Ok(number.as_f64().is_some_and(|value| value != 0.0)),
        Some(Value::String(text)) => {
            let expression = strip_eval_brackets(text).unwrap_or(text.as_str());
            match parse_bool_literal(expression) {
                Some(flag) => Ok(flag),
                None => evaluator.evaluate(expression, scope),
            }
        }
        Some(other) => Err(PredicateError::UnsupportedValue(other.to_string())),
    }
}

/// Renders a gate for logs and error messages.
pub fn gate_text(raw: &Value) -> String {
    match raw {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn evaluate_node(expression: &str, scope: &Scope<'_>) -> Result<bool, PredicateError> {
    // Every branch is evaluated so a malformed tail is reported even when the head decides.
    if let Some(parts) = split_expression(expression, "||") {
        let mut result = false;
        for part in parts {
            result |= evaluate_node(part, scope)?;
        }
        return Ok(result);
    }
    if let Some(parts) = split_expression(expression, "&&") {
        let mut result = true;
        for part in parts {
            result &= evaluate_node(part, scope)?;
        }
        return Ok(result);
    }

    let (negations, inner) = strip_leading_negations(expression);
    let inner = inner.trim();
    if inner.is_empty() {
        return Err(PredicateError::DanglingNegation);
    }
    let value = match strip_outer_parentheses(inner) {
        Some(grouped) => evaluate_node(grouped, scope)?,
        None => evaluate_comparison(inner, scope)?,
    };
    Ok(if negations % 2 == 1 { !value } else { value })
}

fn evaluate_comparison(expression: &str, scope: &Scope<'_>) -> Result<bool, PredicateError> {
    if let Some(includes_index) = find_top_level_operator(expression, ".includes(") {
        let (left_expression, right_expression_with_suffix) = expression.split_at(includes_index);
        let right_expression = right_expression_with_suffix.trim_start_matches(".includes(").trim();
        let right_expression = right_expression.strip_suffix(')').unwrap_or(right_expression).trim();
        if right_expression.is_empty() {
            return Err(PredicateError::MissingArgument);
        }
        let haystack = resolve_operand(left_expression.trim(), scope)?;
        let needle = resolve_operand(right_expression, scope)?;
        return Ok(match haystack {
            Value::Array(items) => items.iter().any(|item| values_match(item, &needle)),
            Value::String(text) => value_text(&needle).is_some_and(|needle| text.contains(&needle)),
            _ => false,
        });
    }

    for (operator, expected) in [("!=", false), ("==", true)] {
        if let Some(position) = find_top_level_operator(expression, operator) {
            let left_expression = expression[..position].trim();
            let right_expression = expression[position + operator.len()..].trim();
            if left_expression.is_empty() || right_expression.is_empty() {
                return Err(PredicateError::MissingOperand);
            }
            let left = resolve_operand(left_expression, scope)?;
            let right = resolve_operand(right_expression, scope)?;
            return Ok(values_match(&left, &right) == expected);
        }
    }

    Ok(is_truthy(&resolve_operand(expression, scope)?))
}

fn resolve_operand(expression: &str, scope: &Scope<'_>) -> Result<Value, PredicateError> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(PredicateError::MissingOperand);
    }
    if let Some(text) = trimmed.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')) {
        return Ok(Value::String(text.to_string()));
    }
    if looks_like_json_literal(trimmed) {
        return serde_json::from_str(trimmed).map_err(|_| PredicateError::MalformedLiteral(trimmed.to_string()));
    }
    if !is_supported_path_expression(trimmed) {
        return Err(PredicateError::UnsupportedOperand(trimmed.to_string()));
    }
    Ok(scope.lookup(trimmed).unwrap_or(Value::Null))
}

/// Loose equality: identical JSON values, or scalars whose text forms agree (`"2" == 2`).
fn values_match(left: &Value, right: &Value) -> bool {
    if left == right {
        return true;
    }
    match (value_text(left), value_text(right)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|value| value != 0.0),
        Value::String(text) => !text.is_empty() && parse_bool_literal(text) != Some(false),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn looks_like_json_literal(expression: &str) -> bool {
    let starts_like_number = expression
        .chars()
        .next()
        .map(|character| character == '-' || character.is_ascii_digit())
        .unwrap_or(false);
    expression.starts_with('[')
        || expression.starts_with('{')
        || expression.starts_with('"')
        || expression == "null"
        || expression == symbols::TRUE
        || expression == symbols::FALSE
        || starts_like_number
}

fn is_supported_path_expression(expression: &str) -> bool {
    if expression.contains(char::is_whitespace) {
        return false;
    }
    let mut segments = expression.split(symbols::PERIOD_SEPARATOR);
    let Some(root) = segments.next() else {
        return false;
    };
    if !ROOTS.contains(&root) {
        return false;
    }
    let rest: Vec<&str> = segments.collect();
    !rest.is_empty()
        && rest
            .iter()
            .all(|segment| !segment.is_empty() && segment.chars().all(is_identifier_character))
}

fn is_identifier_character(character: char) -> bool {
    character.is_ascii_alphanumeric() || character == '_' || character == '-'
}

fn split_expression<'a>(expression: &'a str, operator: &str) -> Option<Vec<&'a str>> {
    let mut parts = Vec::new();
    let mut start = 0usize;
    let length = expression.len();

    while start < length {
        if let Some(relative_index) = find_top_level_operator(&expression[start..], operator) {
            let absolute_index = start + relative_index;
            parts.push(expression[start..absolute_index].trim());
            start = absolute_index + operator.len();
        } else {
            parts.push(expression[start..].trim());
            break;
        }
    }

    if parts.len() > 1 { Some(parts) } else { None }
}

fn strip_leading_negations(expression: &str) -> (usize, &str) {
    let mut count = 0usize;
    let mut remainder = expression.trim_start();
    while let Some(stripped) = remainder.strip_prefix('!') {
        if stripped.starts_with('=') {
            break;
        }
        count += 1;
        remainder = stripped.trim_start();
    }
    (count, remainder)
}

/// Returns the inside of `( ... )` when the parentheses wrap the whole expression.
fn strip_outer_parentheses(expression: &str) -> Option<&str> {
    let inner = expression.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0i32;
    for character in inner.chars() {
        match character {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    (depth == 0).then_some(inner.trim())
}

fn is_balanced(expression: &str) -> bool {
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut depth = 0i32;
    for character in expression.chars() {
        match character {
            '\'' if !in_double_quote => in_single_quote = !in_single_quote,
            '"' if !in_single_quote => in_double_quote = !in_double_quote,
            '(' if !in_single_quote && !in_double_quote => depth += 1,
            ')' if !in_single_quote && !in_double_quote => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    !in_single_quote && !in_double_quote && depth == 0
}

fn contains_operator(expression: &str, operator: &str) -> bool {
    find_top_level_operator(expression, operator).is_some()
}

fn find_top_level_operator(expression: &str, operator: &str) -> Option<usize> {
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut depth = 0i32;

    for (index, character) in expression.char_indices() {
        match character {
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
                continue;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
                continue;
            }
            '(' if !in_single_quote && !in_double_quote => {
                depth += 1;
                continue;
            }
            ')' if !in_single_quote && !in_double_quote => {
                if depth > 0 {
                    depth -= 1;
                }
                continue;
            }
            _ => {}
        }

        if !in_single_quote && !in_double_quote && depth == 0 && expression[index..].starts_with(operator) {
            return Some(index);
        }
    }

    None
}
