use heck::ToUpperCamelCase;
use ignite_types::symbols::CLASS_NAME_PLACEHOLDER;

/// Per-category naming convention, e.g. `IX{}Control`.
///
/// The type name declared in a document is converted to UpperCamelCase and substituted for the
/// single `{}` placeholder, so `text_input`, `text-input` and `TextInput` all map to the same
/// class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNameFormat {
    prefix: String,
    suffix: String,
}

impl ClassNameFormat {
    /// Parses a format string. Returns `None` unless it contains exactly one placeholder.
    pub fn parse(raw: &str) -> Option<Self> {
        let (prefix, suffix) = raw.split_once(CLASS_NAME_PLACEHOLDER)?;
        if suffix.contains(CLASS_NAME_PLACEHOLDER) {
            return None;
        }
        Some(Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        })
    }

    /// Builds the class name for `type_name`. Returns `None` when the name has no usable characters.
    pub fn apply(&self, type_name: &str) -> Option<String> {
        let trimmed = type_name.trim();
        let valid = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|character| character.is_ascii_alphanumeric() || character == '_' || character == '-');
        if !valid {
            return None;
        }
        let camel = trimmed.to_upper_camel_case();
        Some(format!("{}{}{}", self.prefix, camel, self.suffix))
    }

    pub fn pattern(&self) -> String {
        format!("{}{}{}", self.prefix, CLASS_NAME_PLACEHOLDER, self.suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_camel_case_uniformly() {
        let format = ClassNameFormat::parse("IX{}Control").expect("valid format");
        assert_eq!(format.apply("button").as_deref(), Some("IXButtonControl"));
        assert_eq!(format.apply("text_input").as_deref(), Some("IXTextInputControl"));
        assert_eq!(format.apply("text-input").as_deref(), Some("IXTextInputControl"));
        assert_eq!(format.apply("TextInput").as_deref(), Some("IXTextInputControl"));
        assert_eq!(format.pattern(), "IX{}Control");
    }

    #[test]
    fn rejects_bad_formats_and_names() {
        assert!(ClassNameFormat::parse("IXControl").is_none());
        assert!(ClassNameFormat::parse("{}{}").is_none());
        let format = ClassNameFormat::parse("{}").expect("bare placeholder");
        assert!(format.apply("  ").is_none());
        assert!(format.apply("text input").is_none());
    }
}
