use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::symbols;

/// Kind of runtime object a declared `type` name resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Renderable node declared under `view` or `controls`.
    Control,
    /// Entity declared under `dataProviders`.
    DataProvider,
    /// Unit of behavior declared under `actions` or `on`.
    Action,
    /// Inline macro embedded in string attributes.
    Shortcode,
}

impl Category {
    pub const ALL: [Category; 4] = [Category::Control, Category::DataProvider, Category::Action, Category::Shortcode];

    /// Class name format applied when no override is configured.
    pub fn default_class_name_format(self) -> &'static str {
        match self {
            Self::Control => symbols::CONTROL_CLASS_NAME_FORMAT,
            Self::DataProvider => symbols::DATA_PROVIDER_CLASS_NAME_FORMAT,
            Self::Action => symbols::ACTION_CLASS_NAME_FORMAT,
            Self::Shortcode => symbols::SHORTCODE_CLASS_NAME_FORMAT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::DataProvider => "data_provider",
            Self::Action => "action",
            Self::Shortcode => "shortcode",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'; expected one of control, data_provider, action, shortcode")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| ParseCategoryError(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_category_names() {
        assert_eq!("data-provider".parse::<Category>(), Ok(Category::DataProvider));
        assert_eq!("Control".parse::<Category>(), Ok(Category::Control));
        assert!("widget".parse::<Category>().is_err());
    }

    #[test]
    fn default_formats_follow_symbol_table() {
        assert_eq!(Category::Action.default_class_name_format(), "IX{}Action");
        assert_eq!(Category::Shortcode.default_class_name_format(), "IX{}Shortcode");
    }
}
