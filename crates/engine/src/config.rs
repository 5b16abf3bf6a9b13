use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use ignite_registry::RegistryConfig;
use ignite_types::symbols;
use ignite_util::config_file_path;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Environment variable that points at an alternative engine configuration file.
pub const CONFIG_PATH_ENV: &str = "IGNITE_CONFIG_PATH";
pub const CONFIG_FILE_NAME: &str = "engine.json";

/// Smallest accepted repeat interval.
pub const MIN_REPEAT_DELAY_MS: u64 = 10;
/// Default cap on repeated deliveries of a single binding.
pub const DEFAULT_MAX_REPEATS: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Build flavor. Debug builds surface build problems loudly; release builds keep them at debug level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    #[default]
    Debug,
    Release,
}

impl BuildMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => symbols::DEBUG,
            Self::Release => symbols::RELEASE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Delay applied to bindings that declare none.
    #[serde(default)]
    pub default_delay_ms: u64,
    /// Repeat intervals below this are raised to it.
    #[serde(default = "default_min_repeat_delay_ms")]
    pub min_repeat_delay_ms: u64,
    /// Maximum number of repeated deliveries per binding before the repeat stops.
    #[serde(default = "default_max_repeats")]
    pub max_repeats: u32,
}

fn default_min_repeat_delay_ms() -> u64 {
    MIN_REPEAT_DELAY_MS
}

fn default_max_repeats() -> u32 {
    DEFAULT_MAX_REPEATS
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_delay_ms: 0,
            min_repeat_delay_ms: MIN_REPEAT_DELAY_MS,
            max_repeats: DEFAULT_MAX_REPEATS,
        }
    }
}

impl DispatchConfig {
    pub fn default_delay(&self) -> Duration {
        Duration::from_millis(self.default_delay_ms)
    }

    /// Applies the configured floor to a declared repeat interval.
    pub fn clamp_repeat(&self, declared: Duration) -> Duration {
        declared.max(Duration::from_millis(self.min_repeat_delay_ms))
    }
}

/// Engine configuration, read from `$IGNITE_CONFIG_PATH` or `<config_dir>/ignite/engine.json`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub mode: BuildMode,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl EngineConfig {
    /// Loads the configuration from the default location. A missing file yields defaults; an
    /// unreadable or malformed one is logged and also yields defaults.
    pub fn load() -> Self {
        let path = default_config_path();
        if !path.exists() {
            debug!(path = %path.display(), "no engine configuration file; using defaults");
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(error) => {
                warn!(path = %path.display(), error = %error, "ignoring engine configuration");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Get the default path for the engine configuration file.
pub fn default_config_path() -> PathBuf {
    config_file_path(CONFIG_PATH_ENV, CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ignite_registry::RegistrationPolicy;

    use super::*;

    #[test]
    fn partial_files_fill_in_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "mode": "release", "dispatch": { "default_delay_ms": 25 } }"#).unwrap();
        assert_eq!(config.mode, BuildMode::Release);
        assert_eq!(config.dispatch.default_delay(), Duration::from_millis(25));
        assert_eq!(config.dispatch.max_repeats, DEFAULT_MAX_REPEATS);
        assert_eq!(config.registry.policy, RegistrationPolicy::Overwrite);
    }

    #[test]
    fn load_reads_the_env_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "registry": {{ "policy": "strict" }} }}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();

        temp_env::with_var(CONFIG_PATH_ENV, Some(path.as_str()), || {
            let config = EngineConfig::load();
            assert_eq!(config.registry.policy, RegistrationPolicy::Strict);
        });
    }

    #[test]
    fn malformed_files_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let path = file.path().to_string_lossy().to_string();

        temp_env::with_var(CONFIG_PATH_ENV, Some(path.as_str()), || {
            assert_eq!(EngineConfig::load(), EngineConfig::default());
        });
    }

    #[test]
    fn repeat_floor_is_applied() {
        let dispatch = DispatchConfig::default();
        assert_eq!(dispatch.clamp_repeat(Duration::from_millis(1)), Duration::from_millis(MIN_REPEAT_DELAY_MS));
        assert_eq!(dispatch.clamp_repeat(Duration::from_secs(2)), Duration::from_secs(2));
    }
}
