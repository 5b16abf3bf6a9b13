use std::{env, path::PathBuf};

use dirs_next::{config_dir, home_dir};

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let p = path.trim();
    if p == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = p.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    if let Some(rest) = p.strip_prefix("~\\") {
        // Windows-style
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(p)
}

/// Resolves a configuration file path.
///
/// A non-blank `env_var` wins (with `~` expanded); otherwise the file lives at
/// `<config_dir>/ignite/<file_name>`, falling back to the working directory when the platform
/// has no configuration directory.
pub fn config_file_path(env_var: &str, file_name: &str) -> PathBuf {
    if let Ok(path) = env::var(env_var)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ignite")
        .join(file_name)
}
