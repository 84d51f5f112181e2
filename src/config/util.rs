//! Configuration utility functions.

use std::path::{Path, PathBuf};

use super::{ConfigError, DEFAULT_CONFIG_NAME};

/// Resolve the `--config` value to a file.
///
/// Only the default name may be absent; an explicit name that cannot be
/// found is an error instead of a silent fallback to defaults.
pub fn locate_config(config_name: &Path) -> Result<Option<PathBuf>, ConfigError> {
    match find_config_file(config_name) {
        Some(path) => Ok(Some(path)),
        None if config_name == Path::new(DEFAULT_CONFIG_NAME) => Ok(None),
        None => Err(ConfigError::NotFound(config_name.to_path_buf())),
    }
}

/// Find config file by searching upward from current directory
///
/// Absolute names are used as-is when they exist. Otherwise starts from cwd
/// and walks up parent directories until finding `config_name`.
///
/// # Example
/// ```text
/// /home/user/site/dist/blog/  ← cwd
/// /home/user/site/sri.toml    ← found!
/// ```
fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    find_upward(&cwd, config_name)
}

/// Walk up from `start` looking for `name`.
fn find_upward(start: &Path, name: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// tests
// ============================================================================
