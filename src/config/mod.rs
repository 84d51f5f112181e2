//! Configuration for one SRI invocation.
//!
//! # Layers
//!
//! ```text
//! sri.toml  ──┐
//!             ├─> SriOptions (raw, serde) ──validate──> SriConfig (immutable)
//! CLI flags ──┘
//! ```
//!
//! # Example
//!
//! ```toml
//! algorithm = "sha512"
//! selector = "link[rel=stylesheet], script[src]"
//! prefix = "https://cdn.example.com"
//! relative = false
//! cache_parsed = false
//! base = "dist"
//! output = "dist-sri"
//! ```

mod error;
mod util;

pub use error::ConfigError;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::log;
use crate::sri::{Algorithm, DEFAULT_SELECTOR, Resolution, SelectorList};
use util::locate_config;

/// Config file looked up when `--config` is not given. Optional, unlike an
/// explicitly named file.
pub const DEFAULT_CONFIG_NAME: &str = "sri.toml";

// ============================================================================
// raw options
// ============================================================================

/// Options as written in `sri.toml` or passed on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SriOptions {
    /// Digest algorithm name (`sha256`, `sha384`, `sha512`).
    pub algorithm: String,
    /// CSS selector identifying candidate elements.
    pub selector: String,
    /// Prefix stripped from references before resolution.
    pub prefix: String,
    /// Resolve against each document's own directory instead of `base`.
    pub relative: bool,
    /// Reuse parsed markup across stages touching the same document.
    pub cache_parsed: bool,
    /// Base directory for base-relative resolution (CLI only).
    pub base: Option<PathBuf>,
    /// Output directory; documents are rewritten in place when absent (CLI only).
    pub output: Option<PathBuf>,
}

impl Default for SriOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default().name().to_string(),
            selector: DEFAULT_SELECTOR.to_string(),
            prefix: String::new(),
            relative: false,
            cache_parsed: false,
            base: None,
            output: None,
        }
    }
}

impl SriOptions {
    /// Load options for a CLI run: config file (if found) then CLI overrides.
    ///
    /// A missing default `sri.toml` means defaults; a missing file named with
    /// `--config` is an error. Relative `base`/`output` in the config file are resolved against the
    /// file's directory; CLI paths against the working directory.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut options = match locate_config(&cli.config)? {
            Some(path) => {
                let mut options = Self::from_path(&path)?;
                if let Some(dir) = path.parent() {
                    options.anchor_paths(dir);
                }
                crate::debug!("config"; "loaded {}", path.display());
                options
            }
            None => Self::default(),
        };
        options.apply_cli(cli);
        Ok(options)
    }

    /// Parse options from TOML, collecting unknown keys.
    pub fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let options = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((options, ignored))
    }

    /// Load options from a file, warning about unknown keys.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let (options, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            let name = path
                .file_name()
                .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy());
            log!("warning"; "unknown fields in {}, ignoring: {}", name, ignored.join(", "));
        }

        Ok(options)
    }

    fn anchor_paths(&mut self, dir: &Path) {
        for path in [&mut self.base, &mut self.output].into_iter().flatten() {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }

    /// Apply command-line overrides.
    fn apply_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.algorithm, cli.algorithm.as_ref());
        Self::update_option(&mut self.selector, cli.selector.as_ref());
        Self::update_option(&mut self.prefix, cli.prefix.as_ref());
        Self::update_option(&mut self.relative, cli.relative.as_ref());
        Self::update_option(&mut self.cache_parsed, cli.cache_parsed.as_ref());
        if cli.base.is_some() {
            self.base.clone_from(&cli.base);
        }
        if cli.output.is_some() {
            self.output.clone_from(&cli.output);
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }
}

// ============================================================================
// validated configuration
// ============================================================================

/// Immutable configuration for one invocation.
#[derive(Debug, Clone, Default)]
pub struct SriConfig {
    pub algorithm: Algorithm,
    pub selector: SelectorList,
    pub prefix: String,
    pub resolution: Resolution,
    pub cache_parsed: bool,
}

impl SriConfig {
    /// Validate raw options.
    ///
    /// Fails on an unsupported algorithm or a selector outside the supported
    /// subset, before any document is looked at.
    pub fn new(options: &SriOptions) -> Result<Self, ConfigError> {
        let algorithm = options.algorithm.parse::<Algorithm>()?;
        let selector = options
            .selector
            .parse::<SelectorList>()
            .map_err(|source| ConfigError::Selector {
                selector: options.selector.clone(),
                source,
            })?;

        Ok(Self {
            algorithm,
            selector,
            prefix: options.prefix.clone(),
            resolution: Resolution::from_relative(options.relative),
            cache_parsed: options.cache_parsed,
        })
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SriConfig::new(&SriOptions::default()).unwrap();
        assert_eq!(config.algorithm, Algorithm::Sha384);
        assert_eq!(config.selector.to_string(), DEFAULT_SELECTOR);
        assert_eq!(config.prefix, "");
        assert_eq!(config.resolution, Resolution::Base);
        assert!(!config.cache_parsed);
    }

    #[test]
    fn test_parse_options() {
        let content = r#"
algorithm = "sha512"
selector = "script"
prefix = "https://secure.com"
relative = true
cache_parsed = true
"#;
        let (options, ignored) = SriOptions::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());

        let config = SriConfig::new(&options).unwrap();
        assert_eq!(config.algorithm, Algorithm::Sha512);
        assert_eq!(config.selector.to_string(), "script");
        assert_eq!(config.prefix, "https://secure.com");
        assert_eq!(config.resolution, Resolution::Document);
        assert!(config.cache_parsed);
    }

    #[test]
    fn test_partial_options_keep_defaults() {
        let (options, _) = SriOptions::parse_with_ignored("prefix = \"/static\"").unwrap();
        assert_eq!(options.algorithm, "sha384");
        assert_eq!(options.selector, DEFAULT_SELECTOR);
        assert_eq!(options.prefix, "/static");
    }

    #[test]
    fn test_unknown_fields_detected() {
        let (options, ignored) =
            SriOptions::parse_with_ignored("algo = \"sha256\"\nprefix = \"x\"").unwrap();
        assert_eq!(options.prefix, "x");
        assert_eq!(ignored, ["algo"]);
    }

    #[test]
    fn test_invalid_toml() {
        let result = SriOptions::parse_with_ignored("algorithm = ");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_unsupported_algorithm() {
        let options = SriOptions {
            algorithm: "invalid".into(),
            ..SriOptions::default()
        };
        let err = SriConfig::new(&options).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedAlgorithm { ref name } if name == "invalid"));
    }

    #[test]
    fn test_invalid_selector() {
        let options = SriOptions {
            selector: "head > link".into(),
            ..SriOptions::default()
        };
        assert!(matches!(
            SriConfig::new(&options),
            Err(ConfigError::Selector { .. })
        ));
    }

    #[test]
    fn test_anchor_paths() {
        let mut options = SriOptions {
            base: Some(PathBuf::from("dist")),
            output: Some(PathBuf::from("/abs/out")),
            ..SriOptions::default()
        };
        options.anchor_paths(Path::new("/project"));
        assert_eq!(options.base, Some(PathBuf::from("/project/dist")));
        assert_eq!(options.output, Some(PathBuf::from("/abs/out")));
    }
}
