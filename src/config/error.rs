//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::sri::{Algorithm, SelectorError};

/// Configuration-related errors.
///
/// All of these surface before the first document is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file not found: `{}`", .0.display())]
    NotFound(PathBuf),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Hashing algorithm is unsupported: `{name}` (expected one of {supported})", supported = Algorithm::supported())]
    UnsupportedAlgorithm { name: String },

    #[error("Invalid selector `{selector}`")]
    Selector {
        selector: String,
        #[source]
        source: SelectorError,
    },
}
