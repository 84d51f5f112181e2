//! Digest algorithms accepted in an `integrity` attribute.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// SHA-2 strengths a browser accepts for subresource integrity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Algorithm {
    Sha256,
    #[default]
    Sha384,
    Sha512,
}

impl Algorithm {
    /// Every supported algorithm, weakest first.
    pub const ALL: [Self; 3] = [Self::Sha256, Self::Sha384, Self::Sha512];

    /// Name used as the `integrity` value prefix.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    /// Digest `content` and encode it as standard (padded) base64.
    pub fn digest_base64(self, content: &[u8]) -> String {
        match self {
            Self::Sha256 => BASE64.encode(Sha256::digest(content)),
            Self::Sha384 => BASE64.encode(Sha384::digest(content)),
            Self::Sha512 => BASE64.encode(Sha512::digest(content)),
        }
    }

    /// Compose the full attribute value: `<algorithm>-<base64 digest>`.
    pub fn integrity(self, content: &[u8]) -> String {
        format!("{}-{}", self.name(), self.digest_base64(content))
    }

    /// Comma-separated list of supported names, for diagnostics.
    pub fn supported() -> String {
        Self::ALL.map(Self::name).join(", ")
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|algo| algo.name() == s)
            .ok_or_else(|| ConfigError::UnsupportedAlgorithm { name: s.to_string() })
    }
}
