//! Target platforms and their `{os}_{arch}` directory names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors produced when parsing an `{os}_{arch}` platform directory name.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PlatformError {
    /// The name does not contain the `_` separator.
    #[error("Invalid platform '{0}': expected <os>_<arch>")]
    MissingSeparator(String),

    /// Either half of the name is empty.
    #[error("Invalid platform '{0}': os and arch must be non-empty")]
    EmptyComponent(String),
}

/// An (os, arch) pair in the naming scheme registry clients use
/// (`linux`/`darwin`/`windows`, `amd64`/`arm64`/...).
///
/// # Example
///
/// ```
/// use provreg_schema::Platform;
///
/// let p: Platform = "linux_amd64".parse().unwrap();
/// assert_eq!(p.os, "linux");
/// assert_eq!(p.dir_name(), "linux_amd64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Platform {
    /// Operating system, e.g. `linux`.
    pub os: String,
    /// CPU architecture, e.g. `amd64`.
    pub arch: String,
}

impl Platform {
    /// Create a platform from its two components.
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform of the running host.
    ///
    /// Rust target names are translated to the registry convention, so an
    /// `x86_64` Linux build reports `linux_amd64` and Apple Silicon reports
    /// `darwin_arm64`.
    pub fn host() -> Self {
        Self::new(
            os_name(std::env::consts::OS),
            arch_name(std::env::consts::ARCH),
        )
    }

    /// Directory name under the artifacts root: `{os}_{arch}`.
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.os, self.arch)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

impl FromStr for Platform {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (os, arch) = s
            .split_once('_')
            .ok_or_else(|| PlatformError::MissingSeparator(s.to_string()))?;
        if os.is_empty() || arch.is_empty() {
            return Err(PlatformError::EmptyComponent(s.to_string()));
        }
        Ok(Self::new(os, arch))
    }
}

fn os_name(rust_os: &str) -> &str {
    match rust_os {
        "macos" => "darwin",
        other => other,
    }
}

fn arch_name(rust_arch: &str) -> &str {
    match rust_arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64",
        other => other,
    }
}
