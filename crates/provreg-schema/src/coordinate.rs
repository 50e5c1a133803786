//! Artifact coordinates.

use serde::{Deserialize, Serialize};

use crate::{ARCHIVE_PREFIX, Platform};

/// Identifies exactly one distributable archive: one platform of one
/// published provider version.
///
/// Built from request parameters and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    /// Registry namespace (e.g. "makinzm")
    pub namespace: String,

    /// Provider name without the `terraform-provider-` prefix (e.g. "mylocal")
    pub name: String,

    /// Version string (e.g. "1.0.0")
    pub version: String,

    /// Target operating system
    pub os: String,

    /// Target architecture
    pub arch: String,
}

impl ArtifactCoordinate {
    /// Build a coordinate for `platform`.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        platform: Platform,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            version: version.into(),
            os: platform.os,
            arch: platform.arch,
        }
    }

    /// The (os, arch) pair of this coordinate.
    pub fn platform(&self) -> Platform {
        Platform::new(&self.os, &self.arch)
    }

    /// File name of the archive: `terraform-provider-{name}_v{version}.zip`.
    pub fn archive_filename(&self) -> String {
        format!("{ARCHIVE_PREFIX}{}_v{}.zip", self.name, self.version)
    }
}

impl std::fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}@{} ({}/{})",
            self.namespace, self.name, self.version, self.os, self.arch
        )
    }
}
