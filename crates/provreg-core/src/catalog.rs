//! Artifact catalog: coordinate to filesystem path resolution.
//!
//! Path construction is pure and never touches the disk; existence is
//! checked lazily by whoever opens the file. Every resolved path stays
//! beneath the artifacts root.

use std::path::{Path, PathBuf};

use provreg_schema::{ArtifactCoordinate, Platform};

/// Name of the checksum list in each platform directory.
pub const SHASUMS_FILE: &str = "SHA256SUMS";

/// Name of the detached checksum-list signature in each platform directory.
pub const SHASUMS_SIG_FILE: &str = "SHA256SUMS.sig";

/// Errors produced while resolving a coordinate.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    /// A coordinate component could name something outside its directory.
    #[error("Unsafe path segment: {0:?}")]
    UnsafeSegment(String),
}

/// Where the three files of one artifact live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    /// Archive file name (also the last component of `archive`).
    pub filename: String,
    /// The distributable archive.
    pub archive: PathBuf,
    /// The platform's `SHA256SUMS` list.
    pub shasums: PathBuf,
    /// The detached signature over `shasums`.
    pub signature: PathBuf,
}

/// Resolves coordinates to files under a fixed artifacts root.
#[derive(Debug, Clone)]
pub struct ArtifactCatalog {
    root: PathBuf,
}

impl ArtifactCatalog {
    /// Create a catalog rooted at `root` (normally `<server root>/providers`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the archive, checksum list and signature of `coord`.
    ///
    /// Rejects any component that is empty, `.`, `..`, or contains a path
    /// separator, so the result is always `<root>/{os}_{arch}/<file>`.
    pub fn locate(&self, coord: &ArtifactCoordinate) -> Result<ArtifactLocation, CatalogError> {
        for segment in [&coord.os, &coord.arch, &coord.name, &coord.version] {
            safe_segment(segment)?;
        }

        let dir = self.platform_dir(&coord.platform());
        let filename = coord.archive_filename();
        Ok(ArtifactLocation {
            archive: dir.join(&filename),
            shasums: dir.join(SHASUMS_FILE),
            signature: dir.join(SHASUMS_SIG_FILE),
            filename,
        })
    }

    /// Resolve a raw `/providers/{platform}/{filename}` request.
    ///
    /// Both segments are reduced to their last component first, so
    /// `../../etc/passwd` becomes `passwd`. Returns `None` when nothing
    /// usable remains (e.g. a bare `..`).
    pub fn resolve_file(&self, platform: &str, filename: &str) -> Option<PathBuf> {
        let platform = base_component(platform)?;
        let filename = base_component(filename)?;
        let path = self.root.join(platform).join(filename);
        path.starts_with(&self.root).then_some(path)
    }

    /// Platforms with a published archive for `name`/`version`, sorted.
    ///
    /// Scans `{os}_{arch}` directories under the root. An unreadable root
    /// yields an empty list; a read error mid-scan keeps what was found.
    pub async fn published_platforms(
        &self,
        namespace: &str,
        name: &str,
        version: &str,
    ) -> Vec<Platform> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Cannot scan {}: {e}", self.root.display());
                return Vec::new();
            }
        };

        let mut platforms = Vec::new();
        while let Some(entry) = scan_step(entries.next_entry().await, &self.root) {
            let Some(platform) = entry
                .file_name()
                .to_str()
                .and_then(|n| n.parse::<Platform>().ok())
            else {
                continue;
            };
            let coord = ArtifactCoordinate::new(namespace, name, version, platform);
            let Ok(location) = self.locate(&coord) else {
                continue;
            };
            if tokio::fs::metadata(&location.archive)
                .await
                .is_ok_and(|m| m.is_file())
            {
                platforms.push(coord.platform());
            }
        }
        platforms.sort();
        platforms
    }

    fn platform_dir(&self, platform: &Platform) -> PathBuf {
        self.root.join(platform.dir_name())
    }
}

fn safe_segment(segment: &str) -> Result<&str, CatalogError> {
    let unsafe_segment = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0']);
    if unsafe_segment {
        return Err(CatalogError::UnsafeSegment(segment.to_string()));
    }
    Ok(segment)
}

/// Next directory entry, or `None` at the end of the listing or on a read
/// error (logged, since the listing is then incomplete).
fn scan_step<T>(next: std::io::Result<Option<T>>, root: &Path) -> Option<T> {
    next.unwrap_or_else(|e| {
        tracing::warn!("Platform scan of {} stopped early: {e}", root.display());
        None
    })
}

/// Last `/`- or `\`-separated component, if it is a plain name.
fn base_component(raw: &str) -> Option<&str> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    safe_segment(base).ok()
}
