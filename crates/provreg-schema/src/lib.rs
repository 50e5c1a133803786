//! Shared types and wire format for the provreg provider registry.
//!
//! Everything in this crate is pure data: coordinates naming a published
//! archive, the SHA-256 digest newtype, `SHA256SUMS` parsing, and the JSON
//! documents exchanged with registry clients. Filesystem access lives in
//! `provreg-core`.

pub mod checksums;
pub mod coordinate;
pub mod hash;
pub mod platform;
pub mod protocol;

// Re-exports
pub use checksums::ChecksumList;
pub use coordinate::ArtifactCoordinate;
pub use hash::{DigestError, Sha256Digest};
pub use platform::{Platform, PlatformError};
pub use protocol::*;

/// Prefix shared by every provider archive published through the registry.
pub const ARCHIVE_PREFIX: &str = "terraform-provider-";

/// Well-known path of the service discovery document.
pub const DISCOVERY_PATH: &str = "/.well-known/terraform.json";
