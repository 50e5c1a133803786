//! JSON documents of the provider registry protocol.
//!
//! Field names follow the protocol exactly; every type here is built fresh
//! per request and serialized straight into a response body.

use serde::{Deserialize, Serialize};

use crate::{Platform, Sha256Digest};

/// Service discovery document served at `/.well-known/terraform.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDiscovery {
    /// Base URL of the provider protocol endpoints.
    #[serde(rename = "providers.v1")]
    pub providers_v1: String,
}

/// Response of `GET /v1/providers/{namespace}/{name}/versions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderVersions {
    /// Every published version (this registry serves exactly one).
    pub versions: Vec<ProviderVersion>,
}

/// One published version and where it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderVersion {
    /// Version string.
    pub version: String,
    /// Plugin protocol versions the provider speaks.
    pub protocols: Vec<String>,
    /// Platforms with a published archive.
    pub platforms: Vec<Platform>,
}

/// Response of the download endpoint: everything a client needs to fetch and
/// verify one archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadDescriptor {
    /// Plugin protocol versions the provider speaks.
    pub protocols: Vec<String>,
    /// Target operating system.
    pub os: String,
    /// Target architecture.
    pub arch: String,
    /// Archive file name.
    pub filename: String,
    /// Absolute URL of the archive.
    pub download_url: String,
    /// Absolute URL of the `SHA256SUMS` list.
    pub shasums_url: String,
    /// Absolute URL of the detached `SHA256SUMS.sig` signature.
    pub shasums_signature_url: String,
    /// SHA-256 of the archive.
    pub shasum: Sha256Digest,
    /// Keys able to verify the signature.
    pub signing_keys: SigningKeys,
}

/// Signing-key set, as embedded in descriptors and served on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKeys {
    /// ASCII-armored GPG public keys.
    pub gpg_public_keys: Vec<SigningKeyRecord>,
}

impl SigningKeys {
    /// A set holding no keys.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// One GPG public key and its identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKeyRecord {
    /// Key identifier (long hex form).
    pub key_id: String,
    /// ASCII-armored public key block.
    pub ascii_armor: String,
    /// Trust signature; empty for self-published keys.
    pub trust_signature: String,
    /// Human-readable key owner; empty for self-published keys.
    pub source: String,
    /// Link describing the key owner.
    pub source_url: Option<String>,
}

/// Body of every error response: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Client-facing message.
    pub error: String,
}
