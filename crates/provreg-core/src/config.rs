//! Registry configuration.
//!
//! Built once at startup, then shared read-only (behind an `Arc`) by the
//! router, the auth gate and every handler. Nothing here changes while the
//! server runs.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use provreg_schema::Platform;

/// Token used when no override is configured.
pub const DEFAULT_TOKEN: &str = "my-registry-token";

/// Directory under the root holding one `{os}_{arch}` directory per platform.
pub const PROVIDERS_DIR: &str = "providers";

/// Directory under the root holding the GPG public key and its identifier.
pub const GPG_KEYS_DIR: &str = "gpg-keys";

/// The single shared secret protected routes are checked against.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap an explicit token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Resolve the token from an optional override.
    ///
    /// An unset or empty override falls back to [`DEFAULT_TOKEN`]; an empty
    /// token would otherwise accept a bare `Bearer ` header.
    pub fn from_override(value: Option<String>) -> Self {
        match value {
            Some(token) if !token.is_empty() => Self(token),
            _ => Self(DEFAULT_TOKEN.to_string()),
        }
    }

    /// Compare a presented credential against this token.
    ///
    /// Runs over every byte once lengths agree, so the time taken does not
    /// depend on where the first mismatch is.
    pub fn matches(&self, presented: &str) -> bool {
        let expected = self.0.as_bytes();
        let presented = presented.as_bytes();
        if expected.len() != presented.len() {
            return false;
        }
        expected
            .iter()
            .zip(presented)
            .fold(0u8, |acc, (x, y)| acc | (x ^ y))
            == 0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

impl Default for AuthToken {
    fn default() -> Self {
        Self(DEFAULT_TOKEN.to_string())
    }
}

/// Whether protected routes sit behind the auth gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Routes 2 and 3 require `Authorization: Bearer <token>`.
    #[default]
    Required,
    /// Every route is open.
    Disabled,
}

/// Immutable configuration of one registry deployment.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Socket address the HTTPS listener binds.
    pub bind: SocketAddr,
    /// `host:port` advertised in every absolute URL handed to clients.
    pub public_host: String,
    /// Registry namespace served.
    pub namespace: String,
    /// Provider name served.
    pub provider: String,
    /// The single published version.
    pub version: String,
    /// Plugin protocol versions advertised for that version.
    pub protocols: Vec<String>,
    /// Server root; relative paths below resolve against it.
    pub root: PathBuf,
    /// PEM certificate chain.
    pub cert: PathBuf,
    /// PEM private key.
    pub key: PathBuf,
    /// Shared bearer token.
    pub token: AuthToken,
    /// Auth gate mode for protected routes.
    pub auth: AuthMode,
    /// Platform used when a request omits `os`/`arch`; `None` means the host's.
    pub default_platform: Option<Platform>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5758)),
            public_host: "localhost:5758".to_string(),
            namespace: "makinzm".to_string(),
            provider: "mylocal".to_string(),
            version: "1.0.0".to_string(),
            protocols: vec!["5.0".to_string()],
            root: PathBuf::from("."),
            cert: PathBuf::from("localhost+2.pem"),
            key: PathBuf::from("localhost+2-key.pem"),
            token: AuthToken::default(),
            auth: AuthMode::Required,
            default_platform: None,
        }
    }
}

impl RegistryConfig {
    /// `https://<public_host>`
    pub fn base_url(&self) -> String {
        format!("https://{}", self.public_host)
    }

    /// Value advertised under `providers.v1` in the discovery document.
    pub fn providers_base_url(&self) -> String {
        format!("{}/v1/providers/", self.base_url())
    }

    /// `<root>/providers`
    pub fn artifacts_root(&self) -> PathBuf {
        self.root.join(PROVIDERS_DIR)
    }

    /// `<root>/gpg-keys/public-key.asc`
    pub fn public_key_path(&self) -> PathBuf {
        self.root.join(GPG_KEYS_DIR).join("public-key.asc")
    }

    /// `<root>/gpg-keys/key-id.txt`
    pub fn key_id_path(&self) -> PathBuf {
        self.root.join(GPG_KEYS_DIR).join("key-id.txt")
    }

    /// Certificate path, resolved against the root when relative.
    pub fn cert_path(&self) -> PathBuf {
        self.resolve(&self.cert)
    }

    /// Private key path, resolved against the root when relative.
    pub fn key_path(&self) -> PathBuf {
        self.resolve(&self.key)
    }

    /// Whether a request names the provider this deployment serves.
    pub fn serves(&self, namespace: &str, name: &str, version: Option<&str>) -> bool {
        namespace == self.namespace
            && name == self.provider
            && version.is_none_or(|v| v == self.version)
    }

    /// The configured default platform, or the host's.
    pub fn fallback_platform(&self) -> Platform {
        self.default_platform.clone().unwrap_or_else(Platform::host)
    }

    /// Fill missing (absent or empty) `os`/`arch` from the fallback platform.
    pub fn platform_or_default(&self, os: Option<String>, arch: Option<String>) -> Platform {
        let fallback = self.fallback_platform();
        Platform::new(
            os.filter(|s| !s.is_empty()).unwrap_or(fallback.os),
            arch.filter(|s| !s.is_empty()).unwrap_or(fallback.arch),
        )
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}
