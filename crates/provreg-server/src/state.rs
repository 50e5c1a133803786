//! Shared handler state.

use std::sync::Arc;

use provreg_core::{ArtifactCatalog, RegistryConfig, SigningKeyStore};

/// Read-only state shared by every handler.
#[derive(Debug)]
pub struct RegistryState {
    /// Deployment configuration.
    pub config: Arc<RegistryConfig>,
    /// Resolves coordinates under `<root>/providers`.
    pub catalog: ArtifactCatalog,
    /// Loads `<root>/gpg-keys/*`.
    pub keys: SigningKeyStore,
}

impl RegistryState {
    /// Derive the catalog and key store from `config`.
    pub fn new(config: Arc<RegistryConfig>) -> Self {
        let catalog = ArtifactCatalog::new(config.artifacts_root());
        let keys = SigningKeyStore::new(config.public_key_path(), config.key_id_path());
        Self {
            config,
            catalog,
            keys,
        }
    }
}
