//! Signing-key store.
//!
//! Key distribution is advisory metadata: clients verify `SHA256SUMS.sig`
//! with these keys, but a missing key file must never fail a download
//! response. Any read failure degrades to an empty key set.

use std::path::PathBuf;

use provreg_schema::{SigningKeyRecord, SigningKeys};

/// Loads the GPG public key and its identifier from two files.
#[derive(Debug, Clone)]
pub struct SigningKeyStore {
    public_key: PathBuf,
    key_id: PathBuf,
}

impl SigningKeyStore {
    /// Create a store reading the ASCII-armored key and key-id files.
    pub fn new(public_key: impl Into<PathBuf>, key_id: impl Into<PathBuf>) -> Self {
        Self {
            public_key: public_key.into(),
            key_id: key_id.into(),
        }
    }

    /// Read both files and build the key set.
    ///
    /// Returns an empty set (and logs a warning) if either file cannot be
    /// read. The key id is trimmed; the armor is passed through verbatim.
    pub async fn load(&self) -> SigningKeys {
        let ascii_armor = match tokio::fs::read_to_string(&self.public_key).await {
            Ok(armor) => armor,
            Err(e) => {
                tracing::warn!(
                    "Could not read public key {}: {e}",
                    self.public_key.display()
                );
                return SigningKeys::empty();
            }
        };

        let key_id = match tokio::fs::read_to_string(&self.key_id).await {
            Ok(id) => id.trim().to_string(),
            Err(e) => {
                tracing::warn!("Could not read key ID {}: {e}", self.key_id.display());
                return SigningKeys::empty();
            }
        };

        SigningKeys {
            gpg_public_keys: vec![SigningKeyRecord {
                key_id,
                ascii_armor,
                trust_signature: String::new(),
                source: String::new(),
                source_url: None,
            }],
        }
    }
}
