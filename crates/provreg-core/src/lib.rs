//! Core library for provreg.
//!
//! Holds the immutable [`RegistryConfig`] and the three filesystem-backed
//! services the HTTP layer composes:
//!
//! - [`ArtifactCatalog`]: coordinate to on-disk path resolution, confined to
//!   the artifacts root.
//! - [`integrity`]: streaming SHA-256 of artifacts.
//! - [`SigningKeyStore`]: GPG public key loading with graceful degradation.
//!
//! # Directory Layout
//!
//! ```text
//! <root>/
//! ├── providers/{os}_{arch}/terraform-provider-{name}_v{version}.zip
//! ├── providers/{os}_{arch}/SHA256SUMS
//! ├── providers/{os}_{arch}/SHA256SUMS.sig
//! ├── gpg-keys/public-key.asc
//! └── gpg-keys/key-id.txt
//! ```

pub mod catalog;
pub mod config;
pub mod integrity;
pub mod keys;

pub use catalog::{ArtifactCatalog, ArtifactLocation, CatalogError};
pub use config::{AuthMode, AuthToken, RegistryConfig};
pub use integrity::{ChecksumCheck, IntegrityError};
pub use keys::SigningKeyStore;
