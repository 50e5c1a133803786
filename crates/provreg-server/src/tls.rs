//! TLS bootstrap.
//!
//! Loads the PEM certificate chain and private key once at startup. Any
//! failure here is fatal: the registry only ever speaks HTTPS.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustls::ServerConfig;
use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};

/// Oldest protocol version offered is TLS 1.2.
static PROTOCOL_VERSIONS: &[&rustls::SupportedProtocolVersion] =
    &[&rustls::version::TLS13, &rustls::version::TLS12];

/// Errors produced while loading TLS material.
#[derive(thiserror::Error, Debug)]
pub enum TlsError {
    /// A PEM file does not exist.
    #[error("{kind} file not found: {}", path.display())]
    MissingFile {
        /// "Certificate" or "Key".
        kind: &'static str,
        /// Expected location.
        path: PathBuf,
    },

    /// A PEM file could not be read or decoded.
    #[error("Failed to load {}: {source}", path.display())]
    Pem {
        /// File that failed.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: rustls::pki_types::pem::Error,
    },

    /// The certificate file holds no certificate.
    #[error("No certificates found in {}", .0.display())]
    NoCertificates(PathBuf),

    /// rustls rejected the certificate/key pair.
    #[error("Invalid TLS configuration: {0}")]
    Rustls(#[from] rustls::Error),
}

/// Build the server-side TLS configuration from two PEM files.
///
/// Offers TLS 1.3 and 1.2 only, and ALPN `h2` / `http/1.1`.
pub fn load_server_config(cert: &Path, key: &Path) -> Result<ServerConfig, TlsError> {
    for (kind, path) in [("Certificate", cert), ("Key", key)] {
        if !path.exists() {
            return Err(TlsError::MissingFile {
                kind,
                path: path.to_path_buf(),
            });
        }
    }

    let pem_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source: rustls::pki_types::pem::Error| TlsError::Pem { path, source }
    };

    let certs = CertificateDer::pem_file_iter(cert)
        .map_err(pem_error(cert))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(pem_error(cert))?;
    if certs.is_empty() {
        return Err(TlsError::NoCertificates(cert.to_path_buf()));
    }

    let private_key = PrivateKeyDer::from_pem_file(key).map_err(pem_error(key))?;

    let mut config =
        ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_protocol_versions(PROTOCOL_VERSIONS)?
            .with_no_client_auth()
            .with_single_cert(certs, private_key)?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(config)
}
