//! provreg - private provider registry over HTTPS.
//!
//! Serves one provider (namespace, name, single version) to Terraform-style
//! clients: service discovery, version listing, download descriptors, and
//! the archive, checksum and signature files themselves. Version listing and
//! download descriptors sit behind a shared bearer token; everything a
//! client fetches afterwards is public.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use clap::builder::FalseyValueParser;
use provreg_core::{AuthMode, AuthToken, RegistryConfig};
use provreg_schema::Platform;

pub mod auth;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod tls;

/// Command-line and environment configuration.
#[derive(Parser, Debug)]
#[command(name = "provreg")]
#[command(author, version, about = "provreg - private provider registry over HTTPS")]
pub struct Cli {
    /// Address the HTTPS listener binds
    #[arg(long, env = "PROVREG_BIND", default_value = "127.0.0.1:5758")]
    pub bind: SocketAddr,

    /// host:port advertised in generated URLs
    #[arg(long, env = "PROVREG_PUBLIC_HOST", default_value = "localhost:5758")]
    pub public_host: String,

    /// Namespace served
    #[arg(long, env = "PROVREG_NAMESPACE", default_value = "makinzm")]
    pub namespace: String,

    /// Provider name served
    #[arg(long, env = "PROVREG_PROVIDER", default_value = "mylocal")]
    pub provider: String,

    /// The single published version
    #[arg(long = "provider-version", env = "PROVREG_VERSION", default_value = "1.0.0")]
    pub provider_version: String,

    /// Plugin protocol versions (comma-separated)
    #[arg(
        long = "protocol",
        env = "PROVREG_PROTOCOLS",
        value_delimiter = ',',
        default_value = "5.0"
    )]
    pub protocols: Vec<String>,

    /// Server root holding providers/ and gpg-keys/
    #[arg(long, env = "PROVREG_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// PEM certificate chain (relative paths resolve against the root)
    #[arg(long, env = "PROVREG_CERT", default_value = "localhost+2.pem")]
    pub cert: PathBuf,

    /// PEM private key (relative paths resolve against the root)
    #[arg(long, env = "PROVREG_KEY", default_value = "localhost+2-key.pem")]
    pub key: PathBuf,

    /// Shared bearer token for protected routes
    #[arg(long, env = "PROVREG_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Serve protected routes without a token
    #[arg(long, env = "PROVREG_NO_AUTH", value_parser = FalseyValueParser::new())]
    pub no_auth: bool,

    /// OS assumed when a request omits it (defaults to the host's)
    #[arg(long, env = "PROVREG_DEFAULT_OS", requires = "default_arch")]
    pub default_os: Option<String>,

    /// Architecture assumed when a request omits it (defaults to the host's)
    #[arg(long, env = "PROVREG_DEFAULT_ARCH", requires = "default_os")]
    pub default_arch: Option<String>,
}

impl Cli {
    /// Resolve into the immutable runtime configuration.
    pub fn into_config(self) -> RegistryConfig {
        let default_platform = match (self.default_os, self.default_arch) {
            (Some(os), Some(arch)) => Some(Platform::new(os, arch)),
            _ => None,
        };

        RegistryConfig {
            bind: self.bind,
            public_host: self.public_host,
            namespace: self.namespace,
            provider: self.provider,
            version: self.provider_version,
            protocols: self.protocols,
            root: self.root,
            cert: self.cert,
            key: self.key,
            token: AuthToken::from_override(self.token),
            auth: if self.no_auth {
                AuthMode::Disabled
            } else {
                AuthMode::Required
            },
            default_platform,
        }
    }
}
