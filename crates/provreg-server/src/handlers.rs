//! Registry protocol handlers.
//!
//! Handlers are stateless: they read the shared [`RegistryState`] and the
//! filesystem, build a response, and keep nothing afterwards.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::Response;
use provreg_core::integrity::{self, ChecksumCheck};
use provreg_schema::{
    ArtifactCoordinate, ChecksumList, DownloadDescriptor, Platform, ProviderVersion,
    ProviderVersions, ServiceDiscovery, SigningKeys,
};
use serde::Deserialize;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::error::ApiError;
use crate::state::RegistryState;

const PROVIDER_MISSING: &str = "provider not found";
const ARCHIVE_MISSING: &str = "provider binary not found";
const SHASUMS_MISSING: &str = "SHA256SUMS not found";
const SIGNATURE_MISSING: &str = "signature not found";

const CONTENT_CHECKSUMS: &str = "text/plain";
const CONTENT_SIGNATURE: &str = "application/pgp-signature";
const CONTENT_ARCHIVE: &str = "application/octet-stream";

/// Optional `?os=&arch=` query; missing values fall back to the default platform.
#[derive(Debug, Default, Deserialize)]
pub struct PlatformQuery {
    /// Target operating system.
    pub os: Option<String>,
    /// Target architecture.
    pub arch: Option<String>,
}

/// `GET /.well-known/terraform.json`
pub async fn discovery(State(state): State<Arc<RegistryState>>) -> Json<ServiceDiscovery> {
    tracing::info!("Service discovery");
    Json(ServiceDiscovery {
        providers_v1: state.config.providers_base_url(),
    })
}

/// `GET /v1/providers/{namespace}/{name}/versions`
pub async fn versions(
    State(state): State<Arc<RegistryState>>,
    Path((namespace, name)): Path<(String, String)>,
) -> Result<Json<ProviderVersions>, ApiError> {
    tracing::info!("Provider versions: {namespace}/{name}");
    let config = &state.config;
    if !config.serves(&namespace, &name, None) {
        return Err(ApiError::NotFound(PROVIDER_MISSING));
    }

    let mut platforms = state
        .catalog
        .published_platforms(&namespace, &name, &config.version)
        .await;
    if platforms.is_empty() {
        platforms.push(config.fallback_platform());
    }

    Ok(Json(ProviderVersions {
        versions: vec![ProviderVersion {
            version: config.version.clone(),
            protocols: config.protocols.clone(),
            platforms,
        }],
    }))
}

/// `GET /v1/providers/{namespace}/{name}/{version}/download?os=&arch=`
pub async fn download(
    State(state): State<Arc<RegistryState>>,
    Path((namespace, name, version)): Path<(String, String, String)>,
    Query(query): Query<PlatformQuery>,
) -> Result<Json<DownloadDescriptor>, ApiError> {
    let platform = state.config.platform_or_default(query.os, query.arch);
    let coord = coordinate(&state, namespace, name, version, platform)?;
    describe(&state, &coord).await.map(Json)
}

/// `GET /v1/providers/{namespace}/{name}/{version}/download/{os}/{arch}`
pub async fn download_platform(
    State(state): State<Arc<RegistryState>>,
    Path((namespace, name, version, os, arch)): Path<(String, String, String, String, String)>,
) -> Result<Json<DownloadDescriptor>, ApiError> {
    let coord = coordinate(&state, namespace, name, version, Platform::new(os, arch))?;
    describe(&state, &coord).await.map(Json)
}

/// `GET /providers/{os}_{arch}/{filename}`
pub async fn archive(
    State(state): State<Arc<RegistryState>>,
    Path((platform, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    tracing::info!("Serving binary: {platform}/{filename}");
    let Some(path) = state.catalog.resolve_file(&platform, &filename) else {
        tracing::warn!("Rejected artifact path: {platform:?}/{filename:?}");
        return Err(ApiError::NotFound(ARCHIVE_MISSING));
    };
    let attachment = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string);
    serve_file(&path, CONTENT_ARCHIVE, ARCHIVE_MISSING, attachment.as_deref()).await
}

/// `GET /v1/providers/{namespace}/{name}/{version}/shasums?os=&arch=`
pub async fn shasums(
    State(state): State<Arc<RegistryState>>,
    Path((namespace, name, version)): Path<(String, String, String)>,
    Query(query): Query<PlatformQuery>,
) -> Result<Response, ApiError> {
    let platform = state.config.platform_or_default(query.os, query.arch);
    tracing::info!("Serving SHA256SUMS for {platform}");
    let coord = coordinate(&state, namespace, name, version, platform)?;
    let location = state
        .catalog
        .locate(&coord)
        .map_err(|_| ApiError::NotFound(SHASUMS_MISSING))?;
    serve_file(&location.shasums, CONTENT_CHECKSUMS, SHASUMS_MISSING, None).await
}

/// `GET /v1/providers/{namespace}/{name}/{version}/shasums.sig?os=&arch=`
pub async fn shasums_signature(
    State(state): State<Arc<RegistryState>>,
    Path((namespace, name, version)): Path<(String, String, String)>,
    Query(query): Query<PlatformQuery>,
) -> Result<Response, ApiError> {
    let platform = state.config.platform_or_default(query.os, query.arch);
    tracing::info!("Serving SHA256SUMS.sig for {platform}");
    let coord = coordinate(&state, namespace, name, version, platform)?;
    let location = state
        .catalog
        .locate(&coord)
        .map_err(|_| ApiError::NotFound(SIGNATURE_MISSING))?;
    serve_file(&location.signature, CONTENT_SIGNATURE, SIGNATURE_MISSING, None).await
}

/// `GET /v1/providers/{namespace}/{name}/{version}/signing-keys`
pub async fn signing_keys(
    State(state): State<Arc<RegistryState>>,
    Path((namespace, name, version)): Path<(String, String, String)>,
) -> Result<Json<SigningKeys>, ApiError> {
    tracing::info!("Serving signing keys");
    if !state.config.serves(&namespace, &name, Some(&version)) {
        return Err(ApiError::NotFound(PROVIDER_MISSING));
    }
    Ok(Json(state.keys.load().await))
}

/// Fallback for unknown routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("not found")
}

/// Fallback for known routes hit with an unsupported method.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn coordinate(
    state: &RegistryState,
    namespace: String,
    name: String,
    version: String,
    platform: Platform,
) -> Result<ArtifactCoordinate, ApiError> {
    if !state.config.serves(&namespace, &name, Some(&version)) {
        return Err(ApiError::NotFound(PROVIDER_MISSING));
    }
    Ok(ArtifactCoordinate::new(namespace, name, version, platform))
}

async fn describe(
    state: &RegistryState,
    coord: &ArtifactCoordinate,
) -> Result<DownloadDescriptor, ApiError> {
    tracing::info!("Provider download: {}/{}", coord.os, coord.arch);

    let location = state.catalog.locate(coord).map_err(|e| {
        tracing::warn!("Cannot locate {coord}: {e}");
        ApiError::NotFound(ARCHIVE_MISSING)
    })?;

    // Unreadable means "not published" to the client, whatever the cause.
    let shasum = integrity::sha256_file(&location.archive)
        .await
        .map_err(|e| {
            tracing::warn!("{e}");
            ApiError::NotFound(ARCHIVE_MISSING)
        })?;
    tracing::info!("SHA256: {shasum}");

    match tokio::fs::read_to_string(&location.shasums).await {
        Ok(text) => {
            let list = ChecksumList::parse(&text);
            match integrity::cross_check(&list, &location.filename, &shasum) {
                ChecksumCheck::Match => {}
                ChecksumCheck::Mismatch { listed } => tracing::warn!(
                    "{} lists {listed} for {}, archive hashes to {shasum}",
                    location.shasums.display(),
                    location.filename
                ),
                ChecksumCheck::NotListed => tracing::debug!(
                    "{} does not list {}",
                    location.shasums.display(),
                    location.filename
                ),
            }
        }
        Err(e) => tracing::debug!("No checksum list at {}: {e}", location.shasums.display()),
    }

    let base = state.config.base_url();
    let release = format!(
        "{base}/v1/providers/{}/{}/{}",
        coord.namespace, coord.name, coord.version
    );
    let query = format!("os={}&arch={}", coord.os, coord.arch);

    Ok(DownloadDescriptor {
        protocols: state.config.protocols.clone(),
        os: coord.os.clone(),
        arch: coord.arch.clone(),
        download_url: format!(
            "{base}/providers/{}/{}",
            coord.platform().dir_name(),
            location.filename
        ),
        shasums_url: format!("{release}/shasums?{query}"),
        shasums_signature_url: format!("{release}/shasums.sig?{query}"),
        filename: location.filename,
        shasum,
        signing_keys: state.keys.load().await,
    })
}

/// Stream a file as the response body.
///
/// Absent files (or a directory in their place) map to 404 with `missing`;
/// any other I/O failure maps to a bare 500.
async fn serve_file(
    path: &FsPath,
    content_type: &'static str,
    missing: &'static str,
    attachment: Option<&str>,
) -> Result<Response, ApiError> {
    use std::io::ErrorKind;

    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            tracing::warn!("Not found: {}", path.display());
            return Err(ApiError::NotFound(missing));
        }
        Err(e) => {
            tracing::error!("Failed to open {}: {e}", path.display());
            return Err(ApiError::Internal);
        }
    };

    let metadata = file.metadata().await.map_err(|e| {
        tracing::error!("Failed to stat {}: {e}", path.display());
        ApiError::Internal
    })?;
    if !metadata.is_file() {
        tracing::warn!("Not a regular file: {}", path.display());
        return Err(ApiError::NotFound(missing));
    }

    tracing::info!("Serving: {}", path.display());
    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, metadata.len());
    if let Some(name) = attachment {
        builder = builder.header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{name}\""),
        );
    }

    builder
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| {
            tracing::error!("Failed to build response for {}: {e}", path.display());
            ApiError::Internal
        })
}
