//! Axum router configuration
//!
//! ```text
//! /
//! ├── /.well-known/terraform.json                          - discovery (open)
//! ├── /v1/providers/{ns}/{name}/versions                   - versions (gated)
//! ├── /v1/providers/{ns}/{name}/{version}/download[/...]   - descriptor (gated)
//! ├── /v1/providers/{ns}/{name}/{version}/shasums[.sig]    - checksum list (open)
//! ├── /v1/providers/{ns}/{name}/{version}/signing-keys     - GPG keys (open)
//! └── /providers/{os}_{arch}/{filename}                    - archive bytes (open)
//! ```
//!
//! Archives are open because clients verify them through the signed
//! checksum list rather than through the gate.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use provreg_core::RegistryConfig;
use provreg_schema::DISCOVERY_PATH;

use crate::auth;
use crate::handlers;
use crate::state::RegistryState;

/// Build the complete router for `config`.
pub fn build_router(config: Arc<RegistryConfig>) -> Router {
    let state = Arc::new(RegistryState::new(config));

    let protected = Router::new()
        .route(
            "/v1/providers/{namespace}/{name}/versions",
            get(handlers::versions),
        )
        .route(
            "/v1/providers/{namespace}/{name}/{version}/download",
            get(handlers::download),
        )
        .route(
            "/v1/providers/{namespace}/{name}/{version}/download/",
            get(handlers::download),
        )
        .route(
            "/v1/providers/{namespace}/{name}/{version}/download/{os}/{arch}",
            get(handlers::download_platform),
        );

    let public = Router::new()
        .route(DISCOVERY_PATH, get(handlers::discovery))
        .route(
            "/v1/providers/{namespace}/{name}/{version}/shasums",
            get(handlers::shasums),
        )
        .route(
            "/v1/providers/{namespace}/{name}/{version}/shasums.sig",
            get(handlers::shasums_signature),
        )
        .route(
            "/v1/providers/{namespace}/{name}/{version}/signing-keys",
            get(handlers::signing_keys),
        )
        .route("/providers/{platform}/{filename}", get(handlers::archive));

    public
        .merge(auth::protect(protected, &state.config))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use provreg_core::{AuthMode, AuthToken};
    use provreg_schema::{DownloadDescriptor, Platform, ProviderVersions, ServiceDiscovery};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const TOKEN: &str = "test-token";
    const ARCHIVE: &str = "terraform-provider-mylocal_v1.0.0.zip";
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";
    const BASE: &str = "/v1/providers/makinzm/mylocal";

    struct Fixture {
        dir: TempDir,
        auth: AuthMode,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let platform_dir = dir.path().join("providers/linux_amd64");
            std::fs::create_dir_all(&platform_dir).unwrap();
            std::fs::write(platform_dir.join(ARCHIVE), b"abc").unwrap();
            std::fs::write(
                platform_dir.join("SHA256SUMS"),
                format!("{ABC_SHA256}  {ARCHIVE}\n"),
            )
            .unwrap();
            std::fs::write(platform_dir.join("SHA256SUMS.sig"), [0x89u8, 0x02, 0x33]).unwrap();
            Self {
                dir,
                auth: AuthMode::Required,
            }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn with_keys(self) -> Self {
            let keys = self.root().join("gpg-keys");
            std::fs::create_dir_all(&keys).unwrap();
            std::fs::write(keys.join("public-key.asc"), "-----BEGIN PGP PUBLIC KEY BLOCK-----\n")
                .unwrap();
            std::fs::write(keys.join("key-id.txt"), "51852D87348FFC4C\n").unwrap();
            self
        }

        fn router(&self) -> Router {
            build_router(Arc::new(RegistryConfig {
                root: self.root().to_path_buf(),
                public_host: "registry.test:5758".into(),
                token: AuthToken::new(TOKEN),
                auth: self.auth,
                default_platform: Some(Platform::new("linux", "amd64")),
                ..RegistryConfig::default()
            }))
        }

        async fn get(&self, uri: &str) -> Response {
            self.send(Request::builder().uri(uri)).await
        }

        async fn get_authed(&self, uri: &str) -> Response {
            self.send(
                Request::builder()
                    .uri(uri)
                    .header(header::AUTHORIZATION, format!("Bearer {TOKEN}")),
            )
            .await
        }

        async fn send(&self, builder: axum::http::request::Builder) -> Response {
            self.router()
                .oneshot(builder.body(Body::empty()).unwrap())
                .await
                .unwrap()
        }
    }

    async fn body_bytes(resp: Response) -> Vec<u8> {
        to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()
    }

    async fn body_json(resp: Response) -> Value {
        serde_json::from_slice(&body_bytes(resp).await).unwrap()
    }

    #[tokio::test]
    async fn discovery_advertises_provider_base() {
        let fx = Fixture::new();
        let resp = fx.get("/.well-known/terraform.json").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let doc: ServiceDiscovery = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(doc.providers_v1, "https://registry.test:5758/v1/providers/");
    }

    #[tokio::test]
    async fn versions_requires_bearer() {
        let fx = Fixture::new();
        let resp = fx.get(&format!("{BASE}/versions")).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(body_json(resp).await["error"].is_string());
    }

    #[tokio::test]
    async fn versions_lists_published_platforms() {
        let fx = Fixture::new();
        let darwin = fx.root().join("providers/darwin_arm64");
        std::fs::create_dir_all(&darwin).unwrap();
        std::fs::write(darwin.join(ARCHIVE), b"zip").unwrap();

        let resp = fx.get_authed(&format!("{BASE}/versions")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let doc: ProviderVersions = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(doc.versions.len(), 1);
        let version = &doc.versions[0];
        assert_eq!(version.version, "1.0.0");
        assert_eq!(version.protocols, vec!["5.0".to_string()]);
        assert_eq!(
            version.platforms,
            vec![Platform::new("darwin", "arm64"), Platform::new("linux", "amd64")]
        );
    }

    #[tokio::test]
    async fn versions_falls_back_to_default_platform() {
        let fx = Fixture::new();
        std::fs::remove_dir_all(fx.root().join("providers")).unwrap();
        let json = body_json(fx.get_authed(&format!("{BASE}/versions")).await).await;
        assert_eq!(
            json["versions"][0]["platforms"],
            serde_json::json!([{"os": "linux", "arch": "amd64"}])
        );
    }

    #[tokio::test]
    async fn download_describes_archive() {
        let fx = Fixture::new().with_keys();
        let resp = fx
            .get_authed(&format!("{BASE}/1.0.0/download/?os=linux&arch=amd64"))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let desc: DownloadDescriptor = serde_json::from_slice(&body_bytes(resp).await).unwrap();

        assert_eq!(desc.shasum.as_str(), ABC_SHA256);
        assert_eq!(desc.filename, ARCHIVE);
        assert_eq!((desc.os.as_str(), desc.arch.as_str()), ("linux", "amd64"));
        assert_eq!(desc.protocols, vec!["5.0".to_string()]);
        assert_eq!(
            desc.download_url,
            format!("https://registry.test:5758/providers/linux_amd64/{ARCHIVE}")
        );
        assert_eq!(
            desc.shasums_url,
            "https://registry.test:5758/v1/providers/makinzm/mylocal/1.0.0/shasums?os=linux&arch=amd64"
        );
        assert_eq!(
            desc.shasums_signature_url,
            "https://registry.test:5758/v1/providers/makinzm/mylocal/1.0.0/shasums.sig?os=linux&arch=amd64"
        );
        assert_eq!(desc.signing_keys.gpg_public_keys.len(), 1);
        assert_eq!(desc.signing_keys.gpg_public_keys[0].key_id, "51852D87348FFC4C");
    }

    #[tokio::test]
    async fn download_path_form_and_default_platform_agree() {
        let fx = Fixture::new();
        let by_path = body_json(
            fx.get_authed(&format!("{BASE}/1.0.0/download/linux/amd64"))
                .await,
        )
        .await;
        let by_default = body_json(fx.get_authed(&format!("{BASE}/1.0.0/download")).await).await;
        assert_eq!(by_path, by_default);
        assert_eq!(by_path["shasum"], ABC_SHA256);
    }

    #[tokio::test]
    async fn download_requires_bearer() {
        let fx = Fixture::new();
        let resp = fx.get(&format!("{BASE}/1.0.0/download/linux/amd64")).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn download_for_unpublished_platform_is_not_found() {
        let fx = Fixture::new();
        let resp = fx
            .get_authed(&format!("{BASE}/1.0.0/download/?os=windows&arch=arm64"))
            .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert!(json.get("shasum").is_none());
        assert_eq!(json["error"], "provider binary not found");
    }

    #[tokio::test]
    async fn download_without_key_files_still_succeeds() {
        let fx = Fixture::new();
        let resp = fx
            .get_authed(&format!("{BASE}/1.0.0/download/linux/amd64"))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["signing_keys"], serde_json::json!({"gpg_public_keys": []}));
    }

    #[tokio::test]
    async fn other_provider_coordinates_are_not_found() {
        let fx = Fixture::new();
        for uri in [
            "/v1/providers/other/mylocal/versions".to_string(),
            format!("{BASE}/2.0.0/download/linux/amd64"),
            "/v1/providers/makinzm/other/1.0.0/signing-keys".to_string(),
            format!("{BASE}/9.9.9/shasums?os=linux&arch=amd64"),
        ] {
            let resp = fx.get_authed(&uri).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn archive_streams_raw_bytes() {
        let fx = Fixture::new();
        let resp = fx.get(&format!("/providers/linux_amd64/{ARCHIVE}")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/octet-stream");
        assert_eq!(resp.headers()[header::CONTENT_LENGTH], "3");
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            format!("attachment; filename=\"{ARCHIVE}\"").as_str()
        );
        assert_eq!(body_bytes(resp).await, b"abc");
    }

    #[tokio::test]
    async fn archive_traversal_looks_like_plain_not_found() {
        let fx = Fixture::new();
        // a real file just outside the artifacts root
        std::fs::write(fx.root().join("secret.txt"), b"secret").unwrap();

        let plain = fx.get("/providers/linux_amd64/absent.zip").await;
        let plain_status = plain.status();
        let plain_body = body_bytes(plain).await;
        assert_eq!(plain_status, StatusCode::NOT_FOUND);

        for uri in [
            "/providers/linux_amd64/..%2F..%2Fetc%2Fpasswd",
            "/providers/linux_amd64/..%2F..%2Fsecret.txt",
            "/providers/..%2F..%2F/secret.txt",
            "/providers/linux_amd64/..",
            "/providers/linux_amd64/%2E%2E",
        ] {
            let resp = fx.get(uri).await;
            assert_eq!(resp.status(), plain_status, "{uri}");
            assert_eq!(body_bytes(resp).await, plain_body, "{uri}");
        }
    }

    #[tokio::test]
    async fn shasums_served_as_text() {
        let fx = Fixture::new();
        let resp = fx.get(&format!("{BASE}/1.0.0/shasums?os=linux&arch=amd64")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(
            String::from_utf8(body_bytes(resp).await).unwrap(),
            format!("{ABC_SHA256}  {ARCHIVE}\n")
        );
    }

    #[tokio::test]
    async fn signature_served_with_pgp_type() {
        let fx = Fixture::new();
        let resp = fx.get(&format!("{BASE}/1.0.0/shasums.sig")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/pgp-signature");
        assert_eq!(body_bytes(resp).await, vec![0x89u8, 0x02, 0x33]);
    }

    #[tokio::test]
    async fn checksum_files_missing_for_platform() {
        let fx = Fixture::new();
        let resp = fx.get(&format!("{BASE}/1.0.0/shasums?os=darwin&arch=arm64")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = fx.get(&format!("{BASE}/1.0.0/shasums.sig?os=darwin&arch=arm64")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn signing_keys_empty_when_files_missing() {
        let fx = Fixture::new();
        let resp = fx.get(&format!("{BASE}/1.0.0/signing-keys")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            String::from_utf8(body_bytes(resp).await).unwrap(),
            r#"{"gpg_public_keys":[]}"#
        );
    }

    #[tokio::test]
    async fn signing_keys_served_when_present() {
        let fx = Fixture::new().with_keys();
        let json = body_json(fx.get(&format!("{BASE}/1.0.0/signing-keys")).await).await;
        assert_eq!(json["gpg_public_keys"][0]["key_id"], "51852D87348FFC4C");
        assert!(json["gpg_public_keys"][0]["source_url"].is_null());
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let fx = Fixture::new();
        let resp = fx.get("/v2/nothing").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["error"], "not found");
    }

    #[tokio::test]
    async fn wrong_method_is_json_method_not_allowed() {
        let fx = Fixture::new();
        let resp = fx
            .send(
                Request::builder()
                    .method("POST")
                    .uri(format!("/providers/linux_amd64/{ARCHIVE}")),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_json(resp).await["error"], "method not allowed");
    }

    #[tokio::test]
    async fn download_reports_computed_digest_when_checksum_list_disagrees() {
        let fx = Fixture::new();
        let stale = "0".repeat(64);
        std::fs::write(
            fx.root().join("providers/linux_amd64/SHA256SUMS"),
            format!("{stale}  {ARCHIVE}\n"),
        )
        .unwrap();

        let resp = fx
            .get_authed(&format!("{BASE}/1.0.0/download?os=linux&arch=amd64"))
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let desc: DownloadDescriptor = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(desc.shasum.as_str(), ABC_SHA256);
    }

    #[tokio::test]
    async fn disabled_auth_opens_protected_routes() {
        let mut fx = Fixture::new();
        fx.auth = AuthMode::Disabled;
        let resp = fx.get(&format!("{BASE}/versions")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
