//! Bearer-token auth gate.
//!
//! Wraps protected routes as an axum `route_layer`: a request must carry
//! `Authorization: Bearer <token>` with the configured token, otherwise it
//! is answered with 401 and the wrapped handler never runs.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use provreg_core::{AuthMode, AuthToken, RegistryConfig};

use crate::error::ApiError;

const BEARER_PREFIX: &str = "Bearer ";

/// Middleware checking the bearer credential against `token`.
pub async fn require_bearer(
    State(token): State<Arc<AuthToken>>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(HeaderValue::to_str);

    let rejection = match presented {
        None => Some("missing authorization header"),
        Some(Err(_)) => Some("malformed authorization header"),
        Some(Ok(value)) => match value.strip_prefix(BEARER_PREFIX) {
            None => Some("authorization header must use the Bearer scheme"),
            Some(candidate) if !token.matches(candidate) => Some("invalid token"),
            Some(_) => None,
        },
    };

    if let Some(reason) = rejection {
        tracing::warn!("Rejected {} {}: {reason}", request.method(), request.uri().path());
        return ApiError::Unauthorized(reason).into_response();
    }

    tracing::info!(
        "Authenticated {} {}",
        request.method(),
        request.uri().path()
    );
    next.run(request).await
}

/// Put every route of `router` behind the gate, unless auth is disabled.
///
/// Uses `route_layer`, so unmatched paths still fall through to the 404
/// fallback instead of answering 401.
pub fn protect<S>(router: Router<S>, config: &RegistryConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    match config.auth {
        AuthMode::Required => {
            let token = Arc::new(config.token.clone());
            router.route_layer(middleware::from_fn_with_state(token, require_bearer))
        }
        AuthMode::Disabled => {
            tracing::warn!("Auth gate disabled: protected routes are open");
            router
        }
    }
}
