//! Error responses of the HTTP surface.
//!
//! Every failure leaves the server as `{"error": "<message>"}`. Messages are
//! fixed strings: filesystem paths and I/O details go to the log only.

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use provreg_schema::ErrorBody;

/// Failure of a request, rendered as a JSON error body.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Missing, malformed or wrong bearer credential.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Artifact, checksum list, signature or route absent.
    #[error("{0}")]
    NotFound(&'static str),

    /// Known route, unsupported method.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Any other failure.
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    /// HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        match self {
            Self::Unauthorized(_) => (
                self.status(),
                [(header::WWW_AUTHENTICATE, "Bearer")],
                body,
            )
                .into_response(),
            _ => (self.status(), body).into_response(),
        }
    }
}
