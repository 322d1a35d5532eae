use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tributary_core::PipelineError;
use tributary_remote::RemoteError;

/// Errors returned by handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A provider call failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The pipeline document could not be parsed or transformed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// No user is attached to the request.
    #[error("authentication required")]
    Unauthorized,

    /// Invalid parameters.
    #[error("{0}")]
    BadRequest(String),

    /// Internal error.
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Remote(e) => match e {
                RemoteError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
                RemoteError::PermissionDenied(_) => StatusCode::FORBIDDEN,
                RemoteError::NotFound(_) => StatusCode::NOT_FOUND,
                RemoteError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                RemoteError::TransportUnavailable(_) => StatusCode::BAD_GATEWAY,
                RemoteError::UnsupportedOperation { .. } => StatusCode::NOT_IMPLEMENTED,
            },
            Self::Pipeline(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let retry_after = match &self {
            Self::Remote(RemoteError::RateLimited { retry_after }) => *retry_after,
            _ => None,
        };

        let body = Json(ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.to_string(),
        });

        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
