use std::ops::Deref;
use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use tributary_remote::Remote;

use crate::error::AppError;

/// The remote bound to the current request by
/// [`RemoteLayer`](crate::middleware::RemoteLayer).
#[derive(Clone)]
pub struct BoundRemote(pub Arc<dyn Remote>);

impl Deref for BoundRemote {
    type Target = dyn Remote;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for BoundRemote
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BoundRemote>()
            .cloned()
            .ok_or_else(|| AppError::Internal("no remote bound to request".to_string()))
    }
}
