//! The user attached to a request.
//!
//! Sessions are established outside this crate; whatever authenticates the
//! request inserts a [`User`] into the request extensions.

use axum::{extract::FromRequestParts, http::request::Parts};
use tributary_remote::User;

use crate::error::AppError;

/// The current user, if any.
pub struct CurrentUser(pub Option<User>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentUser(parts.extensions.get::<User>().cloned()))
    }
}

/// The current user; rejects the request with 401 when there is none.
pub struct RequireUser(pub User);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(RequireUser)
            .ok_or(AppError::Unauthorized)
    }
}
