//! Login handlers.

use axum::{
    Form, Json,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use tributary_remote::{LoginRequest, RemoteError, User};
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::BoundRemote;
use crate::state::AppState;

/// Cookie carrying the OAuth `state` between the redirect and the callback.
pub const STATE_COOKIE: &str = "tributary_oauth_state";

const STATE_MAX_AGE_SECS: u32 = 600;

/// Query parameters of the OAuth callback.
#[derive(Debug, Default, Deserialize)]
pub struct AuthorizeQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Login form fields.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Public profile of the user who just logged in.
#[derive(Debug, Serialize)]
pub struct Profile {
    pub login: String,
    pub email: String,
    pub avatar: String,
}

impl From<User> for Profile {
    fn from(user: User) -> Self {
        Self {
            login: user.login,
            email: user.email,
            avatar: user.avatar,
        }
    }
}

/// `GET /authorize` - starts or completes a login.
///
/// With a `code` the OAuth exchange is completed. Without one the browser
/// is sent to the provider's authorization page, or to the login form when
/// the provider has no OAuth flow.
///
/// The `state` sent to the provider is also set in a cookie; a callback
/// whose `state` does not match that cookie is rejected.
#[instrument(skip_all, fields(remote = %remote.name()))]
pub async fn authorize(
    State(state): State<AppState>,
    remote: BoundRemote,
    headers: HeaderMap,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Response, AppError> {
    if let Some(error) = query.error {
        return Err(RemoteError::authentication(query.error_description.unwrap_or(error)).into());
    }

    let server = &state.settings().server;
    let redirect = server.link("/authorize");
    let secure = server.public_url.starts_with("https://");

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        let oauth_state = Uuid::new_v4().to_string();
        let Some(target) = remote.authorize_url(&redirect, &oauth_state) else {
            return Ok(Redirect::to("/login/form").into_response());
        };
        let cookie = state_cookie(&oauth_state, STATE_MAX_AGE_SECS, secure);
        return Ok(([(header::SET_COOKIE, cookie)], Redirect::to(&target)).into_response());
    };

    let expected = cookie_value(&headers, STATE_COOKIE);
    match (query.state.as_deref(), expected.as_deref()) {
        (Some(got), Some(want)) if !got.is_empty() && got == want => {}
        _ => {
            warn!("OAuth callback state does not match");
            return Err(AppError::BadRequest("OAuth state mismatch".to_string()));
        }
    }

    let user = remote
        .login(&LoginRequest::OAuth { code, redirect })
        .await?;
    info!(user = %user.login, "OAuth login completed");

    let cleared = state_cookie("", 0, secure);
    Ok(([(header::SET_COOKIE, cleared)], Json(Profile::from(user))).into_response())
}

fn state_cookie(value: &str, max_age: u32, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "{STATE_COOKIE}={value}; Path=/authorize; HttpOnly; SameSite=Lax; Max-Age={max_age}{secure_flag}"
    )
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|cookie| {
        let (key, value) = cookie.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

/// `POST /authorize` - username and password login.
#[instrument(skip_all, fields(remote = %remote.name()))]
pub async fn authorize_password(
    remote: BoundRemote,
    Form(form): Form<LoginForm>,
) -> Result<Json<Profile>, AppError> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Err(AppError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    let user = remote
        .login(&LoginRequest::Password {
            username: form.username.trim().to_string(),
            password: form.password,
        })
        .await?;
    info!(user = %user.login, "Password login completed");

    Ok(Json(Profile::from(user)))
}
