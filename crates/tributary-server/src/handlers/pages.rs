//! Page handlers.
//!
//! HTML rendering happens elsewhere; these handlers produce the template
//! name and the data the template is rendered with.

use axum::{
    Json,
    response::{IntoResponse, Redirect},
};
use serde::Serialize;
use tracing::warn;
use tributary_remote::User;

use crate::extractors::CurrentUser;
use crate::token::{Token, TokenKind};

/// Rendering context for a page.
#[derive(Debug, Serialize)]
pub struct Page {
    pub template: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csrf: Option<String>,
}

/// `GET /` - the main application page.
///
/// Signed-in users get a CSRF token for the forms on the page; anonymous
/// visitors get an empty one.
pub async fn show_index(CurrentUser(user): CurrentUser) -> Json<Page> {
    let csrf = user.as_ref().map(csrf_for).unwrap_or_default();

    Json(Page {
        template: "index.html",
        user,
        csrf: Some(csrf),
    })
}

/// `GET /login` - kept for old links; login starts at `/authorize`.
pub async fn show_login() -> impl IntoResponse {
    Redirect::to("/authorize")
}

/// `GET /login/form` - username and password form for providers without
/// an OAuth flow.
pub async fn show_login_form() -> Json<Page> {
    Json(Page {
        template: "login.html",
        user: None,
        csrf: None,
    })
}

fn csrf_for(user: &User) -> String {
    Token::new(TokenKind::Csrf, &user.login)
        .sign(&user.hash)
        .unwrap_or_else(|e| {
            warn!(user = %user.login, error = %e, "Cannot sign CSRF token");
            String::new()
        })
}
