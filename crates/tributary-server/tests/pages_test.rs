mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use helpers::{FakeRemote, client, client_with, test_user};
use serde_json::Value;
use tributary_server::token::{Token, TokenKind};

#[tokio::test]
async fn index_without_user_has_empty_csrf() {
    let response = client().get("/").await;
    response.assert_status(StatusCode::OK);

    let page: Value = response.json();
    assert_eq!(page["template"], "index.html");
    assert_eq!(page["csrf"], "");
    assert!(page.get("user").is_none());
}

#[tokio::test]
async fn index_with_user_has_signed_csrf() {
    let user = test_user();
    let page: Value = client().as_user(user.clone()).get("/").await.json();

    let expected = Token::new(TokenKind::Csrf, &user.login)
        .sign(&user.hash)
        .unwrap();
    assert_eq!(page["csrf"], expected.as_str());
    assert_eq!(page["user"]["login"], "octocat");
    assert_eq!(page["user"]["email"], "octocat@example.com");
}

#[tokio::test]
async fn index_never_exposes_credentials() {
    let body = client().as_user(test_user()).get("/").await.text();

    assert!(!body.contains("t0ken"));
    assert!(!body.contains("per-user-hash"));
}

#[tokio::test]
async fn index_csrf_verifies_against_user_hash() {
    let user = test_user();
    let page: Value = client().as_user(user.clone()).get("/").await.json();
    let csrf = page["csrf"].as_str().unwrap();

    let token = Token::new(TokenKind::Csrf, &user.login);
    assert!(token.verify(&user.hash, csrf));
    assert!(!token.verify("another-hash", csrf));
}

#[tokio::test]
async fn login_redirects_to_authorize() {
    client()
        .get("/login")
        .await
        .assert_status(StatusCode::SEE_OTHER)
        .assert_header("location", "/authorize");
}

#[tokio::test]
async fn login_redirect_does_not_depend_on_remote() {
    client_with(Arc::new(FakeRemote::password_only()))
        .get("/login")
        .await
        .assert_status(StatusCode::SEE_OTHER)
        .assert_header("location", "/authorize");
}

#[tokio::test]
async fn login_form_renders_login_template() {
    let response = client().get("/login/form").await;
    response.assert_status(StatusCode::OK);

    let page: Value = response.json();
    assert_eq!(page["template"], "login.html");
    assert!(page.get("csrf").is_none());
}
