mod helpers;

use std::sync::Arc;

use axum::http::StatusCode;
use helpers::fake_remote::{GOOD_CODE, GOOD_PASSWORD};
use helpers::{FakeRemote, TestClient, TestResponse, client, client_with};
use serde_json::Value;
use tributary_server::handlers::auth::STATE_COOKIE;

async fn callback(client: &TestClient, code: &str, state: &str, cookie: &str) -> TestResponse {
    let cookie = format!("{}={}", STATE_COOKIE, cookie);
    client
        .get_with_headers(
            &format!("/authorize?code={}&state={}", code, state),
            vec![("cookie", cookie.as_str())],
        )
        .await
}

// === OAuth ===

#[tokio::test]
async fn authorize_without_code_redirects_to_provider() {
    let response = client().get("/authorize").await;
    response.assert_status(StatusCode::SEE_OTHER);

    let location = response.header("location").unwrap();
    assert!(location.starts_with("https://provider.example/authorize"));
    assert!(location.contains("redirect_uri=http://ci.example.com/authorize"));
    assert!(location.contains("&state="));
}

#[tokio::test]
async fn authorize_redirect_sets_state_cookie() {
    let response = client().get("/authorize").await;

    let location = response.header("location").unwrap();
    let state = location.split("&state=").nth(1).unwrap();
    let cookie = response.header("set-cookie").unwrap();
    assert!(cookie.starts_with(&format!("{}={};", STATE_COOKIE, state)));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn authorize_state_differs_between_requests() {
    let client = client();
    let first = client.get("/authorize").await;
    let second = client.get("/authorize").await;

    assert_ne!(first.header("location"), second.header("location"));
}

#[tokio::test]
async fn authorize_without_oauth_redirects_to_login_form() {
    let response = client_with(Arc::new(FakeRemote::password_only()))
        .get("/authorize")
        .await;
    response
        .assert_status(StatusCode::SEE_OTHER)
        .assert_header("location", "/login/form");
    assert!(response.header("set-cookie").is_none());
}

#[tokio::test]
async fn authorize_with_good_code_returns_profile() {
    let response = callback(&client(), GOOD_CODE, "abc", "abc").await;
    response.assert_status(StatusCode::OK);

    let profile: Value = response.json();
    assert_eq!(profile["login"], "octocat");
    assert_eq!(profile["email"], "octocat@example.com");
    assert!(profile.get("token").is_none());

    let cleared = response.header("set-cookie").unwrap();
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn callback_with_mismatched_state_is_rejected() {
    callback(&client(), GOOD_CODE, "forged", "abc")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn callback_without_state_cookie_is_rejected() {
    client()
        .get(&format!("/authorize?code={}&state=abc", GOOD_CODE))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn callback_without_state_param_is_rejected() {
    let cookie = format!("{}=abc", STATE_COOKIE);
    client()
        .get_with_headers(
            &format!("/authorize?code={}", GOOD_CODE),
            vec![("cookie", cookie.as_str())],
        )
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn state_cookie_found_among_other_cookies() {
    let cookie = format!("theme=dark; {}=abc; lang=en", STATE_COOKIE);
    client()
        .get_with_headers(
            &format!("/authorize?code={}&state=abc", GOOD_CODE),
            vec![("cookie", cookie.as_str())],
        )
        .await
        .assert_status(StatusCode::OK);
}

#[tokio::test]
async fn authorize_with_bad_code_is_unauthorized() {
    let response = callback(&client(), "nope", "abc", "abc").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: Value = response.json();
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn authorize_with_provider_error_is_unauthorized() {
    let response = client()
        .get("/authorize?error=access_denied&error_description=user%20cancelled")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("user cancelled"));
}

#[tokio::test]
async fn oauth_code_on_password_only_remote_is_not_implemented() {
    let client = client_with(Arc::new(FakeRemote::password_only()));
    callback(&client, "anything", "abc", "abc")
        .await
        .assert_status(StatusCode::NOT_IMPLEMENTED);
}

// === Password ===

#[tokio::test]
async fn password_login_returns_profile() {
    let response = client_with(Arc::new(FakeRemote::password_only()))
        .post_form(
            "/authorize",
            &format!("username=jdoe&password={}", GOOD_PASSWORD),
        )
        .await;
    response.assert_status(StatusCode::OK);

    let profile: Value = response.json();
    assert_eq!(profile["login"], "jdoe");
}

#[tokio::test]
async fn password_login_with_wrong_password_is_unauthorized() {
    client()
        .post_form("/authorize", "username=jdoe&password=wrong")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn password_login_requires_both_fields() {
    let client = client();

    for body in ["username=&password=x", "username=jdoe&password=", "username=%20&password=x"] {
        client
            .post_form("/authorize", body)
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
