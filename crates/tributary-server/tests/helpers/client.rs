//! Test client helpers.

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use tributary_remote::User;

/// Drives the router in-process, optionally as a signed-in user.
pub struct TestClient {
    app: Router,
    user: Option<User>,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self { app, user: None }
    }

    /// Attaches `user` to every request, as the session layer would.
    pub fn as_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send("GET", uri, vec![], Body::empty()).await
    }

    pub async fn get_with_headers(&self, uri: &str, headers: Vec<(&str, &str)>) -> TestResponse {
        self.send("GET", uri, headers, Body::empty()).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> TestResponse {
        self.send(
            "POST",
            uri,
            vec![("content-type", "application/json")],
            Body::from(body.to_string()),
        )
        .await
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> TestResponse {
        self.send(
            "POST",
            uri,
            vec![("content-type", "application/x-www-form-urlencoded")],
            Body::from(body.to_string()),
        )
        .await
    }

    pub async fn post(&self, uri: &str) -> TestResponse {
        self.send("POST", uri, vec![], Body::empty()).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send("DELETE", uri, vec![], Body::empty()).await
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        headers: Vec<(&str, &str)>,
        body: Body,
    ) -> TestResponse {
        let mut builder = Request::builder().uri(uri).method(method);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(user) = &self.user {
            builder = builder.extension(user.clone());
        }

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .expect("Request failed");

        TestResponse::from_response(response).await
    }
}

/// Buffered response with assertion helpers.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    async fn from_response(response: Response<Body>) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();

        Self {
            status,
            headers,
            body,
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Body is not valid UTF-8")
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {} but got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        let actual = self
            .header(name)
            .unwrap_or_else(|| panic!("Response missing header '{}'", name));
        assert_eq!(actual, expected, "Header '{}' mismatch", name);
        self
    }

    pub fn assert_header_exists(&self, name: &str) -> &Self {
        assert!(
            self.headers.contains_key(name),
            "Response missing header '{}'",
            name
        );
        self
    }

    pub fn assert_content_type_contains(&self, expected: &str) -> &Self {
        let content_type = self
            .header(header::CONTENT_TYPE.as_str())
            .expect("Response missing Content-Type header");
        assert!(
            content_type.contains(expected),
            "Expected Content-Type to contain '{}' but got '{}'",
            expected,
            content_type
        );
        self
    }
}
