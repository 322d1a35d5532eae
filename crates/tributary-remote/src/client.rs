//! HTTP plumbing shared by the provider implementations.

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{RemoteError, SetupError};
use crate::remote::RemoteKind;

const USER_AGENT: &str = concat!("tributary/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How a request authenticates.
#[derive(Clone, Copy)]
pub(crate) enum Auth<'a> {
    None,
    /// `Authorization: Bearer <token>`
    Bearer(&'a str),
    /// `Authorization: token <token>`
    Token(&'a str),
    Basic(&'a str, &'a str),
}

/// A JSON API client rooted at one base URL.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    kind: RemoteKind,
    base: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Builds a client for `base`. Certificate validation is only disabled
    /// when `skip_verify` is set.
    pub(crate) fn new(kind: RemoteKind, base: &str, skip_verify: bool) -> Result<Self, SetupError> {
        let base = parse_server_url(kind, base)?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(skip_verify)
            .build()
            .map_err(|e| SetupError::construction(kind, format!("http client: {}", e)))?;

        Ok(Self { kind, base, http })
    }

    /// Returns the base URL, without a trailing slash.
    pub(crate) fn base(&self) -> &str {
        &self.base
    }

    /// Joins `path` onto the base URL.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        auth: Auth<'_>,
    ) -> Result<T, RemoteError> {
        let response = self.send(self.request(Method::GET, &self.url(path), auth)).await?;
        Ok(response.json().await?)
    }

    pub(crate) async fn get_bytes(
        &self,
        path: &str,
        auth: Auth<'_>,
        accept: Option<&str>,
    ) -> Result<Vec<u8>, RemoteError> {
        let mut builder = self.request(Method::GET, &self.url(path), auth);
        if let Some(accept) = accept {
            builder = builder.header(ACCEPT, accept);
        }
        let response = self.send(builder).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        auth: Auth<'_>,
        body: &B,
    ) -> Result<T, RemoteError> {
        let builder = self.request(Method::POST, &self.url(path), auth).json(body);
        Ok(self.send(builder).await?.json().await?)
    }

    /// Posts a JSON body and discards the response body.
    pub(crate) async fn post(
        &self,
        path: &str,
        auth: Auth<'_>,
        body: &impl Serialize,
    ) -> Result<(), RemoteError> {
        let builder = self.request(Method::POST, &self.url(path), auth).json(body);
        self.send(builder).await?;
        Ok(())
    }

    pub(crate) async fn delete(&self, path: &str, auth: Auth<'_>) -> Result<(), RemoteError> {
        self.send(self.request(Method::DELETE, &self.url(path), auth))
            .await?;
        Ok(())
    }

    /// Posts a form to an absolute URL, typically an OAuth token endpoint.
    pub(crate) async fn post_form<T: DeserializeOwned>(
        &self,
        url: &str,
        auth: Auth<'_>,
        form: &[(&str, &str)],
    ) -> Result<T, RemoteError> {
        let builder = self
            .request(Method::POST, url, auth)
            .header(ACCEPT, "application/json")
            .form(form);
        Ok(self.send(builder).await?.json().await?)
    }

    fn request(&self, method: Method, url: &str, auth: Auth<'_>) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match auth {
            Auth::None => builder,
            Auth::Bearer(token) => builder.bearer_auth(token),
            Auth::Token(token) => builder.header(AUTHORIZATION, format!("token {}", token)),
            Auth::Basic(user, pass) => builder.basic_auth(user, Some(pass)),
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let response = builder.send().await?;
        debug!(
            remote = %self.kind,
            status = response.status().as_u16(),
            url = %response.url(),
            "Provider request completed"
        );
        check_status(response).await
    }
}

/// Maps a non-success response onto the contract's error taxonomy.
async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = retry_after(response.headers());
    let exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let detail = if body.is_empty() {
        format!("{} {}", status, url)
    } else {
        format!("{} {}: {}", status, url, truncate(&body, 200))
    };

    Err(match status {
        StatusCode::UNAUTHORIZED => RemoteError::authentication(detail),
        StatusCode::FORBIDDEN if exhausted => RemoteError::RateLimited { retry_after },
        StatusCode::FORBIDDEN => RemoteError::permission_denied(detail),
        StatusCode::NOT_FOUND => RemoteError::not_found(detail),
        StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited { retry_after },
        _ => RemoteError::unavailable(detail),
    })
}

fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Validates a configured server URL and strips any trailing slash.
pub(crate) fn parse_server_url(kind: RemoteKind, raw: &str) -> Result<String, SetupError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(SetupError::construction(kind, "server url is required"));
    }
    let url = Url::parse(trimmed).map_err(|e| {
        SetupError::construction(kind, format!("invalid server url '{}': {}", raw, e))
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(SetupError::construction(
            kind,
            format!("server url '{}' must be an absolute http(s) url", raw),
        ));
    }
    Ok(trimmed.to_string())
}

/// Returns the host of a URL, for `.netrc` machine entries.
pub(crate) fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// Percent-encodes a single path segment.
pub(crate) fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Percent-encodes a file path, keeping its `/` separators.
pub(crate) fn encode_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(encode)
        .collect::<Vec<_>>()
        .join("/")
}
