//! Provider implementations of the [`Remote`](crate::Remote) contract.
//!
//! Each module owns its option struct, its wire types and the mapping from
//! provider responses onto the neutral model. Nothing outside this module
//! needs to know which provider is active.

pub mod bitbucket;
pub mod bitbucket_server;
pub mod github;
pub mod gitlab;
pub mod gogs;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer};

use crate::error::RemoteError;
use crate::remote::Repo;

pub use bitbucket::{Bitbucket, BitbucketOpts};
pub use bitbucket_server::{BitbucketServer, BitbucketServerOpts};
pub use github::{Github, GithubOpts};
pub use gitlab::{Gitlab, GitlabOpts};
pub use gogs::{Gogs, GogsOpts};

/// Name used for tokens, status keys and webhooks created on the provider.
pub(crate) const APP_NAME: &str = "tributary";

/// In private mode nothing is treated as public.
pub(crate) fn mark_private(repo: &mut Repo, private_mode: bool) {
    if private_mode {
        repo.is_private = true;
    }
}

pub(crate) fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Accepts either a list or a comma-separated string, so that list settings
/// can come from environment variables.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum StringOrList {
    List(Vec<String>),
    One(String),
}

impl StringOrList {
    pub(crate) fn deserialize_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match StringOrList::deserialize(deserializer)? {
            StringOrList::List(items) => items,
            StringOrList::One(s) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        })
    }
}

/// Token endpoint response shared by the OAuth2 providers.
#[derive(Deserialize)]
pub(crate) struct OAuthToken {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// A successful token grant.
pub(crate) struct Grant {
    pub(crate) access_token: String,
    pub(crate) refresh_token: String,
    /// Unix timestamp, zero when the token does not expire.
    pub(crate) expiry: i64,
}

impl OAuthToken {
    /// Returns the access token, or the provider's reason for withholding it.
    pub(crate) fn into_access_token(self) -> Result<String, RemoteError> {
        Ok(self.into_grant()?.access_token)
    }

    pub(crate) fn into_grant(self) -> Result<Grant, RemoteError> {
        match (self.access_token, self.error) {
            (Some(token), None) if !token.is_empty() => Ok(Grant {
                access_token: token,
                refresh_token: self.refresh_token.unwrap_or_default(),
                expiry: self.expires_in.map_or(0, |secs| unix_now() + secs),
            }),
            (_, Some(error)) => Err(RemoteError::authentication(
                self.error_description.unwrap_or(error),
            )),
            _ => Err(RemoteError::authentication("no access token in response")),
        }
    }
}
