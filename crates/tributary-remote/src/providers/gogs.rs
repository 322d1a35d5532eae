//! Self-hosted Git servers speaking the Gogs v1 API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{APP_NAME, mark_private};
use crate::client::{ApiClient, Auth, encode, encode_path, host_of, parse_server_url};
use crate::error::{RemoteError, SetupError};
use crate::remote::{
    CommitStatus, LoginRequest, Netrc, Permission, Remote, RemoteKind, Repo, RepoRef, User,
};

/// Settings for a self-hosted Git server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GogsOpts {
    /// Selects this provider at startup.
    pub enabled: bool,
    /// Base URL of the server.
    pub server: String,
    /// Fixed git transport username.
    pub git_username: String,
    /// Fixed git transport password.
    pub git_password: String,
    /// Treat every repository as private.
    pub private_mode: bool,
    /// Disable TLS certificate validation.
    pub skip_verify: bool,
}

/// A [`Remote`] backed by a Gogs-compatible server.
#[derive(Debug)]
pub struct Gogs {
    server: String,
    api: ApiClient,
    opts: GogsOpts,
}

impl Gogs {
    /// Creates the provider. The server URL is required.
    pub fn new(opts: GogsOpts) -> Result<Self, SetupError> {
        let kind = RemoteKind::Gogs;
        let server = parse_server_url(kind, &opts.server)?;
        let api = ApiClient::new(kind, &format!("{}/api/v1", server), opts.skip_verify)?;

        Ok(Self { server, api, opts })
    }

    /// Returns the base URL.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Returns the API base URL.
    pub fn api_url(&self) -> &str {
        self.api.base()
    }

    fn convert(&self, raw: GogsRepo) -> Repo {
        let mut repo = Repo {
            owner: raw.owner.username,
            name: raw.name,
            full_name: raw.full_name,
            avatar: raw.owner.avatar_url,
            link: raw.html_url,
            clone_url: raw.clone_url,
            default_branch: if raw.default_branch.is_empty() {
                "master".to_string()
            } else {
                raw.default_branch
            },
            is_private: raw.private,
        };
        mark_private(&mut repo, self.opts.private_mode);
        repo
    }

    fn repo_path(owner: &str, name: &str) -> String {
        format!("/repos/{}/{}", encode(owner), encode(name))
    }

    async fn fetch_repo(&self, user: &User, repo: &RepoRef) -> Result<GogsRepo, RemoteError> {
        self.api
            .get_json(&Self::repo_path(&repo.owner, &repo.name), Auth::Token(&user.token))
            .await
    }

    /// Finds the application token for `username`, creating it if needed.
    async fn access_token(&self, username: &str, password: &str) -> Result<String, RemoteError> {
        let path = format!("/users/{}/tokens", encode(username));
        let auth = Auth::Basic(username, password);

        let tokens: Vec<GogsToken> = self.api.get_json(&path, auth).await?;
        if let Some(token) = tokens.into_iter().find(|t| t.name == APP_NAME) {
            return Ok(token.sha1);
        }

        debug!(user = username, "Creating access token");
        let token: GogsToken = self
            .api
            .post_json(&path, auth, &json!({ "name": APP_NAME }))
            .await?;
        Ok(token.sha1)
    }
}

#[async_trait]
impl Remote for Gogs {
    fn kind(&self) -> RemoteKind {
        RemoteKind::Gogs
    }

    fn authorize_url(&self, _redirect: &str, _state: &str) -> Option<String> {
        None
    }

    async fn login(&self, request: &LoginRequest) -> Result<User, RemoteError> {
        let LoginRequest::Password { username, password } = request else {
            return Err(RemoteError::unsupported(self.kind(), "oauth login"));
        };

        let token = self.access_token(username, password).await?;
        let profile: GogsUser = self.api.get_json("/user", Auth::Token(&token)).await?;

        Ok(User {
            login: profile.username,
            token,
            email: profile.email,
            avatar: profile.avatar_url,
            ..User::default()
        })
    }

    async fn repos(&self, user: &User) -> Result<Vec<Repo>, RemoteError> {
        let raw: Vec<GogsRepo> = self
            .api
            .get_json("/user/repos", Auth::Token(&user.token))
            .await?;
        Ok(raw.into_iter().map(|r| self.convert(r)).collect())
    }

    async fn repo(&self, user: &User, repo: &RepoRef) -> Result<Repo, RemoteError> {
        let raw = self.fetch_repo(user, repo).await?;
        Ok(self.convert(raw))
    }

    async fn perm(&self, user: &User, repo: &RepoRef) -> Result<Permission, RemoteError> {
        let raw = self.fetch_repo(user, repo).await?;
        Ok(raw.permissions.map(Permission::from).unwrap_or_default())
    }

    async fn file(
        &self,
        user: &User,
        repo: &Repo,
        commit: &str,
        path: &str,
    ) -> Result<Vec<u8>, RemoteError> {
        let path = format!(
            "{}/raw/{}/{}",
            Self::repo_path(&repo.owner, &repo.name),
            encode(commit),
            encode_path(path),
        );
        self.api.get_bytes(&path, Auth::Token(&user.token), None).await
    }

    async fn status(
        &self,
        _user: &User,
        repo: &Repo,
        status: &CommitStatus,
    ) -> Result<(), RemoteError> {
        debug!(
            repo = %repo.full_name,
            commit = %status.commit,
            "Commit statuses are not supported, skipping"
        );
        Ok(())
    }

    fn netrc(&self, user: &User, _repo: &Repo) -> Result<Netrc, RemoteError> {
        let (login, password) = if self.opts.git_username.is_empty() {
            (user.login.clone(), user.token.clone())
        } else {
            (self.opts.git_username.clone(), self.opts.git_password.clone())
        };
        Ok(Netrc {
            machine: host_of(&self.server),
            login,
            password,
        })
    }

    async fn activate(&self, user: &User, repo: &Repo, link: &str) -> Result<(), RemoteError> {
        self.deactivate(user, repo, link).await?;

        let path = format!("{}/hooks", Self::repo_path(&repo.owner, &repo.name));
        let body = json!({
            "type": "gogs",
            "config": { "url": link, "content_type": "json" },
            "events": ["create", "push", "pull_request"],
            "active": true,
        });
        self.api.post(&path, Auth::Token(&user.token), &body).await
    }

    async fn deactivate(&self, user: &User, repo: &Repo, link: &str) -> Result<(), RemoteError> {
        let base = format!("{}/hooks", Self::repo_path(&repo.owner, &repo.name));
        let hooks: Vec<GogsHook> = self.api.get_json(&base, Auth::Token(&user.token)).await?;
        for hook in hooks.into_iter().filter(|h| h.config.url == link) {
            debug!(repo = %repo.full_name, hook = hook.id, "Deleting hook");
            self.api
                .delete(&format!("{}/{}", base, hook.id), Auth::Token(&user.token))
                .await?;
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct GogsToken {
    name: String,
    sha1: String,
}

#[derive(Deserialize)]
struct GogsUser {
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    avatar_url: String,
}

#[derive(Deserialize)]
struct GogsPermissions {
    #[serde(default)]
    admin: bool,
    #[serde(default)]
    push: bool,
    #[serde(default)]
    pull: bool,
}

impl From<GogsPermissions> for Permission {
    fn from(p: GogsPermissions) -> Self {
        Permission {
            pull: p.pull,
            push: p.push,
            admin: p.admin,
        }
    }
}

#[derive(Deserialize)]
struct GogsRepo {
    owner: GogsUser,
    name: String,
    full_name: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    clone_url: String,
    #[serde(default)]
    default_branch: String,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    permissions: Option<GogsPermissions>,
}

#[derive(Deserialize, Default)]
struct GogsHookConfig {
    #[serde(default)]
    url: String,
}

#[derive(Deserialize)]
struct GogsHook {
    id: u64,
    #[serde(default)]
    config: GogsHookConfig,
}
