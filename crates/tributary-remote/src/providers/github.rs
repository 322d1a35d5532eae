//! GitHub and GitHub Enterprise.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{OAuthToken, StringOrList, mark_private};
use crate::client::{ApiClient, Auth, encode, encode_path, host_of, parse_server_url};
use crate::error::{RemoteError, SetupError};
use crate::remote::{
    BuildStatus, CommitStatus, LoginRequest, Netrc, Permission, Remote, RemoteKind, Repo, RepoRef,
    User,
};

const PUBLIC_SERVER: &str = "https://github.com";
const PUBLIC_API: &str = "https://api.github.com";
const PER_PAGE: usize = 100;

/// Settings for the GitHub provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubOpts {
    /// Selects this provider at startup.
    pub enabled: bool,
    /// Web URL; empty means github.com.
    pub server: String,
    /// Context label used for commit statuses.
    pub context: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// OAuth scopes requested at authorization.
    #[serde(deserialize_with = "StringOrList::deserialize_vec")]
    pub scopes: Vec<String>,
    /// Fixed git transport username.
    pub git_username: String,
    /// Fixed git transport password.
    pub git_password: String,
    /// Treat every repository as private.
    pub private_mode: bool,
    /// Disable TLS certificate validation.
    pub skip_verify: bool,
    /// Build pull requests from the merge ref rather than the head ref.
    pub merge_ref: bool,
}

impl Default for GithubOpts {
    fn default() -> Self {
        Self {
            enabled: false,
            server: String::new(),
            context: "continuous-integration/tributary".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            scopes: ["repo", "repo:status", "user:email", "read:org"]
                .into_iter()
                .map(String::from)
                .collect(),
            git_username: String::new(),
            git_password: String::new(),
            private_mode: false,
            skip_verify: false,
            merge_ref: true,
        }
    }
}

/// A [`Remote`] backed by the GitHub REST API.
#[derive(Debug)]
pub struct Github {
    server: String,
    api: ApiClient,
    opts: GithubOpts,
}

impl Github {
    /// Creates the provider.
    ///
    /// # Errors
    ///
    /// Fails if the server URL is malformed or the OAuth client is incomplete.
    pub fn new(opts: GithubOpts) -> Result<Self, SetupError> {
        let kind = RemoteKind::Github;
        if opts.client_id.is_empty() || opts.client_secret.is_empty() {
            return Err(SetupError::construction(
                kind,
                "client_id and client_secret are required",
            ));
        }

        let server = if opts.server.trim().is_empty() {
            PUBLIC_SERVER.to_string()
        } else {
            parse_server_url(kind, &opts.server)?
        };
        let api_base = if server == PUBLIC_SERVER {
            PUBLIC_API.to_string()
        } else {
            format!("{}/api/v3", server)
        };
        let api = ApiClient::new(kind, &api_base, opts.skip_verify)?;

        Ok(Self { server, api, opts })
    }

    /// Returns the web URL.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Returns the REST API base URL.
    pub fn api_url(&self) -> &str {
        self.api.base()
    }

    fn convert(&self, repo: GhRepo) -> Repo {
        let mut repo = Repo {
            owner: repo.owner.login,
            name: repo.name,
            full_name: repo.full_name,
            avatar: repo.owner.avatar_url,
            link: repo.html_url,
            clone_url: repo.clone_url,
            default_branch: repo.default_branch,
            is_private: repo.private,
        };
        mark_private(&mut repo, self.opts.private_mode);
        repo
    }

    async fn fetch_repo(&self, user: &User, repo: &RepoRef) -> Result<GhRepo, RemoteError> {
        let path = format!("/repos/{}/{}", encode(&repo.owner), encode(&repo.name));
        self.api.get_json(&path, Auth::Token(&user.token)).await
    }

    async fn find_hooks(
        &self,
        user: &User,
        repo: &Repo,
        link: &str,
    ) -> Result<Vec<u64>, RemoteError> {
        let path = format!("/repos/{}/{}/hooks", encode(&repo.owner), encode(&repo.name));
        let hooks: Vec<GhHook> = self.api.get_json(&path, Auth::Token(&user.token)).await?;
        Ok(hooks
            .into_iter()
            .filter(|h| h.config.url.as_deref() == Some(link))
            .map(|h| h.id)
            .collect())
    }
}

#[async_trait]
impl Remote for Github {
    fn kind(&self) -> RemoteKind {
        RemoteKind::Github
    }

    fn authorize_url(&self, redirect: &str, state: &str) -> Option<String> {
        Some(format!(
            "{}/login/oauth/authorize?client_id={}&redirect_uri={}&scope={}&state={}",
            self.server,
            encode(&self.opts.client_id),
            encode(redirect),
            encode(&self.opts.scopes.join(",")),
            encode(state),
        ))
    }

    async fn login(&self, request: &LoginRequest) -> Result<User, RemoteError> {
        let LoginRequest::OAuth { code, redirect } = request else {
            return Err(RemoteError::unsupported(self.kind(), "password login"));
        };

        let url = format!("{}/login/oauth/access_token", self.server);
        let token: OAuthToken = self
            .api
            .post_form(
                &url,
                Auth::None,
                &[
                    ("client_id", self.opts.client_id.as_str()),
                    ("client_secret", self.opts.client_secret.as_str()),
                    ("code", code.as_str()),
                    ("redirect_uri", redirect.as_str()),
                ],
            )
            .await?;
        let access_token = token.into_access_token()?;

        let profile: GhUser = self.api.get_json("/user", Auth::Token(&access_token)).await?;
        Ok(User {
            login: profile.login,
            token: access_token,
            email: profile.email.unwrap_or_default(),
            avatar: profile.avatar_url,
            ..User::default()
        })
    }

    async fn repos(&self, user: &User) -> Result<Vec<Repo>, RemoteError> {
        let mut repos = Vec::new();
        for page in 1.. {
            let path = format!("/user/repos?per_page={}&page={}", PER_PAGE, page);
            let batch: Vec<GhRepo> = self.api.get_json(&path, Auth::Token(&user.token)).await?;
            let done = batch.len() < PER_PAGE;
            repos.extend(batch.into_iter().map(|r| self.convert(r)));
            if done {
                break;
            }
        }
        Ok(repos)
    }

    async fn repo(&self, user: &User, repo: &RepoRef) -> Result<Repo, RemoteError> {
        let repo = self.fetch_repo(user, repo).await?;
        Ok(self.convert(repo))
    }

    async fn perm(&self, user: &User, repo: &RepoRef) -> Result<Permission, RemoteError> {
        let repo = self.fetch_repo(user, repo).await?;
        Ok(repo.permissions.unwrap_or_default().into())
    }

    async fn file(
        &self,
        user: &User,
        repo: &Repo,
        commit: &str,
        path: &str,
    ) -> Result<Vec<u8>, RemoteError> {
        let path = format!(
            "/repos/{}/{}/contents/{}?ref={}",
            encode(&repo.owner),
            encode(&repo.name),
            encode_path(path),
            encode(commit),
        );
        self.api
            .get_bytes(
                &path,
                Auth::Token(&user.token),
                Some("application/vnd.github.v3.raw"),
            )
            .await
    }

    async fn status(
        &self,
        user: &User,
        repo: &Repo,
        status: &CommitStatus,
    ) -> Result<(), RemoteError> {
        let state = match status.status {
            BuildStatus::Pending => "pending",
            BuildStatus::Success => "success",
            BuildStatus::Failure => "failure",
            BuildStatus::Error => "error",
        };
        let path = format!(
            "/repos/{}/{}/statuses/{}",
            encode(&repo.owner),
            encode(&repo.name),
            encode(&status.commit),
        );
        let body = json!({
            "state": state,
            "target_url": status.link,
            "description": status.text(),
            "context": self.opts.context,
        });
        self.api.post(&path, Auth::Token(&user.token), &body).await
    }

    fn netrc(&self, user: &User, _repo: &Repo) -> Result<Netrc, RemoteError> {
        let (login, password) = if self.opts.git_username.is_empty() {
            (user.token.clone(), "x-oauth-basic".to_string())
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
        // Replace any hook already pointing at us so deliveries are not doubled.
        self.deactivate(user, repo, link).await?;

        let path = format!("/repos/{}/{}/hooks", encode(&repo.owner), encode(&repo.name));
        let body = json!({
            "name": "web",
            "active": true,
            "events": ["push", "pull_request", "deployment"],
            "config": { "url": link, "content_type": "form" },
        });
        self.api.post(&path, Auth::Token(&user.token), &body).await
    }

    async fn deactivate(&self, user: &User, repo: &Repo, link: &str) -> Result<(), RemoteError> {
        for id in self.find_hooks(user, repo, link).await? {
            debug!(repo = %repo.full_name, hook = id, "Deleting GitHub hook");
            let path = format!(
                "/repos/{}/{}/hooks/{}",
                encode(&repo.owner),
                encode(&repo.name),
                id
            );
            self.api.delete(&path, Auth::Token(&user.token)).await?;
        }
        Ok(())
    }

    fn pull_request_ref(&self, number: u64) -> Option<String> {
        if self.opts.merge_ref {
            Some(format!("refs/pull/{}/merge", number))
        } else {
            Some(format!("refs/pull/{}/head", number))
        }
    }
}

#[derive(Deserialize)]
struct GhUser {
    login: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar_url: String,
}

#[derive(Deserialize)]
struct GhOwner {
    login: String,
    #[serde(default)]
    avatar_url: String,
}

#[derive(Deserialize, Default)]
struct GhPermissions {
    #[serde(default)]
    admin: bool,
    #[serde(default)]
    push: bool,
    #[serde(default)]
    pull: bool,
}

impl From<GhPermissions> for Permission {
    fn from(p: GhPermissions) -> Self {
        Permission {
            pull: p.pull,
            push: p.push,
            admin: p.admin,
        }
    }
}

#[derive(Deserialize)]
struct GhRepo {
    owner: GhOwner,
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
    permissions: Option<GhPermissions>,
}

#[derive(Deserialize)]
struct GhHookConfig {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize)]
struct GhHook {
    id: u64,
    config: GhHookConfig,
}
