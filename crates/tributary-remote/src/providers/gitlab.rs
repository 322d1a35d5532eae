//! GitLab, hosted or self-managed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{APP_NAME, OAuthToken, mark_private};
use crate::client::{ApiClient, Auth, encode, host_of, parse_server_url};
use crate::error::{RemoteError, SetupError};
use crate::remote::{
    BuildStatus, CommitStatus, LoginRequest, Netrc, Permission, Remote, RemoteKind, Repo, RepoRef,
    User,
};

const PUBLIC_SERVER: &str = "https://gitlab.com";
const PER_PAGE: usize = 100;

// Access levels from the GitLab permissions model.
const REPORTER: u32 = 20;
const DEVELOPER: u32 = 30;
const MAINTAINER: u32 = 40;

/// Settings for the GitLab provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitlabOpts {
    /// Selects this provider at startup.
    pub enabled: bool,
    /// Web URL; empty means gitlab.com.
    pub server: String,
    /// OAuth application id.
    pub client_id: String,
    /// OAuth application secret.
    pub client_secret: String,
    /// Fixed git transport username.
    pub git_username: String,
    /// Fixed git transport password.
    pub git_password: String,
    /// Treat every repository as private.
    pub private_mode: bool,
    /// Disable TLS certificate validation.
    pub skip_verify: bool,
}

/// A [`Remote`] backed by the GitLab v4 API.
#[derive(Debug)]
pub struct Gitlab {
    server: String,
    api: ApiClient,
    opts: GitlabOpts,
}

impl Gitlab {
    /// Creates the provider.
    pub fn new(opts: GitlabOpts) -> Result<Self, SetupError> {
        let kind = RemoteKind::Gitlab;
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
        let api = ApiClient::new(kind, &format!("{}/api/v4", server), opts.skip_verify)?;

        Ok(Self { server, api, opts })
    }

    /// Returns the web URL.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Returns the API base URL.
    pub fn api_url(&self) -> &str {
        self.api.base()
    }

    fn convert(&self, project: GlProject) -> Repo {
        let mut repo = Repo {
            owner: project.namespace.full_path,
            name: project.path,
            full_name: project.path_with_namespace,
            avatar: project.avatar_url.unwrap_or_default(),
            link: project.web_url,
            clone_url: project.http_url_to_repo,
            default_branch: project.default_branch.unwrap_or_else(|| "master".to_string()),
            is_private: project.visibility != "public",
        };
        mark_private(&mut repo, self.opts.private_mode);
        repo
    }

    fn project_path(owner: &str, name: &str) -> String {
        format!("/projects/{}", encode(&format!("{}/{}", owner, name)))
    }

    async fn fetch_project(&self, user: &User, repo: &RepoRef) -> Result<GlProject, RemoteError> {
        self.api
            .get_json(
                &Self::project_path(&repo.owner, &repo.name),
                Auth::Bearer(&user.token),
            )
            .await
    }
}

#[async_trait]
impl Remote for Gitlab {
    fn kind(&self) -> RemoteKind {
        RemoteKind::Gitlab
    }

    fn authorize_url(&self, redirect: &str, state: &str) -> Option<String> {
        Some(format!(
            "{}/oauth/authorize?client_id={}&redirect_uri={}&response_type=code&scope=api&state={}",
            self.server,
            encode(&self.opts.client_id),
            encode(redirect),
            encode(state),
        ))
    }

    async fn login(&self, request: &LoginRequest) -> Result<User, RemoteError> {
        let LoginRequest::OAuth { code, redirect } = request else {
            return Err(RemoteError::unsupported(self.kind(), "password login"));
        };

        let url = format!("{}/oauth/token", self.server);
        let token: OAuthToken = self
            .api
            .post_form(
                &url,
                Auth::None,
                &[
                    ("client_id", self.opts.client_id.as_str()),
                    ("client_secret", self.opts.client_secret.as_str()),
                    ("code", code.as_str()),
                    ("grant_type", "authorization_code"),
                    ("redirect_uri", redirect.as_str()),
                ],
            )
            .await?;
        let grant = token.into_grant()?;

        let profile: GlUser = self
            .api
            .get_json("/user", Auth::Bearer(&grant.access_token))
            .await?;
        Ok(User {
            login: profile.username,
            token: grant.access_token,
            secret: grant.refresh_token,
            expiry: grant.expiry,
            email: profile.email.unwrap_or_default(),
            avatar: profile.avatar_url.unwrap_or_default(),
            ..User::default()
        })
    }

    async fn repos(&self, user: &User) -> Result<Vec<Repo>, RemoteError> {
        let mut repos = Vec::new();
        for page in 1.. {
            let path = format!(
                "/projects?membership=true&per_page={}&page={}",
                PER_PAGE, page
            );
            let batch: Vec<GlProject> = self.api.get_json(&path, Auth::Bearer(&user.token)).await?;
            let done = batch.len() < PER_PAGE;
            repos.extend(batch.into_iter().map(|p| self.convert(p)));
            if done {
                break;
            }
        }
        Ok(repos)
    }

    async fn repo(&self, user: &User, repo: &RepoRef) -> Result<Repo, RemoteError> {
        let project = self.fetch_project(user, repo).await?;
        Ok(self.convert(project))
    }

    async fn perm(&self, user: &User, repo: &RepoRef) -> Result<Permission, RemoteError> {
        let project = self.fetch_project(user, repo).await?;
        let level = project
            .permissions
            .map(|p| p.access_level())
            .unwrap_or_default();
        Ok(Permission {
            pull: level >= REPORTER,
            push: level >= DEVELOPER,
            admin: level >= MAINTAINER,
        })
    }

    async fn file(
        &self,
        user: &User,
        repo: &Repo,
        commit: &str,
        path: &str,
    ) -> Result<Vec<u8>, RemoteError> {
        // GitLab expects the whole file path as one encoded segment.
        let path = format!(
            "{}/repository/files/{}/raw?ref={}",
            Self::project_path(&repo.owner, &repo.name),
            encode(path.trim_start_matches('/')),
            encode(commit),
        );
        self.api.get_bytes(&path, Auth::Bearer(&user.token), None).await
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
            BuildStatus::Failure | BuildStatus::Error => "failed",
        };
        let path = format!(
            "{}/statuses/{}",
            Self::project_path(&repo.owner, &repo.name),
            encode(&status.commit),
        );
        let body = json!({
            "state": state,
            "target_url": status.link,
            "description": status.text(),
            "name": APP_NAME,
        });
        self.api.post(&path, Auth::Bearer(&user.token), &body).await
    }

    fn netrc(&self, user: &User, _repo: &Repo) -> Result<Netrc, RemoteError> {
        let (login, password) = if self.opts.git_username.is_empty() {
            ("oauth2".to_string(), user.token.clone())
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

        let path = format!("{}/hooks", Self::project_path(&repo.owner, &repo.name));
        let body = json!({
            "url": link,
            "push_events": true,
            "tag_push_events": true,
            "merge_requests_events": true,
            "enable_ssl_verification": !self.opts.skip_verify,
        });
        self.api.post(&path, Auth::Bearer(&user.token), &body).await
    }

    async fn deactivate(&self, user: &User, repo: &Repo, link: &str) -> Result<(), RemoteError> {
        let base = format!("{}/hooks", Self::project_path(&repo.owner, &repo.name));
        let hooks: Vec<GlHook> = self.api.get_json(&base, Auth::Bearer(&user.token)).await?;
        for hook in hooks.into_iter().filter(|h| h.url == link) {
            debug!(repo = %repo.full_name, hook = hook.id, "Deleting GitLab hook");
            self.api
                .delete(&format!("{}/{}", base, hook.id), Auth::Bearer(&user.token))
                .await?;
        }
        Ok(())
    }

    fn pull_request_ref(&self, number: u64) -> Option<String> {
        Some(format!("refs/merge-requests/{}/head", number))
    }
}

#[derive(Deserialize)]
struct GlUser {
    username: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

#[derive(Deserialize)]
struct GlNamespace {
    full_path: String,
}

#[derive(Deserialize)]
struct GlAccess {
    access_level: u32,
}

#[derive(Deserialize)]
struct GlPermissions {
    #[serde(default)]
    project_access: Option<GlAccess>,
    #[serde(default)]
    group_access: Option<GlAccess>,
}

impl GlPermissions {
    fn access_level(&self) -> u32 {
        let project = self.project_access.as_ref().map_or(0, |a| a.access_level);
        let group = self.group_access.as_ref().map_or(0, |a| a.access_level);
        project.max(group)
    }
}

#[derive(Deserialize)]
struct GlProject {
    path: String,
    path_with_namespace: String,
    namespace: GlNamespace,
    #[serde(default)]
    web_url: String,
    #[serde(default)]
    http_url_to_repo: String,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    visibility: String,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default)]
    permissions: Option<GlPermissions>,
}

#[derive(Deserialize)]
struct GlHook {
    id: u64,
    url: String,
}
