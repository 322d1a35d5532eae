//! Bitbucket Cloud.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{APP_NAME, Grant, OAuthToken, unix_now};
use crate::client::{ApiClient, Auth, encode, encode_path, host_of};
use crate::error::{RemoteError, SetupError};
use crate::remote::{
    BuildStatus, CommitStatus, LoginRequest, Netrc, Permission, Remote, RemoteKind, Repo, RepoRef,
    User,
};

const SITE: &str = "https://bitbucket.org";
const API: &str = "https://api.bitbucket.org/2.0";
const PAGE_LEN: usize = 100;

/// Tokens closer than this to expiry are refreshed.
const REFRESH_WINDOW_SECS: i64 = 600;

/// Settings for the Bitbucket Cloud provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BitbucketOpts {
    /// Selects this provider at startup.
    pub enabled: bool,
    /// OAuth consumer key.
    pub client_id: String,
    /// OAuth consumer secret.
    pub client_secret: String,
}

/// A [`Remote`] backed by the Bitbucket Cloud 2.0 API.
#[derive(Debug)]
pub struct Bitbucket {
    site: String,
    api: ApiClient,
    opts: BitbucketOpts,
}

impl Bitbucket {
    /// Creates the provider.
    pub fn new(opts: BitbucketOpts) -> Result<Self, SetupError> {
        Self::with_endpoints(opts, SITE, API)
    }

    pub(crate) fn with_endpoints(
        opts: BitbucketOpts,
        site: &str,
        api: &str,
    ) -> Result<Self, SetupError> {
        let kind = RemoteKind::Bitbucket;
        if opts.client_id.is_empty() || opts.client_secret.is_empty() {
            return Err(SetupError::construction(
                kind,
                "client_id and client_secret are required",
            ));
        }
        let api = ApiClient::new(kind, api, false)?;

        Ok(Self {
            site: site.trim_end_matches('/').to_string(),
            api,
            opts,
        })
    }

    async fn token(&self, form: &[(&str, &str)]) -> Result<Grant, RemoteError> {
        let url = format!("{}/site/oauth2/access_token", self.site);
        let token: OAuthToken = self
            .api
            .post_form(
                &url,
                Auth::Basic(&self.opts.client_id, &self.opts.client_secret),
                form,
            )
            .await?;
        token.into_grant()
    }

    fn repo_path(owner: &str, name: &str) -> String {
        format!("/repositories/{}/{}", encode(owner), encode(name))
    }

    /// Turns an absolute `next` link into a path under the API base.
    fn next_path(&self, next: &str) -> Option<String> {
        next.strip_prefix(self.api.base()).map(str::to_string)
    }
}

#[async_trait]
impl Remote for Bitbucket {
    fn kind(&self) -> RemoteKind {
        RemoteKind::Bitbucket
    }

    fn authorize_url(&self, _redirect: &str, state: &str) -> Option<String> {
        // The callback is fixed in the consumer settings.
        Some(format!(
            "{}/site/oauth2/authorize?client_id={}&response_type=code&state={}",
            self.site,
            encode(&self.opts.client_id),
            encode(state),
        ))
    }

    async fn login(&self, request: &LoginRequest) -> Result<User, RemoteError> {
        let LoginRequest::OAuth { code, .. } = request else {
            return Err(RemoteError::unsupported(self.kind(), "password login"));
        };

        let grant = self
            .token(&[("grant_type", "authorization_code"), ("code", code.as_str())])
            .await?;
        let auth = Auth::Bearer(&grant.access_token);

        let profile: BbUser = self.api.get_json("/user", auth).await?;
        let emails: BbPage<BbEmail> = self.api.get_json("/user/emails", auth).await?;
        let email = emails
            .values
            .into_iter()
            .find(|e| e.is_primary)
            .map(|e| e.email)
            .unwrap_or_default();

        Ok(User {
            login: profile.username,
            token: grant.access_token,
            secret: grant.refresh_token,
            expiry: grant.expiry,
            email,
            avatar: profile.links.avatar.href,
            ..User::default()
        })
    }

    async fn refresh(&self, user: &mut User) -> Result<bool, RemoteError> {
        if user.secret.is_empty() || user.expiry > unix_now() + REFRESH_WINDOW_SECS {
            return Ok(false);
        }

        let grant = self
            .token(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", user.secret.as_str()),
            ])
            .await?;
        debug!(user = %user.login, "Refreshed Bitbucket token");

        user.token = grant.access_token;
        if !grant.refresh_token.is_empty() {
            user.secret = grant.refresh_token;
        }
        user.expiry = grant.expiry;
        Ok(true)
    }

    async fn repos(&self, user: &User) -> Result<Vec<Repo>, RemoteError> {
        let mut repos = Vec::new();
        let mut path = Some(format!("/repositories?role=member&pagelen={}", PAGE_LEN));
        while let Some(current) = path.take() {
            let page: BbPage<BbRepo> = self.api.get_json(&current, Auth::Bearer(&user.token)).await?;
            repos.extend(page.values.into_iter().map(Repo::from));
            path = page.next.as_deref().and_then(|next| self.next_path(next));
        }
        Ok(repos)
    }

    async fn repo(&self, user: &User, repo: &RepoRef) -> Result<Repo, RemoteError> {
        let raw: BbRepo = self
            .api
            .get_json(
                &Self::repo_path(&repo.owner, &repo.name),
                Auth::Bearer(&user.token),
            )
            .await?;
        Ok(raw.into())
    }

    async fn perm(&self, user: &User, repo: &RepoRef) -> Result<Permission, RemoteError> {
        let query = format!("repository.full_name=\"{}\"", repo.full_name());
        let path = format!("/user/permissions/repositories?q={}", encode(&query));
        let page: BbPage<BbPermission> = self.api.get_json(&path, Auth::Bearer(&user.token)).await?;

        let level = page
            .values
            .into_iter()
            .next()
            .map(|p| p.permission)
            .unwrap_or_default();
        Ok(match level.as_str() {
            "admin" => Permission {
                pull: true,
                push: true,
                admin: true,
            },
            "write" => Permission {
                pull: true,
                push: true,
                admin: false,
            },
            "read" => Permission {
                pull: true,
                ..Permission::default()
            },
            _ => Permission::default(),
        })
    }

    async fn file(
        &self,
        user: &User,
        repo: &Repo,
        commit: &str,
        path: &str,
    ) -> Result<Vec<u8>, RemoteError> {
        let path = format!(
            "{}/src/{}/{}",
            Self::repo_path(&repo.owner, &repo.name),
            encode(commit),
            encode_path(path),
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
            BuildStatus::Pending => "INPROGRESS",
            BuildStatus::Success => "SUCCESSFUL",
            BuildStatus::Failure | BuildStatus::Error => "FAILED",
        };
        let path = format!(
            "{}/commit/{}/statuses/build",
            Self::repo_path(&repo.owner, &repo.name),
            encode(&status.commit),
        );
        let body = json!({
            "state": state,
            "key": APP_NAME,
            "url": status.link,
            "description": status.text(),
        });
        self.api.post(&path, Auth::Bearer(&user.token), &body).await
    }

    fn netrc(&self, user: &User, _repo: &Repo) -> Result<Netrc, RemoteError> {
        Ok(Netrc {
            machine: host_of(&self.site),
            login: "x-token-auth".to_string(),
            password: user.token.clone(),
        })
    }

    async fn activate(&self, user: &User, repo: &Repo, link: &str) -> Result<(), RemoteError> {
        self.deactivate(user, repo, link).await?;

        let path = format!("{}/hooks", Self::repo_path(&repo.owner, &repo.name));
        let body = json!({
            "description": APP_NAME,
            "url": link,
            "active": true,
            "events": ["repo:push", "pullrequest:created", "pullrequest:updated"],
        });
        self.api.post(&path, Auth::Bearer(&user.token), &body).await
    }

    async fn deactivate(&self, user: &User, repo: &Repo, link: &str) -> Result<(), RemoteError> {
        let base = format!("{}/hooks", Self::repo_path(&repo.owner, &repo.name));
        let hooks: BbPage<BbHook> = self.api.get_json(&base, Auth::Bearer(&user.token)).await?;
        for hook in hooks.values.into_iter().filter(|h| h.url == link) {
            debug!(repo = %repo.full_name, hook = %hook.uuid, "Deleting Bitbucket hook");
            let path = format!("{}/{}", base, encode(&hook.uuid));
            self.api.delete(&path, Auth::Bearer(&user.token)).await?;
        }
        Ok(())
    }

    fn pull_request_ref(&self, _number: u64) -> Option<String> {
        None
    }
}

/// Removes embedded userinfo, e.g. `https://jdoe@bitbucket.org/...`.
fn strip_userinfo(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => {
            let authority_end = rest.find('/').unwrap_or(rest.len());
            match rest[..authority_end].rfind('@') {
                Some(at) => format!("{}://{}", scheme, &rest[at + 1..]),
                None => url.to_string(),
            }
        }
        None => url.to_string(),
    }
}

#[derive(Deserialize)]
struct BbPage<T> {
    #[serde(default = "Vec::new")]
    values: Vec<T>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Deserialize, Default)]
struct BbHref {
    #[serde(default)]
    href: String,
}

#[derive(Deserialize)]
struct BbCloneLink {
    name: String,
    href: String,
}

#[derive(Deserialize, Default)]
struct BbLinks {
    #[serde(default)]
    html: BbHref,
    #[serde(default)]
    avatar: BbHref,
    #[serde(default)]
    clone: Vec<BbCloneLink>,
}

#[derive(Deserialize)]
struct BbUser {
    username: String,
    #[serde(default)]
    links: BbLinks,
}

#[derive(Deserialize)]
struct BbEmail {
    email: String,
    #[serde(default)]
    is_primary: bool,
}

#[derive(Deserialize)]
struct BbBranch {
    name: String,
}

#[derive(Deserialize)]
struct BbRepo {
    full_name: String,
    #[serde(default)]
    is_private: bool,
    #[serde(default)]
    mainbranch: Option<BbBranch>,
    #[serde(default)]
    links: BbLinks,
}

impl From<BbRepo> for Repo {
    fn from(raw: BbRepo) -> Self {
        let (owner, name) = raw
            .full_name
            .split_once('/')
            .map(|(o, n)| (o.to_string(), n.to_string()))
            .unwrap_or_else(|| (String::new(), raw.full_name.clone()));
        let clone_url = raw
            .links
            .clone
            .iter()
            .find(|l| l.name == "https")
            .map(|l| strip_userinfo(&l.href))
            .unwrap_or_default();

        Repo {
            owner,
            name,
            full_name: raw.full_name,
            avatar: raw.links.avatar.href,
            link: raw.links.html.href,
            clone_url,
            default_branch: raw
                .mainbranch
                .map(|b| b.name)
                .unwrap_or_else(|| "master".to_string()),
            is_private: raw.is_private,
        }
    }
}

#[derive(Deserialize)]
struct BbPermission {
    #[serde(default)]
    permission: String,
}

#[derive(Deserialize)]
struct BbHook {
    uuid: String,
    #[serde(default)]
    url: String,
}
