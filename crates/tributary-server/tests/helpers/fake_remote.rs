//! In-memory remote for driving the server without a provider.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tributary_remote::{
    CommitStatus, LoginRequest, Netrc, Permission, Remote, RemoteError, RemoteKind, Repo, RepoRef,
    User,
};

pub const GOOD_CODE: &str = "good-code";
pub const GOOD_PASSWORD: &str = "secret";

pub struct FakeRemote {
    kind: RemoteKind,
    oauth: bool,
    permission: Permission,
    files: HashMap<String, Vec<u8>>,
    pub statuses: Mutex<Vec<CommitStatus>>,
    pub hooks: Mutex<Vec<String>>,
    pub refreshes: AtomicUsize,
}

impl FakeRemote {
    /// An OAuth-capable remote where the user has admin access.
    pub fn new() -> Self {
        Self {
            kind: RemoteKind::Github,
            oauth: true,
            permission: Permission {
                pull: true,
                push: true,
                admin: true,
            },
            files: HashMap::new(),
            statuses: Mutex::new(Vec::new()),
            hooks: Mutex::new(Vec::new()),
            refreshes: AtomicUsize::new(0),
        }
    }

    /// A remote without an OAuth flow, like self-hosted Git.
    pub fn password_only() -> Self {
        Self {
            kind: RemoteKind::Gogs,
            oauth: false,
            ..Self::new()
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        self.files.insert(path.to_string(), content.as_bytes().to_vec());
        self
    }

    pub fn statuses(&self) -> Vec<CommitStatus> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn hooks(&self) -> Vec<String> {
        self.hooks.lock().unwrap().clone()
    }

    fn make_repo(repo: &RepoRef) -> Repo {
        Repo {
            owner: repo.owner.clone(),
            name: repo.name.clone(),
            full_name: repo.full_name(),
            avatar: String::new(),
            link: format!("https://example.com/{}", repo),
            clone_url: format!("https://example.com/{}.git", repo),
            default_branch: "main".into(),
            is_private: false,
        }
    }

    fn profile(login: &str, token: &str) -> User {
        let mut user = User::new(login, token);
        user.email = format!("{}@example.com", login);
        user.avatar = format!("https://example.com/avatars/{}", login);
        user
    }
}

#[async_trait]
impl Remote for FakeRemote {
    fn kind(&self) -> RemoteKind {
        self.kind
    }

    fn authorize_url(&self, redirect: &str, state: &str) -> Option<String> {
        self.oauth.then(|| {
            format!(
                "https://provider.example/authorize?redirect_uri={}&state={}",
                redirect, state
            )
        })
    }

    async fn login(&self, request: &LoginRequest) -> Result<User, RemoteError> {
        match request {
            LoginRequest::OAuth { .. } if !self.oauth => {
                Err(RemoteError::unsupported(self.kind, "oauth login"))
            }
            LoginRequest::OAuth { code, .. } if code == GOOD_CODE => {
                Ok(Self::profile("octocat", "oauth-token"))
            }
            LoginRequest::Password { username, password } if password == GOOD_PASSWORD => {
                Ok(Self::profile(username, "password-token"))
            }
            _ => Err(RemoteError::authentication("bad credentials")),
        }
    }

    async fn refresh(&self, _user: &mut User) -> Result<bool, RemoteError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(false)
    }

    async fn repos(&self, _user: &User) -> Result<Vec<Repo>, RemoteError> {
        Ok(vec![
            Self::make_repo(&RepoRef::new("octocat", "hello")),
            Self::make_repo(&RepoRef::new("octocat", "world")),
        ])
    }

    async fn repo(&self, _user: &User, repo: &RepoRef) -> Result<Repo, RemoteError> {
        if repo.owner == "missing" {
            return Err(RemoteError::not_found(repo.full_name()));
        }
        Ok(Self::make_repo(repo))
    }

    async fn perm(&self, _user: &User, _repo: &RepoRef) -> Result<Permission, RemoteError> {
        Ok(self.permission)
    }

    async fn file(
        &self,
        _user: &User,
        repo: &Repo,
        _commit: &str,
        path: &str,
    ) -> Result<Vec<u8>, RemoteError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| RemoteError::not_found(format!("{}/{}", repo.full_name, path)))
    }

    async fn status(
        &self,
        _user: &User,
        _repo: &Repo,
        status: &CommitStatus,
    ) -> Result<(), RemoteError> {
        self.statuses.lock().unwrap().push(status.clone());
        Ok(())
    }

    fn netrc(&self, user: &User, _repo: &Repo) -> Result<Netrc, RemoteError> {
        Ok(Netrc {
            machine: "example.com".into(),
            login: user.login.clone(),
            password: user.token.clone(),
        })
    }

    async fn activate(&self, _user: &User, _repo: &Repo, link: &str) -> Result<(), RemoteError> {
        self.hooks.lock().unwrap().push(link.to_string());
        Ok(())
    }

    async fn deactivate(&self, _user: &User, _repo: &Repo, link: &str) -> Result<(), RemoteError> {
        self.hooks.lock().unwrap().retain(|h| h != link);
        Ok(())
    }
}
