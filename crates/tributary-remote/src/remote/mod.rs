//! The provider capability contract.

mod kind;
mod model;

use async_trait::async_trait;

use crate::error::RemoteError;

pub use kind::RemoteKind;
pub use model::{
    BuildStatus, CommitStatus, LoginRequest, Netrc, Permission, Repo, RepoRef, User,
};

/// A version-control hosting provider.
///
/// Every backend implements the full contract so that callers never branch
/// on the provider kind after construction. A single instance is shared by
/// all concurrently handled requests, so implementations must be safe for
/// concurrent use and synchronize any internal mutable state themselves.
///
/// # Implementors
///
/// - `Github` - GitHub and GitHub Enterprise
/// - `Gitlab` - GitLab
/// - `Bitbucket` - Bitbucket Cloud
/// - `BitbucketServer` - Bitbucket Server / Stash
/// - `Gogs` - Gogs-compatible self-hosted Git
///
/// # Example
///
/// ```ignore
/// use tributary_remote::{Remote, RepoRef};
///
/// async fn default_branch(remote: &dyn Remote, user: &User) -> Result<String, RemoteError> {
///     let repo = remote.repo(user, &RepoRef::new("octocat", "hello-world")).await?;
///     Ok(repo.default_branch)
/// }
/// ```
#[async_trait]
pub trait Remote: Send + Sync {
    /// Returns the provider kind.
    fn kind(&self) -> RemoteKind;

    /// Returns a name for logging and identification purposes.
    fn name(&self) -> &str {
        self.kind().as_key()
    }

    /// Returns the URL that starts the OAuth authorization flow.
    ///
    /// Providers without an OAuth flow return `None`; their users log in
    /// through the username/password form instead.
    fn authorize_url(&self, redirect: &str, state: &str) -> Option<String>;

    /// Authenticates an inbound identity and obtains a durable credential.
    ///
    /// # Errors
    ///
    /// - `RemoteError::AuthenticationFailed` if the provider rejects the credentials
    /// - `RemoteError::UnsupportedOperation` for a login form the provider cannot serve
    async fn login(&self, request: &LoginRequest) -> Result<User, RemoteError>;

    /// Refreshes an expiring token in place.
    ///
    /// Returns `true` if `user` was updated. The default implementation is a
    /// no-op for providers whose tokens do not expire.
    async fn refresh(&self, _user: &mut User) -> Result<bool, RemoteError> {
        Ok(false)
    }

    /// Lists the repositories visible to the user.
    async fn repos(&self, user: &User) -> Result<Vec<Repo>, RemoteError>;

    /// Reads repository metadata, including the default branch.
    async fn repo(&self, user: &User, repo: &RepoRef) -> Result<Repo, RemoteError>;

    /// Returns the user's access level on a repository.
    async fn perm(&self, user: &User, repo: &RepoRef) -> Result<Permission, RemoteError>;

    /// Retrieves raw file content at a revision.
    async fn file(
        &self,
        user: &User,
        repo: &Repo,
        commit: &str,
        path: &str,
    ) -> Result<Vec<u8>, RemoteError>;

    /// Reports a commit status back to the provider.
    async fn status(
        &self,
        user: &User,
        repo: &Repo,
        status: &CommitStatus,
    ) -> Result<(), RemoteError>;

    /// Returns credentials for cloning over git transport.
    fn netrc(&self, user: &User, repo: &Repo) -> Result<Netrc, RemoteError>;

    /// Registers a push and pull-request webhook pointing at `link`.
    async fn activate(&self, user: &User, repo: &Repo, link: &str) -> Result<(), RemoteError>;

    /// Removes the webhook pointing at `link`, if present.
    async fn deactivate(&self, user: &User, repo: &Repo, link: &str) -> Result<(), RemoteError>;

    /// Returns the ref to fetch when building pull request `number`.
    ///
    /// `None` means the provider exposes no pull request refs and builds use
    /// the source branch instead.
    fn pull_request_ref(&self, number: u64) -> Option<String> {
        Some(format!("refs/pull/{}/head", number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubRemote;

    #[async_trait]
    impl Remote for StubRemote {
        fn kind(&self) -> RemoteKind {
            RemoteKind::Gogs
        }

        fn authorize_url(&self, _redirect: &str, _state: &str) -> Option<String> {
            None
        }

        async fn login(&self, _request: &LoginRequest) -> Result<User, RemoteError> {
            Ok(User::new("stub", "token"))
        }

        async fn repos(&self, _user: &User) -> Result<Vec<Repo>, RemoteError> {
            Ok(Vec::new())
        }

        async fn repo(&self, _user: &User, repo: &RepoRef) -> Result<Repo, RemoteError> {
            Err(RemoteError::not_found(repo.full_name()))
        }

        async fn perm(&self, _user: &User, _repo: &RepoRef) -> Result<Permission, RemoteError> {
            Ok(Permission::default())
        }

        async fn file(
            &self,
            _user: &User,
            _repo: &Repo,
            _commit: &str,
            _path: &str,
        ) -> Result<Vec<u8>, RemoteError> {
            Ok(Vec::new())
        }

        async fn status(
            &self,
            _user: &User,
            _repo: &Repo,
            _status: &CommitStatus,
        ) -> Result<(), RemoteError> {
            Ok(())
        }

        fn netrc(&self, user: &User, _repo: &Repo) -> Result<Netrc, RemoteError> {
            Ok(Netrc {
                machine: "stub".into(),
                login: user.login.clone(),
                password: user.token.clone(),
            })
        }

        async fn activate(&self, _user: &User, _repo: &Repo, _link: &str) -> Result<(), RemoteError> {
            Err(RemoteError::unsupported(self.kind(), "webhooks"))
        }

        async fn deactivate(
            &self,
            _user: &User,
            _repo: &Repo,
            _link: &str,
        ) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_default_refresh_is_noop() {
        let mut user = User::new("stub", "token");

        assert!(!StubRemote.refresh(&mut user).await.unwrap());
        assert_eq!(user.token, "token");
    }

    #[test]
    fn test_default_name_and_pull_ref() {
        assert_eq!(StubRemote.name(), "self-hosted-git");
        assert_eq!(StubRemote.pull_request_ref(7).as_deref(), Some("refs/pull/7/head"));
    }

    #[tokio::test]
    async fn test_usable_as_trait_object() {
        let remote: Box<dyn Remote> = Box::new(StubRemote);
        let user = remote
            .login(&LoginRequest::Password {
                username: "stub".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();

        assert_eq!(user.login, "stub");
        assert!(remote.repos(&user).await.unwrap().is_empty());
    }
}
