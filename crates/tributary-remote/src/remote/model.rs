//! Provider-neutral data exchanged through the [`Remote`](super::Remote) contract.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An authenticated user and the credential obtained from the provider.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login name on the provider.
    pub login: String,

    /// Access token (OAuth or personal token).
    #[serde(default, skip_serializing)]
    pub token: String,

    /// Refresh token or token secret, when the provider issues one.
    #[serde(default, skip_serializing)]
    pub secret: String,

    /// Unix timestamp at which `token` expires; zero when it does not.
    #[serde(default)]
    pub expiry: i64,

    /// Primary email address.
    #[serde(default)]
    pub email: String,

    /// Avatar image URL.
    #[serde(default)]
    pub avatar: String,

    /// Per-user signing secret, owned by the session layer.
    #[serde(default, skip_serializing)]
    pub hash: String,
}

impl User {
    /// Creates a user with a login and token.
    pub fn new(login: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            token: token.into(),
            ..Self::default()
        }
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("login", &self.login)
            .field("email", &self.email)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

/// How a user proves their identity to the provider.
#[derive(Clone)]
pub enum LoginRequest {
    /// Authorization code returned by an OAuth redirect.
    OAuth {
        /// The `code` query parameter
        code: String,
        /// Redirect URI used to initiate the flow
        redirect: String,
    },

    /// Username and password submitted through the login form.
    Password {
        /// Login name
        username: String,
        /// Password
        password: String,
    },
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OAuth { redirect, .. } => f
                .debug_struct("OAuth")
                .field("redirect", redirect)
                .finish_non_exhaustive(),
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}

/// Owner and name of a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    /// Owner, organization, group or project key.
    pub owner: String,
    /// Repository name or slug.
    pub name: String,
}

impl RepoRef {
    /// Creates a repository reference.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Returns `owner/name`.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Repository metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    /// Owner, organization, group or project key.
    pub owner: String,
    /// Repository name or slug.
    pub name: String,
    /// `owner/name`.
    pub full_name: String,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar: String,
    /// Web page of the repository.
    pub link: String,
    /// URL used to clone over HTTP(S).
    pub clone_url: String,
    /// Default branch.
    pub default_branch: String,
    /// Whether the repository is private.
    pub is_private: bool,
}

impl Repo {
    /// Returns the owner/name pair.
    pub fn repo_ref(&self) -> RepoRef {
        RepoRef::new(&self.owner, &self.name)
    }
}

/// Access a user has on a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// May read and clone.
    pub pull: bool,
    /// May push.
    pub push: bool,
    /// May change settings, including webhooks.
    pub admin: bool,
}

/// Build outcome reported back to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    /// Queued or running.
    Pending,
    /// Finished successfully.
    Success,
    /// Finished with a failing step.
    Failure,
    /// Could not run.
    Error,
}

impl BuildStatus {
    /// Returns a short human description used as the status text.
    pub fn description(self) -> &'static str {
        match self {
            Self::Pending => "this build is pending",
            Self::Success => "the build was successful",
            Self::Failure => "the build failed",
            Self::Error => "oops, something went wrong",
        }
    }
}

/// A commit status annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStatus {
    /// Commit SHA the status applies to.
    pub commit: String,
    /// Outcome.
    pub status: BuildStatus,
    /// Link back to the build.
    pub link: String,
    /// Optional description overriding the default text.
    #[serde(default)]
    pub description: Option<String>,
}

impl CommitStatus {
    /// Creates a status for a commit.
    pub fn new(commit: impl Into<String>, status: BuildStatus, link: impl Into<String>) -> Self {
        Self {
            commit: commit.into(),
            status,
            link: link.into(),
            description: None,
        }
    }

    /// Sets a custom description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the description to send.
    pub fn text(&self) -> &str {
        self.description
            .as_deref()
            .unwrap_or_else(|| self.status.description())
    }
}

/// Credentials written to a `.netrc` file for git transport.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Netrc {
    /// Host name.
    pub machine: String,
    /// Login.
    pub login: String,
    /// Password or token.
    pub password: String,
}

impl fmt::Debug for Netrc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Netrc")
            .field("machine", &self.machine)
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_debug_hides_credentials() {
        let mut user = User::new("octocat", "ghp_secret");
        user.secret = "refresh".into();

        let debug = format!("{:?}", user);
        assert!(debug.contains("octocat"));
        assert!(!debug.contains("ghp_secret"));
        assert!(!debug.contains("refresh"));
    }

    #[test]
    fn test_user_serialization_skips_credentials() {
        let mut user = User::new("octocat", "ghp_secret");
        user.hash = "per-user-secret".into();

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("octocat"));
        assert!(!json.contains("per-user-secret"));
        assert!(!json.contains("ghp_secret"));
    }

    #[test]
    fn test_login_request_debug_hides_password() {
        let req = LoginRequest::Password {
            username: "ci".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{:?}", req).contains("hunter2"));
    }

    #[test]
    fn test_commit_status_text() {
        let status = CommitStatus::new("abc", BuildStatus::Success, "http://ci/1");
        assert_eq!(status.text(), "the build was successful");

        let status = status.with_description("step 'secrets' failed");
        assert_eq!(status.text(), "step 'secrets' failed");
    }

    #[test]
    fn test_repo_ref_display() {
        let repo = RepoRef::new("octocat", "hello-world");
        assert_eq!(repo.to_string(), "octocat/hello-world");
        assert_eq!(repo.full_name(), "octocat/hello-world");
    }
}
