//! Provider kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The hosting providers Tributary can talk to.
///
/// The declaration order is the selection priority: when several providers
/// are enabled, the earliest one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteKind {
    /// GitHub or GitHub Enterprise.
    Github,
    /// GitLab, hosted or self-managed.
    Gitlab,
    /// Bitbucket Cloud.
    Bitbucket,
    /// Bitbucket Server (formerly Stash).
    BitbucketServer,
    /// Gogs and compatible self-hosted Git services.
    #[serde(rename = "self-hosted-git")]
    Gogs,
}

impl RemoteKind {
    /// Every kind, in selection priority order.
    pub const PRIORITY: [RemoteKind; 5] = [
        Self::Github,
        Self::Gitlab,
        Self::Bitbucket,
        Self::BitbucketServer,
        Self::Gogs,
    ];

    /// Returns the configuration key for this kind.
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Gitlab => "gitlab",
            Self::Bitbucket => "bitbucket",
            Self::BitbucketServer => "bitbucket-server",
            Self::Gogs => "self-hosted-git",
        }
    }
}

impl fmt::Display for RemoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}
