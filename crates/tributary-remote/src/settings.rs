//! Provider configuration.

use serde::{Deserialize, Serialize};

use crate::providers::{BitbucketOpts, BitbucketServerOpts, GithubOpts, GitlabOpts, GogsOpts};
use crate::remote::RemoteKind;

/// One section per provider kind, each carrying its own `enabled` flag.
///
/// The settings are deserialized from whatever source the host process
/// uses. Missing sections fall back to their defaults, which leaves the
/// provider disabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// GitHub settings.
    pub github: GithubOpts,
    /// GitLab settings.
    pub gitlab: GitlabOpts,
    /// Bitbucket Cloud settings.
    pub bitbucket: BitbucketOpts,
    /// Bitbucket Server settings.
    pub bitbucket_server: BitbucketServerOpts,
    /// Self-hosted Git settings.
    pub gogs: GogsOpts,
}

impl RemoteSettings {
    /// Returns whether the flag for `kind` is set.
    pub fn is_enabled(&self, kind: RemoteKind) -> bool {
        match kind {
            RemoteKind::Github => self.github.enabled,
            RemoteKind::Gitlab => self.gitlab.enabled,
            RemoteKind::Bitbucket => self.bitbucket.enabled,
            RemoteKind::BitbucketServer => self.bitbucket_server.enabled,
            RemoteKind::Gogs => self.gogs.enabled,
        }
    }

    /// Returns every enabled kind, in selection priority order.
    pub fn enabled_kinds(&self) -> Vec<RemoteKind> {
        RemoteKind::PRIORITY
            .into_iter()
            .filter(|k| self.is_enabled(*k))
            .collect()
    }

    /// Sets the flag for `kind`.
    pub fn enable(&mut self, kind: RemoteKind) -> &mut Self {
        match kind {
            RemoteKind::Github => self.github.enabled = true,
            RemoteKind::Gitlab => self.gitlab.enabled = true,
            RemoteKind::Bitbucket => self.bitbucket.enabled = true,
            RemoteKind::BitbucketServer => self.bitbucket_server.enabled = true,
            RemoteKind::Gogs => self.gogs.enabled = true,
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_enables_nothing() {
        assert!(RemoteSettings::default().enabled_kinds().is_empty());
    }

    #[test]
    fn test_enabled_kinds_in_priority_order() {
        let mut settings = RemoteSettings::default();
        settings
            .enable(RemoteKind::Gogs)
            .enable(RemoteKind::Gitlab)
            .enable(RemoteKind::BitbucketServer);

        assert_eq!(
            settings.enabled_kinds(),
            vec![
                RemoteKind::Gitlab,
                RemoteKind::BitbucketServer,
                RemoteKind::Gogs
            ]
        );
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let settings: RemoteSettings = serde_json::from_str(
            r#"{"gogs": {"enabled": true, "server": "https://git.example.internal"}}"#,
        )
        .unwrap();

        assert!(settings.gogs.enabled);
        assert_eq!(settings.gogs.server, "https://git.example.internal");
        assert!(!settings.github.enabled);
        assert_eq!(settings.github.context, "continuous-integration/tributary");
    }
}
