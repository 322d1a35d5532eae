//! Startup selection of the active remote.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::SetupError;
use crate::providers::{Bitbucket, BitbucketServer, Github, Gitlab, Gogs};
use crate::remote::{Remote, RemoteKind};
use crate::settings::RemoteSettings;

/// Chooses and constructs the one remote the process will use.
///
/// Kinds are checked in [`RemoteKind::PRIORITY`] order and the first enabled
/// one wins; any other enabled kinds are ignored with a warning. The call
/// fails when nothing is enabled or the chosen provider rejects its
/// settings. Both failures are meant to stop the process before it serves.
pub fn select_remote(settings: &RemoteSettings) -> Result<Arc<dyn Remote>, SetupError> {
    let enabled = settings.enabled_kinds();
    let Some((&kind, ignored)) = enabled.split_first() else {
        return Err(SetupError::NoProviderConfigured);
    };

    if !ignored.is_empty() {
        let names: Vec<&str> = ignored.iter().map(|k| k.as_key()).collect();
        warn!(
            selected = %kind,
            ignored = ?names,
            "Multiple remotes enabled, using the first by priority"
        );
    }

    let remote = build(kind, settings)?;
    info!(remote = %kind, "Remote selected");
    Ok(remote)
}

fn build(kind: RemoteKind, settings: &RemoteSettings) -> Result<Arc<dyn Remote>, SetupError> {
    let remote: Arc<dyn Remote> = match kind {
        RemoteKind::Github => Arc::new(Github::new(settings.github.clone())?),
        RemoteKind::Gitlab => Arc::new(Gitlab::new(settings.gitlab.clone())?),
        RemoteKind::Bitbucket => Arc::new(Bitbucket::new(settings.bitbucket.clone())?),
        RemoteKind::BitbucketServer => {
            Arc::new(BitbucketServer::new(settings.bitbucket_server.clone())?)
        }
        RemoteKind::Gogs => Arc::new(Gogs::new(settings.gogs.clone())?),
    };
    Ok(remote)
}
