//! Build trigger.
//!
//! A trigger fetches the pipeline document at a commit, runs it through the
//! transform chain and reports the outcome to the provider as a commit
//! status. Executing the transformed document is left to the build runner.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use tributary_core::PipelineConfig;
use tributary_remote::{BuildStatus, CommitStatus, Remote, Repo, User};

use super::repos::refreshed;
use crate::error::AppError;
use crate::extractors::{BoundRemote, RepoPath, RequireUser};
use crate::state::AppState;

/// Trigger request body.
#[derive(Debug, Deserialize)]
pub struct TriggerRequest {
    /// Commit to build.
    pub commit: String,
    /// Branch or tag; the default branch when omitted.
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
    /// Pull request number, when building a pull request.
    #[serde(default)]
    pub pull_request: Option<u64>,
}

/// Accepted build.
#[derive(Debug, Serialize)]
pub struct TriggerResponse {
    pub repo: String,
    pub commit: String,
    /// Ref the runner should fetch.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// The transformed pipeline document.
    pub config: PipelineConfig,
}

/// `POST /api/repos/{owner}/{name}/builds`
#[instrument(skip_all, fields(owner = %path.owner, name = %path.name, commit = %request.commit))]
pub async fn trigger_build(
    State(state): State<AppState>,
    remote: BoundRemote,
    RequireUser(user): RequireUser,
    Path(path): Path<RepoPath>,
    Json(request): Json<TriggerRequest>,
) -> Result<Json<TriggerResponse>, AppError> {
    let repo_ref = path.repo_ref().map_err(AppError::BadRequest)?;
    let commit = request.commit.trim().to_string();
    if commit.is_empty() {
        return Err(AppError::BadRequest("commit is required".to_string()));
    }

    let user = refreshed(&*remote, user).await?;
    let repo = remote.repo(&user, &repo_ref).await?;

    let settings = state.settings();
    let raw = remote
        .file(&user, &repo, &commit, &settings.pipeline.config_path)
        .await?;
    let link = settings
        .server
        .link(&format!("/{}/{}/{}", repo.owner, repo.name, commit));

    let transformed =
        PipelineConfig::from_slice(&raw).and_then(|doc| state.transforms().apply(doc));
    let config = match transformed {
        Ok(config) => config,
        Err(e) => {
            let status = CommitStatus::new(&commit, BuildStatus::Error, &link)
                .with_description(e.to_string());
            report(&*remote, &user, &repo, &status).await;
            return Err(e.into());
        }
    };

    report(
        &*remote,
        &user,
        &repo,
        &CommitStatus::new(&commit, BuildStatus::Pending, &link),
    )
    .await;

    let git_ref = request
        .pull_request
        .and_then(|n| remote.pull_request_ref(n))
        .or(request.git_ref)
        .unwrap_or_else(|| format!("refs/heads/{}", repo.default_branch));

    info!(repo = %repo.full_name, git_ref = %git_ref, "Build accepted");
    Ok(Json(TriggerResponse {
        repo: repo.full_name,
        commit,
        git_ref,
        config,
    }))
}

/// Reports a commit status. Failures are logged, not returned: the build
/// outcome does not depend on the provider accepting the annotation.
async fn report(remote: &dyn Remote, user: &User, repo: &Repo, status: &CommitStatus) {
    if let Err(e) = remote.status(user, repo, status).await {
        warn!(repo = %repo.full_name, error = %e, "Failed to report commit status");
    }
}
