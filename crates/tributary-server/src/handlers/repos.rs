//! Repository API.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::{debug, info, instrument};
use tributary_remote::{Permission, Remote, RemoteError, Repo, User};

use crate::error::AppError;
use crate::extractors::{BoundRemote, RepoPath, RequireUser};
use crate::state::AppState;

/// A repository together with the caller's access to it.
#[derive(Debug, Serialize)]
pub struct RepoDetail {
    #[serde(flatten)]
    pub repo: Repo,
    pub permissions: Permission,
}

/// Refreshes the user's token if the provider says it is about to expire.
///
/// The refreshed token only lives for the current request. Storing it back
/// into the session is up to the session layer that attached the user.
pub(crate) async fn refreshed(remote: &dyn Remote, mut user: User) -> Result<User, AppError> {
    if remote.refresh(&mut user).await? {
        debug!(user = %user.login, "Token refreshed");
    }
    Ok(user)
}

/// `GET /api/user/repos`
#[instrument(skip_all, fields(user = %user.login))]
pub async fn list_repos(
    remote: BoundRemote,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Repo>>, AppError> {
    let user = refreshed(&*remote, user).await?;
    let repos = remote.repos(&user).await?;
    debug!(count = repos.len(), "Listed repositories");
    Ok(Json(repos))
}

/// `GET /api/repos/{owner}/{name}`
#[instrument(skip_all, fields(owner = %path.owner, name = %path.name))]
pub async fn get_repo(
    remote: BoundRemote,
    RequireUser(user): RequireUser,
    Path(path): Path<RepoPath>,
) -> Result<Json<RepoDetail>, AppError> {
    let repo_ref = path.repo_ref().map_err(AppError::BadRequest)?;
    let user = refreshed(&*remote, user).await?;

    let repo = remote.repo(&user, &repo_ref).await?;
    let permissions = remote.perm(&user, &repo_ref).await?;
    Ok(Json(RepoDetail { repo, permissions }))
}

/// `POST /api/repos/{owner}/{name}` - installs the webhook.
#[instrument(skip_all, fields(owner = %path.owner, name = %path.name))]
pub async fn activate_repo(
    State(state): State<AppState>,
    remote: BoundRemote,
    RequireUser(user): RequireUser,
    Path(path): Path<RepoPath>,
) -> Result<Json<Repo>, AppError> {
    let repo_ref = path.repo_ref().map_err(AppError::BadRequest)?;
    let user = refreshed(&*remote, user).await?;

    let (repo, _) = admin_repo(&*remote, &user, &repo_ref).await?;
    let link = state.settings().server.link("/hook");
    remote.activate(&user, &repo, &link).await?;

    info!(repo = %repo.full_name, link = %link, "Repository activated");
    Ok(Json(repo))
}

/// `DELETE /api/repos/{owner}/{name}` - removes the webhook.
#[instrument(skip_all, fields(owner = %path.owner, name = %path.name))]
pub async fn deactivate_repo(
    State(state): State<AppState>,
    remote: BoundRemote,
    RequireUser(user): RequireUser,
    Path(path): Path<RepoPath>,
) -> Result<StatusCode, AppError> {
    let repo_ref = path.repo_ref().map_err(AppError::BadRequest)?;
    let user = refreshed(&*remote, user).await?;

    let (repo, _) = admin_repo(&*remote, &user, &repo_ref).await?;
    let link = state.settings().server.link("/hook");
    remote.deactivate(&user, &repo, &link).await?;

    info!(repo = %repo.full_name, "Repository deactivated");
    Ok(StatusCode::NO_CONTENT)
}

async fn admin_repo(
    remote: &dyn Remote,
    user: &User,
    repo_ref: &tributary_remote::RepoRef,
) -> Result<(Repo, Permission), AppError> {
    let permissions = remote.perm(user, repo_ref).await?;
    if !permissions.admin {
        return Err(RemoteError::permission_denied(format!(
            "{} requires admin access to {}",
            user.login, repo_ref
        ))
        .into());
    }
    let repo = remote.repo(user, repo_ref).await?;
    Ok((repo, permissions))
}
