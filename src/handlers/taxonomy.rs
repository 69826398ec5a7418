//! Label operations shared by the tag and category handlers.
//!
//! Every mutating path runs its integrity check (uniqueness or post count) as a
//! read right before the write. The store enforces the same rules, and its
//! constraint errors are mapped onto the same Conflict responses.

use crate::{
    auth::AuthUser,
    error::{ApiError, RepoError},
    models::{Label, LabelChanges, LabelKind, MessageResponse},
    repository::RepositoryState,
    validation::{CreateLabelRequest, UpdateLabelRequest},
};

fn not_found(kind: LabelKind) -> ApiError {
    ApiError::NotFound(format!("{} not found", kind.noun()))
}

fn duplicate(kind: LabelKind) -> ApiError {
    ApiError::Conflict(format!("{} with this name or slug already exists", kind.noun()))
}

fn in_use(kind: LabelKind) -> ApiError {
    ApiError::Conflict(format!(
        "Cannot delete {} with associated posts",
        kind.noun().to_lowercase()
    ))
}

/// Maps store-level constraint violations that slipped past the pre-checks.
fn map_write_error(kind: LabelKind, err: RepoError) -> ApiError {
    match err {
        RepoError::UniqueViolation(_) => duplicate(kind),
        RepoError::ForeignKeyViolation(_) => in_use(kind),
        other => ApiError::Internal(other),
    }
}

pub(crate) async fn list(repo: &RepositoryState, kind: LabelKind) -> Result<Vec<Label>, ApiError> {
    Ok(repo.list_labels(kind).await?)
}

pub(crate) async fn retrieve(
    repo: &RepositoryState,
    kind: LabelKind,
    id: &str,
) -> Result<Label, ApiError> {
    repo.get_label(kind, id).await?.ok_or_else(|| not_found(kind))
}

pub(crate) async fn create(
    repo: &RepositoryState,
    kind: LabelKind,
    user: &AuthUser,
    payload: CreateLabelRequest,
) -> Result<Label, ApiError> {
    let new_label = payload.into_new_label()?;

    let conflict = repo
        .find_conflicting_label(kind, None, Some(&new_label.name), Some(&new_label.slug))
        .await?;
    if conflict.is_some() {
        return Err(duplicate(kind));
    }

    let label = repo
        .create_label(kind, new_label)
        .await
        .map_err(|e| map_write_error(kind, e))?;
    tracing::info!(kind = kind.noun(), id = %label.id, user_id = %user.id, "label created");
    Ok(label)
}

/// Partial update: only supplied fields are checked for uniqueness and written.
/// A missing id is reported before any conflict.
pub(crate) async fn update(
    repo: &RepositoryState,
    kind: LabelKind,
    user: &AuthUser,
    id: &str,
    payload: UpdateLabelRequest,
) -> Result<Label, ApiError> {
    let current = retrieve(repo, kind, id).await?;
    let changes = LabelChanges::from(payload);
    if changes.is_empty() {
        return Ok(current);
    }

    let conflict = repo
        .find_conflicting_label(kind, Some(id), changes.name.as_deref(), changes.slug.as_deref())
        .await?;
    if conflict.is_some() {
        return Err(duplicate(kind));
    }

    let label = repo
        .update_label(kind, id, changes)
        .await
        .map_err(|e| map_write_error(kind, e))?
        .ok_or_else(|| not_found(kind))?;
    tracing::info!(kind = kind.noun(), id = %label.id, user_id = %user.id, "label updated");
    Ok(label)
}

/// Refuses to delete a label that still has posts.
pub(crate) async fn delete(
    repo: &RepositoryState,
    kind: LabelKind,
    user: &AuthUser,
    id: &str,
) -> Result<MessageResponse, ApiError> {
    let label = retrieve(repo, kind, id).await?;
    if label.post_count > 0 {
        return Err(in_use(kind));
    }

    let deleted = repo
        .delete_label(kind, id)
        .await
        .map_err(|e| map_write_error(kind, e))?;
    if !deleted {
        return Err(not_found(kind));
    }

    tracing::info!(kind = kind.noun(), id, user_id = %user.id, "label deleted");
    Ok(MessageResponse {
        message: format!("{} deleted successfully", kind.noun()),
    })
}
