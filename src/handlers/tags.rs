use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::taxonomy;
use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ErrorBody},
    models::{Label, LabelKind, MessageResponse},
    validation::{CreateLabelRequest, UpdateLabelRequest, ValidJson},
};

const KIND: LabelKind = LabelKind::Tag;

/// list_tags
///
/// [Admin Route] All tags with their post counts, ordered by name.
#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "Tags", body = [Label]),
        (status = 401, description = "No session", body = ErrorBody)
    )
)]
pub async fn list_tags(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Label>>, ApiError> {
    Ok(Json(taxonomy::list(&state.repo, KIND).await?))
}

/// create_tag
///
/// [Admin Route] Creates a tag. The slug is derived from the name when omitted.
#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = CreateLabelRequest,
    responses(
        (status = 201, description = "Created", body = Label),
        (status = 400, description = "Invalid input or duplicate name/slug", body = ErrorBody),
        (status = 401, description = "No session", body = ErrorBody)
    )
)]
pub async fn create_tag(
    user: AuthUser,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateLabelRequest>,
) -> Result<(StatusCode, Json<Label>), ApiError> {
    let tag = taxonomy::create(&state.repo, KIND, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// get_tag
///
/// [Admin Route] A single tag with its post count.
#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    params(("id" = String, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Found", body = Label),
        (status = 401, description = "No session", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_tag(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Label>, ApiError> {
    Ok(Json(taxonomy::retrieve(&state.repo, KIND, &id).await?))
}

/// update_tag
///
/// [Admin Route] Partial update of name and/or slug. Fields left out of the
/// body keep their stored values.
#[utoipa::path(
    patch,
    path = "/api/tags/{id}",
    params(("id" = String, Path, description = "Tag ID")),
    request_body = UpdateLabelRequest,
    responses(
        (status = 200, description = "Updated", body = Label),
        (status = 400, description = "Invalid input or duplicate name/slug", body = ErrorBody),
        (status = 401, description = "No session", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_tag(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<UpdateLabelRequest>,
) -> Result<Json<Label>, ApiError> {
    Ok(Json(
        taxonomy::update(&state.repo, KIND, &user, &id, payload).await?,
    ))
}

/// delete_tag
///
/// [Admin Route] Deletes a tag that has no associated posts.
#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    params(("id" = String, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 400, description = "Tag has posts", body = ErrorBody),
        (status = 401, description = "No session", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_tag(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    Ok(Json(taxonomy::delete(&state.repo, KIND, &user, &id).await?))
}
