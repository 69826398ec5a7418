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

const KIND: LabelKind = LabelKind::Category;

/// list_categories
///
/// [Admin Route] All categories with their post counts, ordered by name.
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Categories", body = [Label]),
        (status = 401, description = "No session", body = ErrorBody)
    )
)]
pub async fn list_categories(
    _user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Label>>, ApiError> {
    Ok(Json(taxonomy::list(&state.repo, KIND).await?))
}

/// create_category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateLabelRequest,
    responses(
        (status = 201, description = "Created", body = Label),
        (status = 400, description = "Invalid input or duplicate name/slug", body = ErrorBody),
        (status = 401, description = "No session", body = ErrorBody)
    )
)]
pub async fn create_category(
    user: AuthUser,
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateLabelRequest>,
) -> Result<(StatusCode, Json<Label>), ApiError> {
    let category = taxonomy::create(&state.repo, KIND, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// get_category
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Found", body = Label),
        (status = 401, description = "No session", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_category(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Label>, ApiError> {
    Ok(Json(taxonomy::retrieve(&state.repo, KIND, &id).await?))
}

/// update_category
///
/// [Admin Route] Same partial-update rules as tags.
#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    params(("id" = String, Path, description = "Category ID")),
    request_body = UpdateLabelRequest,
    responses(
        (status = 200, description = "Updated", body = Label),
        (status = 400, description = "Invalid input or duplicate name/slug", body = ErrorBody),
        (status = 401, description = "No session", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn update_category(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<UpdateLabelRequest>,
) -> Result<Json<Label>, ApiError> {
    Ok(Json(
        taxonomy::update(&state.repo, KIND, &user, &id, payload).await?,
    ))
}

/// delete_category
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = String, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 400, description = "Category has posts", body = ErrorBody),
        (status = 401, description = "No session", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn delete_category(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    Ok(Json(taxonomy::delete(&state.repo, KIND, &user, &id).await?))
}
