use crate::{
    AppState,
    handlers::{categories, tags},
};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Label management API, nested under `/api`. The router returned here must be
/// wrapped in the `require_session` guard (see `create_router`), so every
/// handler runs with a resolved `AuthUser` and unauthenticated requests never
/// reach body parsing or the store.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /api/tags
        .route("/tags", get(tags::list_tags).post(tags::create_tag))
        // GET/PATCH/DELETE /api/tags/{id}
        // PATCH is a partial update; DELETE refuses while posts reference the tag.
        .route(
            "/tags/{id}",
            get(tags::get_tag)
                .patch(tags::update_tag)
                .delete(tags::delete_tag),
        )
        // GET/POST /api/categories
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        // GET/PATCH/DELETE /api/categories/{id}
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .patch(categories::update_category)
                .delete(categories::delete_category),
        )
}
