use axum::{
    extract::{Query, State},
    response::Html,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    AppState,
    error::ApiError,
    models::{LabelKind, PostFilter},
    views::{BlogPage, render_blog_page},
};

/// BlogFilter
///
/// Query parameters of the public listing (GET /blog).
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BlogFilter {
    /// Only show posts in the category with this slug.
    pub category: Option<String>,
}

/// SearchParams
///
/// Query parameters of the search page (GET /blog/search).
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive text matched against post titles and excerpts.
    pub q: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fetches everything the listing components need, then renders the page.
async fn render_listing(
    state: &AppState,
    filter: PostFilter,
) -> Result<Html<String>, ApiError> {
    let posts = state.repo.list_published_posts(&filter).await?;
    let categories = state.repo.list_labels(LabelKind::Category).await?;
    let total_posts = state.repo.count_published_posts().await?;

    let page = BlogPage {
        posts,
        categories,
        total_posts,
        active_category: filter.category_slug,
        query: filter.search,
    };
    let html = render_blog_page(&state.views, &page, Utc::now())?;
    Ok(Html(html))
}

/// blog_index
///
/// [Public Route] Published posts, newest first, optionally narrowed to one category.
#[utoipa::path(
    get,
    path = "/blog",
    params(BlogFilter),
    responses((status = 200, description = "Blog listing page", content_type = "text/html", body = String))
)]
pub async fn blog_index(
    State(state): State<AppState>,
    Query(params): Query<BlogFilter>,
) -> Result<Html<String>, ApiError> {
    let filter = PostFilter {
        search: None,
        category_slug: non_blank(params.category),
    };
    render_listing(&state, filter).await
}

/// blog_search
///
/// [Public Route] Published posts whose title or excerpt contains `q`. A blank
/// query renders the plain listing.
#[utoipa::path(
    get,
    path = "/blog/search",
    params(SearchParams),
    responses((status = 200, description = "Search results page", content_type = "text/html", body = String))
)]
pub async fn blog_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, ApiError> {
    let filter = PostFilter {
        search: non_blank(params.q),
        category_slug: None,
    };
    render_listing(&state, filter).await
}
