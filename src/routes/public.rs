use crate::{AppState, handlers::blog};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Unauthenticated, read-only endpoints: the health probe and the blog pages.
/// The page handlers only ever show published posts.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /blog?category=...
        // Listing page composed from the presentational components.
        .route("/blog", get(blog::blog_index))
        // GET /blog/search?q=...
        .route("/blog/search", get(blog::blog_search))
}
