use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Views, format};
use crate::models::{Label, LabelRef, PostSummary};

/// Category badges shown on a post card.
pub const MAX_CARD_CATEGORIES: usize = 2;
/// Tag badges shown on a post card.
pub const MAX_CARD_TAGS: usize = 3;

// Paths are written literally in the templates: auto-escaping would mangle `/`.

// --- BlogHeader ---

pub fn render_blog_header(views: &Views) -> Result<String, minijinja::Error> {
    views.render("blog_header.html", ())
}

// --- SearchForm ---

#[derive(Serialize)]
struct SearchFormProps<'a> {
    query: &'a str,
}

/// Text input plus submit; the form GETs `/blog/search` with `q`.
pub fn render_search_form(views: &Views, query: Option<&str>) -> Result<String, minijinja::Error> {
    views.render(
        "search_form.html",
        SearchFormProps {
            query: query.unwrap_or_default(),
        },
    )
}

// --- CategoriesSidebar ---

#[derive(Serialize)]
struct SidebarLink<'a> {
    name: &'a str,
    slug: &'a str,
    count: i64,
    active: bool,
}

#[derive(Serialize)]
struct SidebarProps<'a> {
    all_posts: SidebarLink<'a>,
    categories: Vec<SidebarLink<'a>>,
}

/// "All posts" link followed by one link per category, in the order given.
pub fn render_categories_sidebar(
    views: &Views,
    categories: &[Label],
    total_posts: i64,
    active_slug: Option<&str>,
) -> Result<String, minijinja::Error> {
    let props = SidebarProps {
        all_posts: SidebarLink {
            name: "All posts",
            slug: "",
            count: total_posts,
            active: active_slug.is_none(),
        },
        categories: categories
            .iter()
            .map(|category| SidebarLink {
                name: &category.name,
                slug: &category.slug,
                count: category.post_count,
                active: active_slug == Some(category.slug.as_str()),
            })
            .collect(),
    };
    views.render("categories_sidebar.html", props)
}

// --- PostCard ---

#[derive(Serialize)]
struct AuthorProps<'a> {
    name: &'a str,
    image: Option<&'a str>,
    initial: String,
}

#[derive(Serialize)]
struct PostCardProps<'a> {
    title: &'a str,
    slug: &'a str,
    excerpt: Option<&'a str>,
    author: AuthorProps<'a>,
    date_iso: String,
    date_absolute: String,
    date_relative: String,
    categories: &'a [LabelRef],
    tags: &'a [LabelRef],
}

/// Renders one post. The date shown is `published_at`, or `created_at` for
/// unpublished posts; at most `MAX_CARD_CATEGORIES` categories and
/// `MAX_CARD_TAGS` tags become badges.
pub fn render_post_card(
    views: &Views,
    post: &PostSummary,
    now: DateTime<Utc>,
) -> Result<String, minijinja::Error> {
    let date = post.published_at.unwrap_or(post.created_at);
    let props = PostCardProps {
        title: &post.title,
        slug: &post.slug,
        excerpt: post.excerpt.as_deref(),
        author: AuthorProps {
            name: &post.author.name,
            image: post.author.image.as_deref(),
            initial: format::initial(&post.author.name),
        },
        date_iso: date.to_rfc3339(),
        date_absolute: format::absolute_date(date),
        date_relative: format::relative_date(date, now),
        categories: &post.categories[..post.categories.len().min(MAX_CARD_CATEGORIES)],
        tags: &post.tags[..post.tags.len().min(MAX_CARD_TAGS)],
    };
    views.render("post_card.html", props)
}

// --- EmptyState ---

pub fn render_empty_state(views: &Views) -> Result<String, minijinja::Error> {
    views.render("empty_state.html", ())
}

// --- BlogPage ---

/// BlogPage
///
/// Data a page handler fetched for one listing render.
#[derive(Debug, Clone, Default)]
pub struct BlogPage {
    pub posts: Vec<PostSummary>,
    pub categories: Vec<Label>,
    pub total_posts: i64,
    pub active_category: Option<String>,
    pub query: Option<String>,
}

#[derive(Serialize)]
struct BlogPageProps {
    heading: String,
    header: String,
    search_form: String,
    sidebar: String,
    cards: Vec<String>,
    empty_state: Option<String>,
}

/// Composes header, search form, sidebar and either the card grid or the empty state.
pub fn render_blog_page(
    views: &Views,
    page: &BlogPage,
    now: DateTime<Utc>,
) -> Result<String, minijinja::Error> {
    let query = page.query.as_deref();
    let heading = match (query, page.active_category.as_deref()) {
        (Some(q), _) => format!("Search results for \u{201c}{q}\u{201d}"),
        (None, Some(slug)) => page
            .categories
            .iter()
            .find(|category| category.slug == slug)
            .map(|category| category.name.clone())
            .unwrap_or_else(|| "Posts".to_string()),
        (None, None) => "Latest posts".to_string(),
    };

    let cards = page
        .posts
        .iter()
        .map(|post| render_post_card(views, post, now))
        .collect::<Result<Vec<_>, _>>()?;
    let empty_state = if page.posts.is_empty() {
        Some(render_empty_state(views)?)
    } else {
        None
    };

    let props = BlogPageProps {
        heading,
        header: render_blog_header(views)?,
        search_form: render_search_form(views, query)?,
        sidebar: render_categories_sidebar(
            views,
            &page.categories,
            page.total_posts,
            page.active_category.as_deref(),
        )?,
        cards,
        empty_state,
    };
    views.render("blog_page.html", props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Author;

    fn label_ref(n: usize) -> LabelRef {
        LabelRef {
            id: format!("l{n}"),
            name: format!("label-{n}"),
            slug: format!("label-{n}"),
        }
    }

    #[test]
    fn card_caps_badges() {
        let views = Views::new().unwrap();
        let post = PostSummary {
            title: "Caps".into(),
            slug: "caps".into(),
            author: Author {
                name: "Ada".into(),
                image: None,
            },
            categories: (0..4).map(label_ref).collect(),
            tags: (10..15).map(label_ref).collect(),
            ..Default::default()
        };

        let html = render_post_card(&views, &post, Utc::now()).unwrap();
        assert_eq!(html.matches("badge-category").count(), MAX_CARD_CATEGORIES);
        assert_eq!(html.matches("badge-tag").count(), MAX_CARD_TAGS);
        assert!(html.contains("label-1"));
        assert!(!html.contains("label-2"));
        assert!(html.contains("label-12"));
        assert!(!html.contains("label-13"));
    }

    #[test]
    fn search_form_escapes_query() {
        let views = Views::new().unwrap();
        let html = render_search_form(&views, Some("<script>")).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains(r#"action="/blog/search""#));
    }
}
