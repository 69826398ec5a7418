use blog_cms::{
    models::{Author, Label, LabelRef, PostSummary},
    views::{
        BlogPage, Views, render_blog_header, render_blog_page, render_categories_sidebar,
        render_empty_state, render_post_card,
    },
};
use chrono::{Duration, TimeZone, Utc};

fn views() -> Views {
    Views::new().expect("templates compile")
}

fn category(id: &str, name: &str, slug: &str, post_count: i64) -> Label {
    Label {
        id: id.to_string(),
        name: name.to_string(),
        slug: slug.to_string(),
        post_count,
        ..Default::default()
    }
}

fn post(title: &str, author: &str, image: Option<&str>) -> PostSummary {
    PostSummary {
        id: title.to_lowercase(),
        title: title.to_string(),
        slug: title.to_lowercase().replace(' ', "-"),
        excerpt: None,
        published_at: Some(Utc::now() - Duration::hours(5)),
        created_at: Utc::now() - Duration::days(1),
        author: Author {
            name: author.to_string(),
            image: image.map(str::to_string),
        },
        categories: vec![],
        tags: vec![],
    }
}

// --- PostCard ---

#[test]
fn test_post_card_without_excerpt_has_no_excerpt_paragraph() {
    let html = render_post_card(&views(), &post("Hello", "Ada", None), Utc::now()).unwrap();
    assert!(!html.contains("post-excerpt"));
    assert!(html.contains(r#"href="/blog/hello""#));
}

#[test]
fn test_post_card_shows_excerpt_escaped() {
    let mut summary = post("Hello", "Ada", None);
    summary.excerpt = Some("Fast & <safe>".to_string());

    let html = render_post_card(&views(), &summary, Utc::now()).unwrap();
    assert!(html.contains("post-excerpt"));
    assert!(html.contains("Fast &amp; &lt;safe&gt;"));
}

#[test]
fn test_post_card_avatar_falls_back_to_initial() {
    let html = render_post_card(&views(), &post("Hello", "linus", None), Utc::now()).unwrap();
    assert!(html.contains(r#"<span class="avatar avatar-fallback">L</span>"#));
    assert!(!html.contains("<img"));

    let html = render_post_card(&views(), &post("Hello", "   ", None), Utc::now()).unwrap();
    assert!(html.contains(r#"<span class="avatar avatar-fallback">?</span>"#));
}

#[test]
fn test_post_card_uses_author_image_when_present() {
    let html = render_post_card(
        &views(),
        &post("Hello", "Ada", Some("avatar.png")),
        Utc::now(),
    )
    .unwrap();
    assert!(html.contains(r#"src="avatar.png""#));
    assert!(!html.contains("avatar-fallback"));
}

#[test]
fn test_post_card_dates() {
    let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
    let mut summary = post("Hello", "Ada", None);
    summary.published_at = Some(now - Duration::hours(3));

    let html = render_post_card(&views(), &summary, now).unwrap();
    assert!(html.contains("3 hours ago"));
    assert!(html.contains(r#"title="March 10, 2025""#));

    // Drafts fall back to created_at.
    summary.published_at = None;
    summary.created_at = now - Duration::days(2);
    let html = render_post_card(&views(), &summary, now).unwrap();
    assert!(html.contains("2 days ago"));
}

#[test]
fn test_post_card_category_badges_link_to_filter() {
    let mut summary = post("Hello", "Ada", None);
    summary.categories = vec![LabelRef {
        id: "c1".to_string(),
        name: "Engineering".to_string(),
        slug: "engineering".to_string(),
    }];
    summary.tags = vec![LabelRef {
        id: "t1".to_string(),
        name: "rust".to_string(),
        slug: "rust".to_string(),
    }];

    let html = render_post_card(&views(), &summary, Utc::now()).unwrap();
    assert!(html.contains(r#"href="/blog?category=engineering""#));
    assert!(html.contains("#rust"));
}

// --- CategoriesSidebar ---

#[test]
fn test_sidebar_all_posts_active_without_selection() {
    let categories = vec![
        category("c1", "Engineering", "engineering", 4),
        category("c2", "Culture", "culture", 1),
    ];

    let html = render_categories_sidebar(&views(), &categories, 5, None).unwrap();
    assert!(html.contains(r#"href="/blog" class="sidebar-link active""#));
    assert!(html.contains(r#"<span class="count">5</span>"#));
    assert!(html.contains(r#"<span class="count">4</span>"#));
    assert!(!html.contains(r#"category=engineering" class="sidebar-link active""#));

    // Input order is kept.
    assert!(html.find("Engineering").unwrap() < html.find("Culture").unwrap());
}

#[test]
fn test_sidebar_highlights_selected_category() {
    let categories = vec![category("c1", "Engineering", "engineering", 4)];

    let html = render_categories_sidebar(&views(), &categories, 4, Some("engineering")).unwrap();
    assert!(html.contains(r#"href="/blog?category=engineering" class="sidebar-link active""#));
    assert!(html.contains(r#"href="/blog" class="sidebar-link""#));
}

// --- Static components ---

#[test]
fn test_header_and_empty_state_are_static() {
    let views = views();
    let header = render_blog_header(&views).unwrap();
    assert_eq!(header, render_blog_header(&views).unwrap());
    assert!(header.contains(r#"<a href="/blog" class="site-title"#));
    assert!(!header.contains(r#"href="/""#));
    let empty = render_empty_state(&views).unwrap();
    assert!(empty.contains("No posts found"));
    assert!(empty.contains(r#"href="/blog""#));
}

// --- BlogPage ---

#[test]
fn test_blog_page_empty_shows_empty_state() {
    let page = BlogPage {
        categories: vec![category("c1", "Engineering", "engineering", 0)],
        ..Default::default()
    };

    let html = render_blog_page(&views(), &page, Utc::now()).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("No posts found"));
    assert!(!html.contains("post-grid"));
    assert!(html.contains("Latest posts"));
}

#[test]
fn test_blog_page_headings() {
    let categories = vec![category("c1", "Engineering", "engineering", 1)];

    let page = BlogPage {
        posts: vec![post("Hello", "Ada", None)],
        categories: categories.clone(),
        total_posts: 1,
        active_category: Some("engineering".to_string()),
        query: None,
    };
    let html = render_blog_page(&views(), &page, Utc::now()).unwrap();
    assert!(html.contains("<h1>Engineering</h1>"));
    assert!(html.contains("post-grid"));

    let page = BlogPage {
        posts: vec![],
        categories,
        total_posts: 1,
        active_category: None,
        query: Some("borrow".to_string()),
    };
    let html = render_blog_page(&views(), &page, Utc::now()).unwrap();
    assert!(html.contains("Search results for \u{201c}borrow\u{201d}"));
    assert!(html.contains(r#"value="borrow""#));
}
