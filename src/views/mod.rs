use minijinja::{Environment, default_auto_escape_callback};
use serde::Serialize;

mod components;
pub mod format;

pub use components::{
    BlogPage, MAX_CARD_CATEGORIES, MAX_CARD_TAGS, render_blog_header, render_blog_page,
    render_categories_sidebar, render_empty_state, render_post_card, render_search_form,
};

/// Templates compiled into the binary, keyed by the name components render them under.
const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("templates/layout.html")),
    ("blog_header.html", include_str!("templates/blog_header.html")),
    ("search_form.html", include_str!("templates/search_form.html")),
    ("categories_sidebar.html", include_str!("templates/categories_sidebar.html")),
    ("post_card.html", include_str!("templates/post_card.html")),
    ("empty_state.html", include_str!("templates/empty_state.html")),
    ("blog_page.html", include_str!("templates/blog_page.html")),
];

/// Views
///
/// The template environment behind the presentational components. Rendering
/// is pure: a component receives its data and returns markup.
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<C: Serialize>(&self, name: &str, context: C) -> Result<String, minijinja::Error> {
        self.env
            .get_template(name)?
            .render(minijinja::Value::from_serialize(&context))
    }
}
