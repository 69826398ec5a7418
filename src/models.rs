use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// A row of the `users` table. Users are both session principals and post authors.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

/// LabelKind
///
/// The two label taxonomies attachable to posts. Both share the same table
/// layout, so the kind only decides where a label lives and how it is named
/// in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Tag,
    Category,
}

impl LabelKind {
    /// Capitalised noun used in response messages ("Tag not found").
    pub fn noun(self) -> &'static str {
        match self {
            LabelKind::Tag => "Tag",
            LabelKind::Category => "Category",
        }
    }

    pub fn table(self) -> &'static str {
        match self {
            LabelKind::Tag => "tags",
            LabelKind::Category => "categories",
        }
    }

    /// Join table linking posts to labels of this kind.
    pub fn join_table(self) -> &'static str {
        match self {
            LabelKind::Tag => "post_tags",
            LabelKind::Category => "post_categories",
        }
    }

    /// Foreign key column inside `join_table`.
    pub fn join_column(self) -> &'static str {
        match self {
            LabelKind::Tag => "tag_id",
            LabelKind::Category => "category_id",
        }
    }
}

/// Label
///
/// A tag or category together with its derived post count. The count is
/// computed at read time and is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Label {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub post_count: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// LabelRef
///
/// The slice of a label a post card needs for its badges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct LabelRef {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Author
///
/// The public face of a post's author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Author {
    pub name: String,
    pub image: Option<String>,
}

/// PostSummary
///
/// Everything the blog listing shows about a post. Posts are read-only here;
/// they are authored elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    pub author: Author,
    pub categories: Vec<LabelRef>,
    pub tags: Vec<LabelRef>,
}

/// PostFilter
///
/// Narrowing applied to the public listing. Both fields are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostFilter {
    /// Case-insensitive substring matched against title and excerpt.
    pub search: Option<String>,
    pub category_slug: Option<String>,
}

// --- Repository inputs ---

/// NewLabel
///
/// A fully resolved label ready for insertion (slug already derived).
#[derive(Debug, Clone, PartialEq)]
pub struct NewLabel {
    pub name: String,
    pub slug: String,
}

/// LabelChanges
///
/// Partial update: `None` leaves the stored column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
}

impl LabelChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.slug.is_none()
    }
}

// --- Responses ---

/// MessageResponse
///
/// Plain acknowledgment body (e.g. after a delete).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}
