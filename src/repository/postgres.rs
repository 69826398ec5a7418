use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, QueryBuilder};
use std::collections::HashMap;
use uuid::Uuid;

use super::{RepoResult, Repository};
use crate::models::{
    Author, Label, LabelChanges, LabelKind, LabelRef, NewLabel, PostFilter, PostSummary, User,
};

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// Table names come from `LabelKind` and are never user input; every value is bound.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> RepoResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// `SELECT` prefix returning `Label` rows with their derived post count.
    fn label_select(kind: LabelKind) -> String {
        format!(
            "SELECT l.id, l.name, l.slug, COUNT(j.post_id) AS post_count, l.created_at, l.updated_at \
             FROM {table} l LEFT JOIN {join} j ON j.{column} = l.id",
            table = kind.table(),
            join = kind.join_table(),
            column = kind.join_column(),
        )
    }

    /// Loads the label badges of the given posts, keyed by post id.
    async fn labels_for_posts(
        &self,
        kind: LabelKind,
        post_ids: &[String],
    ) -> RepoResult<HashMap<String, Vec<LabelRef>>> {
        let query = format!(
            "SELECT j.post_id, l.id, l.name, l.slug FROM {join} j \
             JOIN {table} l ON l.id = j.{column} \
             WHERE j.post_id = ANY($1) ORDER BY l.name ASC",
            table = kind.table(),
            join = kind.join_table(),
            column = kind.join_column(),
        );
        let rows = sqlx::query_as::<_, PostLabelRow>(&query)
            .bind(post_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut grouped: HashMap<String, Vec<LabelRef>> = HashMap::new();
        for row in rows {
            grouped.entry(row.post_id).or_default().push(LabelRef {
                id: row.id,
                name: row.name,
                slug: row.slug,
            });
        }
        Ok(grouped)
    }
}

/// Makes `%`, `_` and `\` match literally inside an `ILIKE ... ESCAPE '\'` pattern.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Raw post row joined with its author.
#[derive(FromRow)]
struct PostRow {
    id: String,
    title: String,
    slug: String,
    excerpt: Option<String>,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    author_name: String,
    author_image: Option<String>,
}

#[derive(FromRow)]
struct PostLabelRow {
    post_id: String,
    id: String,
    name: String,
    slug: String,
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, email, image FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list_labels(&self, kind: LabelKind) -> RepoResult<Vec<Label>> {
        let query = format!("{} GROUP BY l.id ORDER BY l.name ASC", Self::label_select(kind));
        let labels = sqlx::query_as::<_, Label>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(labels)
    }

    async fn get_label(&self, kind: LabelKind, id: &str) -> RepoResult<Option<Label>> {
        let query = format!("{} WHERE l.id = $1 GROUP BY l.id", Self::label_select(kind));
        let label = sqlx::query_as::<_, Label>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(label)
    }

    /// Builds `(name = $n OR slug = $m) AND id <> $k` from whichever criteria are present.
    async fn find_conflicting_label(
        &self,
        kind: LabelKind,
        exclude_id: Option<&str>,
        name: Option<&str>,
        slug: Option<&str>,
    ) -> RepoResult<Option<Label>> {
        if name.is_none() && slug.is_none() {
            return Ok(None);
        }

        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(Self::label_select(kind));
        builder.push(" WHERE (");
        let mut criteria = builder.separated(" OR ");
        if let Some(name) = name {
            criteria.push("l.name = ");
            criteria.push_bind_unseparated(name.to_string());
        }
        if let Some(slug) = slug {
            criteria.push("l.slug = ");
            criteria.push_bind_unseparated(slug.to_string());
        }
        builder.push(")");
        if let Some(exclude_id) = exclude_id {
            builder.push(" AND l.id <> ");
            builder.push_bind(exclude_id.to_string());
        }
        builder.push(" GROUP BY l.id LIMIT 1");

        let conflict = builder
            .build_query_as::<Label>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(conflict)
    }

    async fn create_label(&self, kind: LabelKind, label: NewLabel) -> RepoResult<Label> {
        let query = format!(
            "INSERT INTO {} (id, name, slug, created_at, updated_at) \
             VALUES ($1, $2, $3, NOW(), NOW()) \
             RETURNING id, name, slug, 0::BIGINT AS post_count, created_at, updated_at",
            kind.table()
        );
        let created = sqlx::query_as::<_, Label>(&query)
            .bind(Uuid::new_v4().to_string())
            .bind(label.name)
            .bind(label.slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    /// Uses `COALESCE` so absent fields keep their stored value.
    async fn update_label(
        &self,
        kind: LabelKind,
        id: &str,
        changes: LabelChanges,
    ) -> RepoResult<Option<Label>> {
        let query = format!(
            "UPDATE {} SET name = COALESCE($2, name), slug = COALESCE($3, slug), updated_at = NOW() \
             WHERE id = $1",
            kind.table()
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(changes.name)
            .bind(changes.slug)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_label(kind, id).await
    }

    /// The join tables reference labels with `ON DELETE RESTRICT`, so a label
    /// that gained posts after the handler's check fails with a foreign key error.
    async fn delete_label(&self, kind: LabelKind, id: &str) -> RepoResult<bool> {
        let query = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_published_posts(&self, filter: &PostFilter) -> RepoResult<Vec<PostSummary>> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(
            r#"
            SELECT
                p.id, p.title, p.slug, p.excerpt, p.published_at, p.created_at,
                u.name AS author_name, u.image AS author_image
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.published = true
            "#,
        );

        if let Some(search) = filter.search.as_deref() {
            let pattern = format!("%{}%", escape_like(search));
            builder.push(" AND (p.title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(r" ESCAPE '\' OR p.excerpt ILIKE ");
            builder.push_bind(pattern);
            builder.push(r" ESCAPE '\')");
        }

        if let Some(category_slug) = filter.category_slug.as_deref() {
            builder.push(
                " AND EXISTS (SELECT 1 FROM post_categories pc \
                 JOIN categories c ON c.id = pc.category_id \
                 WHERE pc.post_id = p.id AND c.slug = ",
            );
            builder.push_bind(category_slug.to_string());
            builder.push(")");
        }

        builder.push(" ORDER BY COALESCE(p.published_at, p.created_at) DESC");

        let rows = builder
            .build_query_as::<PostRow>()
            .fetch_all(&self.pool)
            .await?;

        let post_ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
        let mut categories = self.labels_for_posts(LabelKind::Category, &post_ids).await?;
        let mut tags = self.labels_for_posts(LabelKind::Tag, &post_ids).await?;

        let posts = rows
            .into_iter()
            .map(|row| PostSummary {
                categories: categories.remove(&row.id).unwrap_or_default(),
                tags: tags.remove(&row.id).unwrap_or_default(),
                id: row.id,
                title: row.title,
                slug: row.slug,
                excerpt: row.excerpt,
                published_at: row.published_at,
                created_at: row.created_at,
                author: Author {
                    name: row.author_name,
                    image: row.author_image,
                },
            })
            .collect();
        Ok(posts)
    }

    async fn count_published_posts(&self) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE published = true")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
