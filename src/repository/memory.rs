use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepoResult, Repository};
use crate::{
    error::RepoError,
    models::{
        Author, Label, LabelChanges, LabelKind, LabelRef, NewLabel, PostFilter, PostSummary, User,
    },
};

#[derive(Debug, Clone)]
struct StoredLabel {
    id: String,
    name: String,
    slug: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// SeedPost
///
/// A post as inserted into the in-memory store. Label ids must reference
/// labels that already exist.
#[derive(Debug, Clone)]
pub struct SeedPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub author_id: Uuid,
    pub category_ids: Vec<String>,
    pub tag_ids: Vec<String>,
}

impl SeedPost {
    /// A published post with no labels, authored by `author_id`.
    pub fn published(id: &str, title: &str, author_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: id.to_string(),
            title: title.to_string(),
            slug: crate::validation::slugify(title),
            excerpt: None,
            published: true,
            published_at: Some(now),
            created_at: now,
            author_id,
            category_ids: vec![],
            tag_ids: vec![],
        }
    }
}

#[derive(Default)]
struct Store {
    users: HashMap<Uuid, User>,
    tags: Vec<StoredLabel>,
    categories: Vec<StoredLabel>,
    posts: Vec<SeedPost>,
}

impl Store {
    fn labels(&self, kind: LabelKind) -> &Vec<StoredLabel> {
        match kind {
            LabelKind::Tag => &self.tags,
            LabelKind::Category => &self.categories,
        }
    }

    fn labels_mut(&mut self, kind: LabelKind) -> &mut Vec<StoredLabel> {
        match kind {
            LabelKind::Tag => &mut self.tags,
            LabelKind::Category => &mut self.categories,
        }
    }

    fn post_label_ids(post: &SeedPost, kind: LabelKind) -> &[String] {
        match kind {
            LabelKind::Tag => &post.tag_ids,
            LabelKind::Category => &post.category_ids,
        }
    }

    fn post_count(&self, kind: LabelKind, label_id: &str) -> i64 {
        self.posts
            .iter()
            .filter(|post| Self::post_label_ids(post, kind).iter().any(|id| id == label_id))
            .count() as i64
    }

    fn to_label(&self, kind: LabelKind, stored: &StoredLabel) -> Label {
        Label {
            id: stored.id.clone(),
            name: stored.name.clone(),
            slug: stored.slug.clone(),
            post_count: self.post_count(kind, &stored.id),
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }

    fn label_refs(&self, kind: LabelKind, ids: &[String]) -> Vec<LabelRef> {
        let mut refs: Vec<LabelRef> = self
            .labels(kind)
            .iter()
            .filter(|label| ids.contains(&label.id))
            .map(|label| LabelRef {
                id: label.id.clone(),
                name: label.name.clone(),
                slug: label.slug.clone(),
            })
            .collect();
        refs.sort_by(|a, b| a.name.cmp(&b.name));
        refs
    }

    /// Same matching rule as the Postgres query: name OR slug, excluding one id.
    fn conflict(
        &self,
        kind: LabelKind,
        exclude_id: Option<&str>,
        name: Option<&str>,
        slug: Option<&str>,
    ) -> Option<&StoredLabel> {
        self.labels(kind).iter().find(|label| {
            Some(label.id.as_str()) != exclude_id
                && (name == Some(label.name.as_str()) || slug == Some(label.slug.as_str()))
        })
    }
}

/// MemoryRepository
///
/// An in-process implementation of `Repository` used by the test-suite and by
/// local runs without `DATABASE_URL`. Writes hold the lock across their
/// integrity check, so uniqueness and the delete-guard behave like the
/// Postgres constraints.
#[derive(Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.store.write().await.users.insert(user.id, user);
    }

    /// Inserts a label with a caller-chosen id. Uniqueness is still enforced.
    pub async fn insert_label(
        &self,
        kind: LabelKind,
        id: &str,
        name: &str,
        slug: &str,
    ) -> RepoResult<Label> {
        let mut store = self.store.write().await;
        if store.conflict(kind, None, Some(name), Some(slug)).is_some() {
            return Err(RepoError::UniqueViolation(format!("{}_name_slug", kind.table())));
        }
        let now = Utc::now();
        let stored = StoredLabel {
            id: id.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: now,
            updated_at: now,
        };
        let label = store.to_label(kind, &stored);
        store.labels_mut(kind).push(stored);
        Ok(label)
    }

    pub async fn insert_post(&self, post: SeedPost) -> RepoResult<()> {
        let mut store = self.store.write().await;
        for kind in [LabelKind::Tag, LabelKind::Category] {
            let ids = Store::post_label_ids(&post, kind);
            if let Some(missing) = ids
                .iter()
                .find(|id| !store.labels(kind).iter().any(|label| &label.id == *id))
            {
                return Err(RepoError::ForeignKeyViolation(format!(
                    "{} {} does not exist",
                    kind.join_column(),
                    missing
                )));
            }
        }
        store.posts.push(post);
        Ok(())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn list_labels(&self, kind: LabelKind) -> RepoResult<Vec<Label>> {
        let store = self.store.read().await;
        let mut labels: Vec<Label> = store
            .labels(kind)
            .iter()
            .map(|stored| store.to_label(kind, stored))
            .collect();
        labels.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(labels)
    }

    async fn get_label(&self, kind: LabelKind, id: &str) -> RepoResult<Option<Label>> {
        let store = self.store.read().await;
        Ok(store
            .labels(kind)
            .iter()
            .find(|label| label.id == id)
            .map(|stored| store.to_label(kind, stored)))
    }

    async fn find_conflicting_label(
        &self,
        kind: LabelKind,
        exclude_id: Option<&str>,
        name: Option<&str>,
        slug: Option<&str>,
    ) -> RepoResult<Option<Label>> {
        let store = self.store.read().await;
        Ok(store
            .conflict(kind, exclude_id, name, slug)
            .map(|stored| store.to_label(kind, stored)))
    }

    async fn create_label(&self, kind: LabelKind, label: NewLabel) -> RepoResult<Label> {
        let id = Uuid::new_v4().to_string();
        self.insert_label(kind, &id, &label.name, &label.slug).await
    }

    async fn update_label(
        &self,
        kind: LabelKind,
        id: &str,
        changes: LabelChanges,
    ) -> RepoResult<Option<Label>> {
        let mut store = self.store.write().await;
        if !store.labels(kind).iter().any(|label| label.id == id) {
            return Ok(None);
        }
        if store
            .conflict(kind, Some(id), changes.name.as_deref(), changes.slug.as_deref())
            .is_some()
        {
            return Err(RepoError::UniqueViolation(format!("{}_name_slug", kind.table())));
        }

        let Some(stored) = store.labels_mut(kind).iter_mut().find(|label| label.id == id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            stored.name = name;
        }
        if let Some(slug) = changes.slug {
            stored.slug = slug;
        }
        stored.updated_at = Utc::now();
        let updated = stored.clone();

        Ok(Some(store.to_label(kind, &updated)))
    }

    async fn delete_label(&self, kind: LabelKind, id: &str) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        if store.post_count(kind, id) > 0 {
            return Err(RepoError::ForeignKeyViolation(format!(
                "{}_{}_fkey",
                kind.join_table(),
                kind.join_column()
            )));
        }
        let labels = store.labels_mut(kind);
        let before = labels.len();
        labels.retain(|label| label.id != id);
        Ok(labels.len() < before)
    }

    async fn list_published_posts(&self, filter: &PostFilter) -> RepoResult<Vec<PostSummary>> {
        let store = self.store.read().await;
        let search = filter.search.as_deref().map(str::to_lowercase);
        let category_id = match filter.category_slug.as_deref() {
            Some(slug) => match store.categories.iter().find(|c| c.slug == slug) {
                Some(category) => Some(category.id.clone()),
                None => return Ok(vec![]),
            },
            None => None,
        };

        let mut posts: Vec<&SeedPost> = store
            .posts
            .iter()
            .filter(|post| post.published)
            .filter(|post| match &search {
                Some(needle) => {
                    post.title.to_lowercase().contains(needle)
                        || post
                            .excerpt
                            .as_deref()
                            .is_some_and(|excerpt| excerpt.to_lowercase().contains(needle))
                }
                None => true,
            })
            .filter(|post| match &category_id {
                Some(id) => post.category_ids.contains(id),
                None => true,
            })
            .collect();
        posts.sort_by_key(|post| std::cmp::Reverse(post.published_at.unwrap_or(post.created_at)));

        Ok(posts
            .into_iter()
            .map(|post| {
                let author = store
                    .users
                    .get(&post.author_id)
                    .map(|user| Author {
                        name: user.name.clone(),
                        image: user.image.clone(),
                    })
                    .unwrap_or_default();
                PostSummary {
                    id: post.id.clone(),
                    title: post.title.clone(),
                    slug: post.slug.clone(),
                    excerpt: post.excerpt.clone(),
                    published_at: post.published_at,
                    created_at: post.created_at,
                    author,
                    categories: store.label_refs(LabelKind::Category, &post.category_ids),
                    tags: store.label_refs(LabelKind::Tag, &post.tag_ids),
                }
            })
            .collect())
    }

    async fn count_published_posts(&self) -> RepoResult<i64> {
        let store = self.store.read().await;
        Ok(store.posts.iter().filter(|post| post.published).count() as i64)
    }
}
